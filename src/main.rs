use anyhow::{bail, Context};
use clap::Parser;
use duopoly::env::batch::run_batch;
use duopoly::env::config::RunConfig;
use duopoly::env::logging;
use duopoly::games::market::Market;
use duopoly::process::agent::AgentKind;
use duopoly::process::state::JointState;
use log::LevelFilter;
use std::fs;
use std::path::PathBuf;

/// Two firms on a line learn where to stand and what to charge.
#[derive(Parser, Debug)]
#[command(name = "duopoly")]
#[command(version)]
struct Args {
    /// JSON run configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Discount factors of firm 1 and firm 2
    #[arg(long, num_args = 2, value_names = ["L1", "L2"])]
    discount: Option<Vec<f64>>,

    /// Rounds per run
    #[arg(long)]
    iterations: Option<usize>,

    /// Number of independent runs
    #[arg(long)]
    runs: Option<usize>,

    /// Worker threads for the runs
    #[arg(long)]
    jobs: Option<usize>,

    /// Seed of the first run; run r uses seed + r
    #[arg(long)]
    seed: Option<u64>,

    /// Largest position on the line
    #[arg(long)]
    size: Option<u32>,

    /// Number of price levels
    #[arg(long)]
    price_levels: Option<usize>,

    /// Starting positions of firm 1 and firm 2
    #[arg(long, num_args = 2, value_names = ["P1", "P2"])]
    initial_state: Option<Vec<u32>>,

    /// Exploration constant of the learners
    #[arg(long)]
    exploration: Option<f64>,

    /// Agent used by both firms to move
    #[arg(long, value_enum)]
    mover: Option<AgentKind>,

    /// Agent used by both firms to set prices
    #[arg(long, value_enum)]
    pricer: Option<AgentKind>,

    /// Rounds between progress lines of a run (0 = off)
    #[arg(long)]
    log_interval: Option<usize>,

    /// Output directory for trajectories, agents and summaries
    #[arg(long, default_value = "out")]
    out: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Also log at debug level to a file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

impl Args {
    fn run_config(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("cannot load configuration {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(d) = &self.discount {
            config.firms[0].discount = d[0];
            config.firms[1].discount = d[1];
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.size.is_some() || self.price_levels.is_some() {
            config.market = Market::new(
                self.size.unwrap_or(config.market.size()),
                config.market.moves().to_vec(),
                self.price_levels.unwrap_or(config.market.price_actions()),
            );
        }
        if let Some(p) = &self.initial_state {
            config.initial_state = JointState::new(p[0], p[1]);
        }
        if let Some(exploration) = self.exploration {
            config.exploration = exploration;
        }
        for firm in config.firms.iter_mut() {
            if let Some(mover) = self.mover {
                firm.mover = mover;
            }
            if let Some(pricer) = self.pricer {
                firm.pricer = pricer;
            }
        }
        if let Some(log_interval) = self.log_interval {
            config.log_interval = log_interval;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.log_level, args.log_dir.as_deref())?;
    let config = args.run_config()?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("cannot create {}", args.out.display()))?;
    let config_path = args.out.join("config.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("cannot write {}", config_path.display()))?;

    let outcomes = run_batch(&config, Some(&args.out), !args.quiet)?;
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(summary) => log::info!(
                "run {}: {} rounds, mean profits ({:.4}, {:.4}), final state {}",
                summary.run,
                summary.report.rounds,
                summary.report.mean_profits.0,
                summary.report.mean_profits.1,
                summary.report.final_state
            ),
            Err(e) => {
                failed += 1;
                log::error!("run {} failed: {}", outcome.run, e);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} runs failed", failed, outcomes.len());
    }
    log::info!("results written to {}", args.out.display());
    Ok(())
}
