use crate::env::config::RunConfig;
use crate::env::persist::{export_run, prepare_output};
use crate::env::streamer::Streamer;
use crate::error::SimError;
use crate::process::report::RunReport;
use crate::process::simulator::Simulator;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

pub const SUMMARY_FILE: &str = "summary.jsonl";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run: usize,
    pub seed: u64,
    pub discounts: (f64, f64),
    #[serde(flatten)]
    pub report: RunReport,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub run: usize,
    pub result: Result<RunSummary, SimError>,
}

/// Plays one run from scratch. With an output directory its trajectory
/// and final agent memories are stored there.
pub fn run_once(
    config: &RunConfig,
    run: usize,
    out_dir: Option<&Path>,
) -> Result<RunSummary, SimError> {
    let sim_config = config.simulator_config(run);
    log::info!(
        "starting run {} for discounts {:?} (seed {})",
        run,
        config.discounts(),
        sim_config.seed()
    );
    let mut simulator = Simulator::new(&sim_config, &config.market, config.build_firms());
    let records = simulator.run();
    let report = simulator.report(&records);
    if let Some(dir) = out_dir {
        export_run(dir, &config.run_label(run), &records, simulator.firms())?;
    }
    log::info!(
        "finished run {}: mean profits ({:.4}, {:.4}), final state {}",
        run,
        report.mean_profits.0,
        report.mean_profits.1,
        report.final_state
    );
    Ok(RunSummary {
        run,
        seed: sim_config.seed(),
        discounts: config.discounts(),
        report,
    })
}

fn isolated_run(config: &RunConfig, run: usize, out_dir: Option<&Path>) -> RunOutcome {
    let result = catch_unwind(AssertUnwindSafe(|| run_once(config, run, out_dir)))
        .unwrap_or_else(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            Err(SimError::Panicked { run, message })
        });
    RunOutcome { run, result }
}

/// Plays `config.runs` independent runs on `config.jobs` threads.
///
/// Runs share nothing; one failing run is reported in its outcome and does
/// not stop the others. Outcomes are returned in run order. With an output
/// directory, a summary line per run is streamed to `summary.jsonl`.
pub fn run_batch(
    config: &RunConfig,
    out_dir: Option<&Path>,
    show_progress: bool,
) -> Result<Vec<RunOutcome>, SimError> {
    config.validate()?;
    let streamer = match out_dir {
        Some(dir) => {
            prepare_output(dir)?;
            Some(Streamer::new(&dir.join(SUMMARY_FILE))?)
        }
        None => None,
    };

    let progress_bar = if show_progress {
        ProgressBar::new(config.runs as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {wide_bar} {pos}/{len} {eta}")
    {
        progress_bar.set_style(style);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()?;
    log::info!("playing {} runs on {} threads", config.runs, config.jobs);
    let mut outcomes: Vec<RunOutcome> = pool.install(|| {
        (0..config.runs)
            .into_par_iter()
            .map(|run| {
                let mut outcome = isolated_run(config, run, out_dir);
                if let Some(streamer) = &streamer {
                    let line = match &outcome.result {
                        Ok(summary) => serde_json::to_value(summary).map_err(SimError::from),
                        Err(e) => Ok(json!({ "run": run, "error": e.to_string() })),
                    };
                    if let Err(e) = line.and_then(|line| streamer.send(&line)) {
                        if outcome.result.is_ok() {
                            outcome.result = Err(e);
                        }
                    }
                }
                progress_bar.inc(1);
                outcome
            })
            .collect()
    });
    progress_bar.finish();
    outcomes.sort_by_key(|o| o.run);

    if let Some(streamer) = streamer {
        streamer.join()?;
    }
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        log::warn!("{} of {} runs failed", failed, config.runs);
    }
    Ok(outcomes)
}
