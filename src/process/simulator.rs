use crate::games::market::Market;
use crate::process::agent::{Agent, Response};
use crate::process::report::{RoundRecord, RunReport};
use crate::process::state::JointState;
use rand::rngs::SmallRng;
use rand::SeedableRng;

pub const DEFAULT_SEED: u64 = 0b1110110001110101011000111101;

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    iterations: usize,
    initial_state: JointState,
    seed: u64,
    log_interval: usize,
}

impl SimulatorConfig {
    pub fn new() -> Self {
        SimulatorConfig {
            iterations: 10000,
            initial_state: JointState::new(3, 3),
            seed: DEFAULT_SEED,
            log_interval: 0,
        }
    }

    pub fn set_iterations(&mut self, iterations: usize) {
        self.iterations = iterations;
    }
    pub fn set_initial_state(&mut self, initial_state: JointState) {
        self.initial_state = initial_state;
    }
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }
    pub fn set_log_interval(&mut self, log_interval: usize) {
        self.log_interval = log_interval;
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
    pub fn initial_state(&self) -> JointState {
        self.initial_state
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The two decision processes of one firm.
#[derive(Debug)]
pub struct Firm {
    pub mover: Box<dyn Agent>,
    pub pricer: Box<dyn Agent>,
}

/// Plays the repeated location-then-price game between two firms.
///
/// The joint state is kept from the first firm's side; the second firm's
/// agents always see it mirrored, so each agent finds its own position
/// first.
pub struct Simulator<'a> {
    config: &'a SimulatorConfig,
    market: &'a Market,
    rng: SmallRng,
    firms: [Firm; 2],
    state: JointState,
    step: usize,
}

impl<'a> Simulator<'a> {
    pub fn new(config: &'a SimulatorConfig, market: &'a Market, mut firms: [Firm; 2]) -> Self {
        let state = config.initial_state;
        assert!(
            state.is_within(market.size()),
            "initial state {} off the market",
            state
        );
        // Pricers see the starting location before any move is made.
        firms[0].pricer.register_state(state);
        firms[1].pricer.register_state(state.mirror());
        Simulator {
            config,
            market,
            rng: SmallRng::seed_from_u64(config.seed),
            firms,
            state,
            step: 0,
        }
    }

    /// Plays one round and returns its record.
    pub fn step(&mut self) -> RoundRecord {
        self.step += 1;
        let state = self.state;
        let [first, second] = &mut self.firms;

        let move1 = first.mover.next_action(&mut self.rng, state);
        let move2 = second.mover.next_action(&mut self.rng, state.mirror());
        let next = self.market.transition(state, move1.action, move2.action);

        let price1 = first.pricer.next_action(&mut self.rng, next);
        let price2 = second.pricer.next_action(&mut self.rng, next.mirror());
        let (profit1, profit2) = self.market.profit(next, price1.action, price2.action);

        // Prices are settled where they were set; moves lead somewhere new.
        let pricing = Response {
            own_reward: profit1,
            opponent_reward: profit2,
            prev_state: next,
            own_action: price1.action,
            opponent_action: price2.action,
            next_state: next,
        };
        let moving = Response {
            prev_state: state,
            own_action: move1.action,
            opponent_action: move2.action,
            ..pricing
        };
        first.pricer.take_response(&pricing);
        second.pricer.take_response(&pricing.mirrored());
        first.mover.take_response(&moving);
        second.mover.take_response(&moving.mirrored());

        self.state = next;
        RoundRecord {
            state: next,
            prices: (price1.action, price2.action),
            profits: (profit1, profit2),
            move_utilities: (move1.utility, move2.utility),
            price_utilities: (price1.utility, price2.utility),
            moves: (move1.action, move2.action),
        }
    }

    /// Plays all configured rounds, handing each record to `sink`.
    pub fn run_with(&mut self, mut sink: impl FnMut(&RoundRecord)) {
        let log_interval = self.config.log_interval;
        for _ in 0..self.config.iterations {
            let record = self.step();
            if log_interval > 0 && self.step % log_interval == 0 {
                log::debug!(
                    "round {}: state {} profits ({:.3}, {:.3})",
                    self.step,
                    record.state,
                    record.profits.0,
                    record.profits.1
                );
            }
            sink(&record);
        }
    }

    pub fn run(&mut self) -> Vec<RoundRecord> {
        let mut records = Vec::with_capacity(self.config.iterations);
        self.run_with(|record| records.push(*record));
        records
    }

    pub fn report(&self, records: &[RoundRecord]) -> RunReport {
        RunReport::from_records(self.config.initial_state, records)
    }

    /// Forgets everything the agents learned and returns to the start.
    pub fn reset(&mut self) {
        for firm in self.firms.iter_mut() {
            firm.mover.reset();
            firm.pricer.reset();
        }
        self.state = self.config.initial_state;
        self.step = 0;
        self.rng = SmallRng::seed_from_u64(self.config.seed);
        self.firms[0].pricer.register_state(self.state);
        self.firms[1].pricer.register_state(self.state.mirror());
    }

    pub fn state(&self) -> JointState {
        self.state
    }

    pub fn steps(&self) -> usize {
        self.step
    }

    pub fn firms(&self) -> &[Firm; 2] {
        &self.firms
    }

    pub fn into_firms(self) -> [Firm; 2] {
        self.firms
    }
}
