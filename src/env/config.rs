use crate::agents::make_agent;
use crate::error::{ConfigError, SimError};
use crate::games::market::Market;
use crate::process::agent::AgentKind;
use crate::process::memory::LearningParams;
use crate::process::simulator::{Firm, SimulatorConfig, DEFAULT_SEED};
use crate::process::state::JointState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_EXPLORATION: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmConfig {
    pub discount: f64,
    pub mover: AgentKind,
    pub pricer: AgentKind,
}

impl FirmConfig {
    pub fn nash_q(discount: f64) -> Self {
        FirmConfig {
            discount,
            mover: AgentKind::NashQ,
            pricer: AgentKind::NashQ,
        }
    }
}

/// Everything needed to play a batch of independent runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub market: Market,
    pub firms: [FirmConfig; 2],
    pub exploration: f64,
    pub iterations: usize,
    pub initial_state: JointState,
    pub runs: usize,
    pub jobs: usize,
    pub seed: u64,
    /// Rounds between progress lines in the log; 0 disables them.
    pub log_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            market: Market::default(),
            firms: [FirmConfig::nash_q(0.5), FirmConfig::nash_q(0.5)],
            exploration: DEFAULT_EXPLORATION,
            iterations: 10000,
            initial_state: JointState::new(3, 3),
            runs: 1,
            jobs: 1,
            seed: DEFAULT_SEED,
            log_interval: 0,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        let config: RunConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (firm, f) in self.firms.iter().enumerate() {
            if !(0.0..=1.0).contains(&f.discount) {
                return Err(ConfigError::Discount {
                    firm: firm + 1,
                    value: f.discount,
                });
            }
        }
        if self.market.size() == 0 {
            return Err(ConfigError::NonPositive {
                what: "market size",
            });
        }
        if self.market.move_actions() == 0 {
            return Err(ConfigError::NonPositive {
                what: "number of movement actions",
            });
        }
        if self.market.price_actions() < 2 {
            return Err(ConfigError::PriceLevels(self.market.price_actions()));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Exploration(self.exploration));
        }
        if !self.initial_state.is_within(self.market.size()) {
            return Err(ConfigError::InitialState(
                self.initial_state.own(),
                self.initial_state.other(),
                self.market.size(),
            ));
        }
        if self.runs == 0 {
            return Err(ConfigError::NonPositive {
                what: "number of runs",
            });
        }
        if self.jobs == 0 {
            return Err(ConfigError::NonPositive {
                what: "number of jobs",
            });
        }
        Ok(())
    }

    pub fn discounts(&self) -> (f64, f64) {
        (self.firms[0].discount, self.firms[1].discount)
    }

    /// Fresh, untrained agents for both firms.
    pub fn build_firms(&self) -> [Firm; 2] {
        let build = |f: &FirmConfig| {
            let params = |actions| LearningParams {
                actions,
                discount: f.discount,
                exploration: self.exploration,
            };
            Firm {
                mover: make_agent(f.mover, params(self.market.move_actions())),
                pricer: make_agent(f.pricer, params(self.market.price_actions())),
            }
        };
        [build(&self.firms[0]), build(&self.firms[1])]
    }

    /// Simulator settings of the `run`-th repetition. Every run gets its own
    /// seed.
    pub fn simulator_config(&self, run: usize) -> SimulatorConfig {
        let mut config = SimulatorConfig::new();
        config.set_iterations(self.iterations);
        config.set_initial_state(self.initial_state);
        config.set_seed(self.seed.wrapping_add(run as u64));
        config.set_log_interval(self.log_interval);
        config
    }

    /// File stem shared by all outputs of one run.
    pub fn run_label(&self, run: usize) -> String {
        let (l1, l2) = self.discounts();
        format!("run_{}_{}_{}", run, l1, l2)
    }
}
