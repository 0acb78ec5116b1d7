use crate::error::SimError;
use crate::games::game::ActionId;
use crate::process::memory::Snapshot;
use crate::process::state::JointState;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// An action together with the payoff the agent expected from it when it
/// decided. Exploratory choices expect nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub action: ActionId,
    pub utility: f64,
}

impl Decision {
    pub fn explore(action: ActionId) -> Self {
        Decision {
            action,
            utility: 0.0,
        }
    }
}

/// Feedback for one joint decision, told from the receiving agent's side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response {
    pub own_reward: f64,
    pub opponent_reward: f64,
    pub prev_state: JointState,
    pub own_action: ActionId,
    pub opponent_action: ActionId,
    pub next_state: JointState,
}

impl Response {
    /// The same round told from the opponent's side.
    pub fn mirrored(&self) -> Response {
        Response {
            own_reward: self.opponent_reward,
            opponent_reward: self.own_reward,
            prev_state: self.prev_state.mirror(),
            own_action: self.opponent_action,
            opponent_action: self.own_action,
            next_state: self.next_state.mirror(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    Random,
    IndependentQ,
    NashQ,
}

impl AgentKind {
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::Random => "random",
            AgentKind::IndependentQ => "independent-q",
            AgentKind::NashQ => "nash-q",
        }
    }
}

/// A decision process driving one half (moving or pricing) of a firm.
///
/// The simulator talks to every agent through this trait only, so any
/// variant can fill any role.
pub trait Agent: Debug + Send {
    fn kind(&self) -> AgentKind;

    fn actions(&self) -> usize;

    fn next_action(&mut self, rng: &mut dyn RngCore, state: JointState) -> Decision;

    fn take_response(&mut self, response: &Response);

    /// Makes the agent aware of a state without deciding anything in it.
    /// Known states are left untouched.
    fn register_state(&mut self, _state: JointState) {}

    /// Forgets everything learned.
    fn reset(&mut self);

    fn snapshot(&self) -> Snapshot;

    fn restore(&mut self, snapshot: Snapshot) -> Result<(), SimError>;
}
