use crate::error::SimError;
use crate::process::agent::{Agent, AgentKind, Decision, Response};
use crate::process::memory::Snapshot;
use crate::process::state::JointState;
use rand::{Rng, RngCore};

/// Picks uniformly at random and learns nothing.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    actions: usize,
}

impl RandomAgent {
    pub fn new(actions: usize) -> Self {
        RandomAgent { actions }
    }
}

impl Agent for RandomAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Random
    }

    fn actions(&self) -> usize {
        self.actions
    }

    fn next_action(&mut self, rng: &mut dyn RngCore, _state: JointState) -> Decision {
        Decision::explore(rng.gen_range(0..self.actions))
    }

    fn take_response(&mut self, _response: &Response) {}

    fn reset(&mut self) {}

    fn snapshot(&self) -> Snapshot {
        Snapshot::Random {
            actions: self.actions,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) -> Result<(), SimError> {
        match snapshot {
            Snapshot::Random { actions } => {
                self.actions = actions;
                Ok(())
            }
            other => Err(SimError::SnapshotKind {
                expected: AgentKind::Random.name(),
                found: other.kind().name(),
            }),
        }
    }
}
