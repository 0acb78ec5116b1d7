use crate::error::SimError;
use crate::games::game::ActionId;
use crate::process::agent::{Agent, AgentKind, Decision, Response};
use crate::process::memory::{ActionMemory, LearningParams, Snapshot};
use crate::process::state::JointState;
use crate::process::utils::{argmax, learning_rate};
use rand::{Rng, RngCore};
use std::collections::BTreeMap;

/// Tabular Q-learner that ignores the opponent: one value per own action
/// and state, greedy exploitation, no equilibrium computation.
#[derive(Debug, Clone)]
pub struct IndependentQAgent {
    params: LearningParams,
    memory: BTreeMap<JointState, ActionMemory>,
}

impl IndependentQAgent {
    pub fn new(params: LearningParams) -> Self {
        IndependentQAgent {
            params,
            memory: BTreeMap::new(),
        }
    }

    pub fn memory(&self, state: &JointState) -> Option<&ActionMemory> {
        self.memory.get(state)
    }

    fn best(&self, state: &JointState) -> Option<(ActionId, f64)> {
        self.memory
            .get(state)
            .map(|entry| argmax(entry.values.view()))
    }
}

impl Agent for IndependentQAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::IndependentQ
    }

    fn actions(&self) -> usize {
        self.params.actions
    }

    fn next_action(&mut self, rng: &mut dyn RngCore, state: JointState) -> Decision {
        let actions = self.params.actions;
        let Some(state_visits) = self.memory.get(&state).map(|entry| entry.state_visits) else {
            self.register_state(state);
            return Decision::explore(rng.gen_range(0..actions));
        };
        if rng.gen::<f64>() < self.params.exploration / state_visits as f64 {
            return Decision::explore(rng.gen_range(0..actions));
        }
        match self.best(&state) {
            Some((action, utility)) => Decision { action, utility },
            None => Decision::explore(rng.gen_range(0..actions)),
        }
    }

    fn take_response(&mut self, response: &Response) {
        let Response {
            own_reward,
            prev_state,
            own_action,
            next_state,
            ..
        } = *response;
        let continuation = if next_state == prev_state {
            0.0
        } else {
            self.best(&next_state).map_or(0.0, |(_, value)| value)
        };

        let LearningParams {
            actions, discount, ..
        } = self.params;
        let entry = self
            .memory
            .entry(prev_state)
            .or_insert_with(|| ActionMemory::fresh(actions));
        let alpha = learning_rate(entry.visits[own_action]);
        entry.values[own_action] = (1.0 - alpha) * entry.values[own_action]
            + alpha * (own_reward + discount * continuation);
        entry.visits[own_action] += 1;
        entry.state_visits += 1;
    }

    fn register_state(&mut self, state: JointState) {
        let actions = self.params.actions;
        self.memory
            .entry(state)
            .or_insert_with(|| ActionMemory::fresh(actions));
    }

    fn reset(&mut self) {
        self.memory.clear();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::IndependentQ {
            params: self.params,
            entries: self
                .memory
                .iter()
                .map(|(state, entry)| (*state, entry.clone()))
                .collect(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) -> Result<(), SimError> {
        match snapshot {
            Snapshot::IndependentQ { params, entries } => {
                self.params = params;
                self.memory = entries.into_iter().collect();
                Ok(())
            }
            other => Err(SimError::SnapshotKind {
                expected: AgentKind::IndependentQ.name(),
                found: other.kind().name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IndependentQAgent;
    use crate::process::agent::{Agent, Response};
    use crate::process::memory::LearningParams;
    use crate::process::state::JointState;
    use ndarray::arr1;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn agent(discount: f64, exploration: f64) -> IndependentQAgent {
        IndependentQAgent::new(LearningParams {
            actions: 3,
            discount,
            exploration,
        })
    }

    fn response(reward: f64, action: usize, prev: JointState, next: JointState) -> Response {
        Response {
            own_reward: reward,
            opponent_reward: -1.0,
            prev_state: prev,
            own_action: action,
            opponent_action: 0,
            next_state: next,
        }
    }

    #[test]
    fn test_unseen_then_greedy() {
        let mut agent = agent(0.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let s = JointState::new(3, 3);
        assert_eq!(agent.next_action(&mut rng, s).utility, 0.0);
        // Only the own side is stored.
        assert!(agent.memory(&s).is_some());

        agent.take_response(&response(0.6, 2, s, s));
        let decision = agent.next_action(&mut rng, s);
        assert_eq!(decision.action, 2);
        assert_eq!(decision.utility, 0.6);
    }

    #[test]
    fn test_update_rule() {
        let mut agent = agent(0.5, 0.2);
        let prev = JointState::new(1, 4);
        let next = JointState::new(2, 4);

        // Unknown next state bootstraps nothing.
        agent.take_response(&response(1.0, 0, prev, next));
        assert_eq!(agent.memory(&prev).unwrap().values, arr1(&[1.0, 0.0, 0.0]));
        assert!(agent.memory(&next).is_none());

        agent.take_response(&response(0.4, 1, next, next));
        assert_eq!(agent.memory(&next).unwrap().values, arr1(&[0.0, 0.4, 0.0]));

        // alpha = 1/2, continuation = max q(next) = 0.4
        agent.take_response(&response(1.0, 0, prev, next));
        let entry = agent.memory(&prev).unwrap();
        assert_eq!(entry.values[0], 0.5 * 1.0 + 0.5 * (1.0 + 0.5 * 0.4));
        assert_eq!(entry.visits, arr1(&[3, 1, 1]));
        assert_eq!(entry.state_visits, 3);
    }

    #[test]
    fn test_opponent_reward_is_ignored() {
        let mut agent = agent(0.0, 0.2);
        let s = JointState::new(0, 6);
        agent.take_response(&response(0.2, 1, s, s));
        assert!(agent.memory(&s.mirror()).is_none());
    }

    #[test]
    fn test_snapshot_kind_mismatch() {
        let mut agent = agent(0.0, 0.2);
        let random = crate::agents::random::RandomAgent::new(3).snapshot();
        assert!(agent.restore(random).is_err());
        let own = agent.snapshot();
        assert!(agent.restore(own).is_ok());
    }
}
