use crate::error::SimError;
use crate::games::game::{ActionId, Equilibrium};
use crate::games::nash::solve;
use crate::process::agent::{Agent, AgentKind, Decision, Response};
use crate::process::memory::{JointMemory, LearningParams, Snapshot};
use crate::process::state::JointState;
use crate::process::utils::{learning_rate, sample_index};
use rand::{Rng, RngCore};
use std::collections::BTreeMap;

/// Nash-Q learner.
///
/// For every state it keeps a matrix of payoffs over joint actions, own
/// action by row and opponent action by column. It has no separate model of
/// the opponent: the opponent's payoffs in a state are read from the
/// agent's own memory of the mirrored state, and every update is replayed
/// from the opponent's side to fill that memory.
#[derive(Debug, Clone)]
pub struct NashQAgent {
    params: LearningParams,
    memory: BTreeMap<JointState, JointMemory>,
}

impl NashQAgent {
    pub fn new(params: LearningParams) -> Self {
        NashQAgent {
            params,
            memory: BTreeMap::new(),
        }
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn memory(&self, state: &JointState) -> Option<&JointMemory> {
        self.memory.get(state)
    }

    pub fn knows(&self, state: &JointState) -> bool {
        self.memory.contains_key(state)
    }

    /// Adds fresh memory for the state and its mirror. Known states keep
    /// what they learned.
    pub fn insert_state(&mut self, state: JointState) {
        let actions = self.params.actions;
        for s in [state, state.mirror()] {
            self.memory
                .entry(s)
                .or_insert_with(|| JointMemory::fresh(actions));
        }
    }

    /// Equilibrium of the stage game in `state`, playing against a mirror
    /// image of itself. The state must be known.
    pub fn equilibrium(&self, state: &JointState) -> Equilibrium {
        let own = &self.memory[state];
        let opponent = &self.memory[&state.mirror()];
        solve(own.values.view(), opponent.values.view())
    }

    fn update(&mut self, response: &Response) {
        let Response {
            own_reward,
            prev_state,
            own_action,
            opponent_action,
            next_state,
            ..
        } = *response;
        if !self.knows(&prev_state) {
            self.insert_state(prev_state);
        }

        // Staying in place never bootstraps from itself.
        let continuation = if next_state == prev_state || !self.knows(&next_state) {
            0.0
        } else {
            self.equilibrium(&next_state).utilities.0
        };

        let LearningParams {
            actions, discount, ..
        } = self.params;
        let entry = self
            .memory
            .entry(prev_state)
            .or_insert_with(|| JointMemory::fresh(actions));
        let cell = (own_action, opponent_action);
        let alpha = learning_rate(entry.visits[cell]);
        entry.values[cell] =
            (1.0 - alpha) * entry.values[cell] + alpha * (own_reward + discount * continuation);
        entry.visits[cell] += 1;
        entry.state_visits += 1;
    }

    fn random_action(&self, rng: &mut dyn RngCore) -> ActionId {
        rng.gen_range(0..self.params.actions)
    }
}

impl Agent for NashQAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::NashQ
    }

    fn actions(&self) -> usize {
        self.params.actions
    }

    fn next_action(&mut self, rng: &mut dyn RngCore, state: JointState) -> Decision {
        let Some(state_visits) = self.memory.get(&state).map(|entry| entry.state_visits) else {
            self.insert_state(state);
            return Decision::explore(self.random_action(rng));
        };
        if rng.gen::<f64>() < self.params.exploration / state_visits as f64 {
            return Decision::explore(self.random_action(rng));
        }
        let equilibrium = self.equilibrium(&state);
        Decision {
            action: sample_index(equilibrium.row_strategy.view(), rng),
            utility: equilibrium.utilities.0,
        }
    }

    fn take_response(&mut self, response: &Response) {
        self.update(response);
        self.update(&response.mirrored());
    }

    fn register_state(&mut self, state: JointState) {
        self.insert_state(state);
    }

    fn reset(&mut self) {
        self.memory.clear();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::NashQ {
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
            Snapshot::NashQ { params, entries } => {
                self.params = params;
                self.memory = entries.into_iter().collect();
                Ok(())
            }
            other => Err(SimError::SnapshotKind {
                expected: AgentKind::NashQ.name(),
                found: other.kind().name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NashQAgent;
    use crate::process::agent::{Agent, Decision, Response};
    use crate::process::memory::LearningParams;
    use crate::process::state::JointState;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn agent(actions: usize, discount: f64) -> NashQAgent {
        NashQAgent::new(LearningParams {
            actions,
            discount,
            exploration: 0.2,
        })
    }

    fn response(reward: f64, prev: JointState, next: JointState) -> Response {
        Response {
            own_reward: reward,
            opponent_reward: 0.0,
            prev_state: prev,
            own_action: 0,
            opponent_action: 2,
            next_state: next,
        }
    }

    #[test]
    fn test_unseen_state_explores_and_inserts_mirror() {
        let mut agent = agent(3, 0.4);
        let mut rng = SmallRng::seed_from_u64(7);
        let s = JointState::new(2, 5);
        let decision = agent.next_action(&mut rng, s);
        assert!(decision.action < 3);
        assert_eq!(decision.utility, 0.0);
        for state in [s, s.mirror()] {
            let entry = agent.memory(&state).unwrap();
            assert_eq!(entry.values, Array2::<f64>::zeros((3, 3)));
            assert_eq!(entry.visits, Array2::<u64>::ones((3, 3)));
            assert_eq!(entry.state_visits, 1);
        }
    }

    #[test]
    fn test_known_state_without_knowledge_expects_zero() {
        let mut agent = agent(3, 0.4);
        let mut rng = SmallRng::seed_from_u64(11);
        let s = JointState::new(3, 3);
        agent.register_state(s);
        for _ in 0..50 {
            let Decision { action, utility } = agent.next_action(&mut rng, s);
            assert!(action < 3);
            assert_eq!(utility, 0.0);
        }
        // Deciding never counts as a visit.
        assert_eq!(agent.memory(&s).unwrap().state_visits, 1);
    }

    #[test]
    fn test_register_keeps_learned_values() {
        let mut agent = agent(3, 0.4);
        let s = JointState::new(1, 2);
        agent.register_state(s);
        agent.take_response(&response(0.5, s, s));
        let before = agent.memory(&s).unwrap().clone();
        agent.register_state(s);
        agent.register_state(s.mirror());
        assert_eq!(agent.memory(&s).unwrap(), &before);
    }

    #[test]
    fn test_update_uses_decaying_rate_and_mirrors() {
        let mut agent = agent(3, 0.0);
        let s = JointState::new(1, 2);
        agent.register_state(s);
        let mut r = response(1.0, s, s);
        r.opponent_reward = 0.25;

        agent.take_response(&r);
        let entry = agent.memory(&s).unwrap();
        assert_eq!(entry.values[(0, 2)], 1.0);
        assert_eq!(entry.visits[(0, 2)], 2);
        assert_eq!(entry.state_visits, 2);
        let mirror = agent.memory(&s.mirror()).unwrap();
        assert_eq!(mirror.values[(2, 0)], 0.25);
        assert_eq!(mirror.visits[(2, 0)], 2);
        assert_eq!(mirror.state_visits, 2);

        r.own_reward = 0.0;
        agent.take_response(&r);
        // alpha = 1/2 on the second visit
        assert_eq!(agent.memory(&s).unwrap().values[(0, 2)], 0.5);
        r.own_reward = 0.5;
        agent.take_response(&r);
        // alpha = 1/3
        assert_abs_diff_eq!(
            agent.memory(&s).unwrap().values[(0, 2)],
            0.5,
            epsilon = 1e-12
        );
        assert_eq!(agent.memory(&s).unwrap().visits[(0, 2)], 4);
    }

    #[test]
    fn test_self_loop_does_not_bootstrap() {
        let mut agent = agent(2, 1.0);
        let s = JointState::new(0, 0);
        agent.register_state(s);
        // Make the stage game in `s` worth something.
        let mut r = response(1.0, s, s);
        r.own_action = 1;
        r.opponent_action = 1;
        r.opponent_reward = 1.0;
        for _ in 0..5 {
            agent.take_response(&r);
        }
        // With discount 1 a bootstrap would push the estimate towards 2.
        assert_abs_diff_eq!(
            agent.memory(&s).unwrap().values[(1, 1)],
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_continuation_from_known_next_state() {
        let mut agent = agent(2, 0.5);
        let next = JointState::new(1, 1);
        agent.register_state(next);
        // Teach a dominant joint action in `next` worth 2 for both.
        let mut r = response(2.0, next, next);
        r.own_action = 0;
        r.opponent_action = 0;
        r.opponent_reward = 2.0;
        agent.take_response(&r);
        assert_eq!(agent.equilibrium(&next).utilities.0, 2.0);

        let prev = JointState::new(0, 1);
        agent.register_state(prev);
        let mut r = response(1.0, prev, next);
        r.own_action = 1;
        r.opponent_action = 0;
        agent.take_response(&r);
        // q = 1 + 0.5 * 2
        assert_eq!(agent.memory(&prev).unwrap().values[(1, 0)], 2.0);
    }

    #[test]
    fn test_unknown_next_state_continues_with_zero() {
        let mut agent = agent(3, 0.9);
        let prev = JointState::new(4, 4);
        agent.register_state(prev);
        agent.take_response(&response(0.75, prev, JointState::new(5, 3)));
        assert_eq!(agent.memory(&prev).unwrap().values[(0, 2)], 0.75);
        assert!(!agent.knows(&JointState::new(5, 3)));
    }

    #[test]
    fn test_snapshot_restores_exactly() {
        let mut agent = agent(3, 0.4);
        let mut rng = SmallRng::seed_from_u64(5);
        let s = JointState::new(1, 2);
        agent.next_action(&mut rng, s);
        let mut r = response(0.1 + 0.2, s, JointState::new(2, 2));
        r.opponent_reward = 1.0 / 3.0;
        agent.take_response(&r);

        let snapshot = agent.snapshot();
        assert_eq!(snapshot.state_count(), 2);
        let json = serde_json::to_string(&snapshot).unwrap();
        let mut restored = NashQAgent::new(LearningParams {
            actions: 1,
            discount: 0.0,
            exploration: 0.0,
        });
        restored
            .restore(serde_json::from_str(&json).unwrap())
            .unwrap();
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.params(), agent.params());

        agent.reset();
        assert!(!agent.knows(&s));
    }
}
