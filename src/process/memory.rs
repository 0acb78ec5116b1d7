use crate::process::agent::AgentKind;
use crate::process::state::JointState;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// What an agent remembers about one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMemory<V, C> {
    /// Learned payoffs.
    pub values: V,
    /// Visits per action (or joint action); start at 1.
    pub visits: C,
    /// Updates made in this state; drives exploration decay.
    pub state_visits: u64,
}

pub type JointMemory = StateMemory<Array2<f64>, Array2<u64>>;
pub type ActionMemory = StateMemory<Array1<f64>, Array1<u64>>;

impl JointMemory {
    pub fn fresh(actions: usize) -> Self {
        StateMemory {
            values: Array2::zeros((actions, actions)),
            visits: Array2::ones((actions, actions)),
            state_visits: 1,
        }
    }
}

impl ActionMemory {
    pub fn fresh(actions: usize) -> Self {
        StateMemory {
            values: Array1::zeros(actions),
            visits: Array1::ones(actions),
            state_visits: 1,
        }
    }
}

/// Learning parameters shared by the learning agents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParams {
    pub actions: usize,
    pub discount: f64,
    pub exploration: f64,
}

/// Everything an agent knows, in a form that serializes and reloads
/// exactly. Entries are ordered by state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Snapshot {
    Random {
        actions: usize,
    },
    IndependentQ {
        params: LearningParams,
        entries: Vec<(JointState, ActionMemory)>,
    },
    NashQ {
        params: LearningParams,
        entries: Vec<(JointState, JointMemory)>,
    },
}

impl Snapshot {
    pub fn kind(&self) -> AgentKind {
        match self {
            Snapshot::Random { .. } => AgentKind::Random,
            Snapshot::IndependentQ { .. } => AgentKind::IndependentQ,
            Snapshot::NashQ { .. } => AgentKind::NashQ,
        }
    }

    pub fn state_count(&self) -> usize {
        match self {
            Snapshot::Random { .. } => 0,
            Snapshot::IndependentQ { entries, .. } => entries.len(),
            Snapshot::NashQ { entries, .. } => entries.len(),
        }
    }
}
