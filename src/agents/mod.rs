pub mod independent;
pub mod nashq;
pub mod random;

use crate::error::SimError;
use crate::process::agent::{Agent, AgentKind};
use crate::process::memory::{LearningParams, Snapshot};

pub fn make_agent(kind: AgentKind, params: LearningParams) -> Box<dyn Agent> {
    match kind {
        AgentKind::Random => Box::new(random::RandomAgent::new(params.actions)),
        AgentKind::IndependentQ => Box::new(independent::IndependentQAgent::new(params)),
        AgentKind::NashQ => Box::new(nashq::NashQAgent::new(params)),
    }
}

/// Rebuilds an agent of whatever kind the snapshot was taken from.
pub fn from_snapshot(snapshot: Snapshot) -> Result<Box<dyn Agent>, SimError> {
    let params = match &snapshot {
        Snapshot::Random { actions } => LearningParams {
            actions: *actions,
            discount: 0.0,
            exploration: 0.0,
        },
        Snapshot::IndependentQ { params, .. } | Snapshot::NashQ { params, .. } => *params,
    };
    let mut agent = make_agent(snapshot.kind(), params);
    agent.restore(snapshot)?;
    Ok(agent)
}
