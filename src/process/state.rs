use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Position = u32;

/// Positions of both firms, seen from one of them: `own` is the viewer's
/// location, `other` the rival's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JointState {
    own: Position,
    other: Position,
}

impl JointState {
    #[inline]
    pub fn new(own: Position, other: Position) -> Self {
        JointState { own, other }
    }

    #[inline]
    pub fn own(&self) -> Position {
        self.own
    }

    #[inline]
    pub fn other(&self) -> Position {
        self.other
    }

    /// The same situation as the rival sees it.
    ///
    /// Agents read their memory of the mirrored state as a stand-in for the
    /// rival's payoffs. This only holds while both firms share action sets
    /// and learning rules.
    #[inline]
    pub fn mirror(&self) -> Self {
        JointState {
            own: self.other,
            other: self.own,
        }
    }

    pub fn is_within(&self, size: Position) -> bool {
        self.own <= size && self.other <= size
    }

    pub fn is_colocated(&self) -> bool {
        self.own == self.other
    }
}

impl Display for JointState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.own, self.other)
    }
}
