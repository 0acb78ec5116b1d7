use crate::games::game::ActionId;
use crate::process::state::{JointState, Position};
use serde::{Deserialize, Serialize};

/// Column names of a serialized round, in order.
pub const RECORD_HEADER: [&str; 12] = [
    "position_self",
    "position_opponent",
    "price_self",
    "price_opponent",
    "profit_self",
    "profit_opponent",
    "expected_util_move_self",
    "expected_util_move_opponent",
    "expected_util_price_self",
    "expected_util_price_opponent",
    "move_self",
    "move_opponent",
];

type Row = (
    Position,
    Position,
    ActionId,
    ActionId,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
    ActionId,
    ActionId,
);

/// One played round, from the first firm's side. Positions are those after
/// the move, where prices were set and profits realized.
///
/// Serializes as a flat row in [`RECORD_HEADER`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Row", into = "Row")]
pub struct RoundRecord {
    pub state: JointState,
    pub prices: (ActionId, ActionId),
    pub profits: (f64, f64),
    pub move_utilities: (f64, f64),
    pub price_utilities: (f64, f64),
    pub moves: (ActionId, ActionId),
}

impl From<Row> for RoundRecord {
    fn from(row: Row) -> Self {
        RoundRecord {
            state: JointState::new(row.0, row.1),
            prices: (row.2, row.3),
            profits: (row.4, row.5),
            move_utilities: (row.6, row.7),
            price_utilities: (row.8, row.9),
            moves: (row.10, row.11),
        }
    }
}

impl From<RoundRecord> for Row {
    fn from(r: RoundRecord) -> Self {
        (
            r.state.own(),
            r.state.other(),
            r.prices.0,
            r.prices.1,
            r.profits.0,
            r.profits.1,
            r.move_utilities.0,
            r.move_utilities.1,
            r.price_utilities.0,
            r.price_utilities.1,
            r.moves.0,
            r.moves.1,
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunReport {
    pub rounds: usize,
    pub final_state: JointState,
    pub mean_profits: (f64, f64),
    /// Share of rounds in which both firms stood on the same spot.
    pub colocated: f64,
}

impl RunReport {
    pub fn from_records(initial: JointState, records: &[RoundRecord]) -> Self {
        let rounds = records.len();
        let final_state = records.last().map_or(initial, |r| r.state);
        if rounds == 0 {
            return RunReport {
                rounds,
                final_state,
                mean_profits: (0.0, 0.0),
                colocated: 0.0,
            };
        }
        let n = rounds as f64;
        let (p1, p2) = records
            .iter()
            .fold((0.0, 0.0), |(a, b), r| (a + r.profits.0, b + r.profits.1));
        let colocated = records.iter().filter(|r| r.state.is_colocated()).count();
        RunReport {
            rounds,
            final_state,
            mean_profits: (p1 / n, p2 / n),
            colocated: colocated as f64 / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RoundRecord, RunReport, RECORD_HEADER};
    use crate::process::state::JointState;

    fn record(own: u32, other: u32, profits: (f64, f64)) -> RoundRecord {
        RoundRecord {
            state: JointState::new(own, other),
            prices: (1, 3),
            profits,
            move_utilities: (0.0, 0.125),
            price_utilities: (0.1 + 0.2, 1.0 / 3.0),
            moves: (0, 2),
        }
    }

    #[test]
    fn test_record_is_a_row() {
        let r = record(2, 4, (0.3, 0.7));
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.starts_with("[2,4,1,3,0.3,0.7,0.0,0.125,"));
        let row: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(row.len(), RECORD_HEADER.len());
        let column = |name| row[RECORD_HEADER.iter().position(|h| *h == name).unwrap()].clone();
        assert_eq!(column("position_opponent"), 4);
        assert_eq!(column("price_opponent"), 3);
        assert_eq!(column("profit_self"), 0.3);
        assert_eq!(column("expected_util_move_opponent"), 0.125);
        assert_eq!(column("expected_util_price_opponent"), 1.0 / 3.0);
        assert_eq!(column("move_self"), 0);
        assert_eq!(column("move_opponent"), 2);
        let back: RoundRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_report() {
        let records = [record(1, 1, (0.5, 0.0)), record(2, 1, (0.25, 0.25))];
        let report = RunReport::from_records(JointState::new(3, 3), &records);
        assert_eq!(report.rounds, 2);
        assert_eq!(report.final_state, JointState::new(2, 1));
        assert_eq!(report.mean_profits, (0.375, 0.125));
        assert_eq!(report.colocated, 0.5);

        let empty = RunReport::from_records(JointState::new(3, 3), &[]);
        assert_eq!(empty.final_state, JointState::new(3, 3));
    }
}
