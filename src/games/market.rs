use crate::games::game::ActionId;
use crate::process::state::{JointState, Position};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIZE: Position = 6;
pub const DEFAULT_MOVES: [i32; 3] = [-1, 0, 1];
pub const DEFAULT_PRICE_LEVELS: usize = 5;

/// Hotelling line market with positions `0..=size`.
///
/// Firms move by one of `moves` per round and charge one of `price_levels`
/// equidistant prices in `[0, 1]`. Consumers are spread uniformly over the
/// line and buy from whichever firm is cheaper once travel is accounted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    size: Position,
    moves: Vec<i32>,
    price_levels: usize,
}

impl Default for Market {
    fn default() -> Self {
        Market::new(DEFAULT_SIZE, DEFAULT_MOVES.to_vec(), DEFAULT_PRICE_LEVELS)
    }
}

impl Market {
    pub fn new(size: Position, moves: Vec<i32>, price_levels: usize) -> Self {
        Market {
            size,
            moves,
            price_levels,
        }
    }

    pub fn size(&self) -> Position {
        self.size
    }

    pub fn moves(&self) -> &[i32] {
        &self.moves
    }

    pub fn move_actions(&self) -> usize {
        self.moves.len()
    }

    pub fn price_actions(&self) -> usize {
        self.price_levels
    }

    /// Moves both firms. A move that would leave the line is dropped for
    /// this round; the firm stays where it was.
    pub fn transition(&self, state: JointState, own: ActionId, other: ActionId) -> JointState {
        debug_assert!(state.is_within(self.size), "state {} off the market", state);
        JointState::new(
            self.step(state.own(), own),
            self.step(state.other(), other),
        )
    }

    fn step(&self, position: Position, action: ActionId) -> Position {
        let target = i64::from(position) + i64::from(self.moves[action]);
        if (0..=i64::from(self.size)).contains(&target) {
            target as Position
        } else {
            position
        }
    }

    /// Price charged for a price action, scaled into `[0, 1]`.
    pub fn price(&self, action: ActionId) -> f64 {
        debug_assert!(action < self.price_levels);
        action as f64 / (self.price_levels - 1) as f64
    }

    /// Location scaled into `[0, 1]`.
    pub fn location(&self, position: Position) -> f64 {
        position as f64 / self.size as f64
    }

    /// Profits of both firms after they set the given price actions.
    pub fn profit(&self, state: JointState, own: ActionId, other: ActionId) -> (f64, f64) {
        debug_assert!(state.is_within(self.size), "state {} off the market", state);
        let (p1, p2) = (self.price(own), self.price(other));
        let (s1, s2) = (self.location(state.own()), self.location(state.other()));

        if state.is_colocated() {
            return if p1 < p2 {
                (p1, 0.0)
            } else if p2 < p1 {
                (0.0, p2)
            } else {
                (p1 / 2.0, p2 / 2.0)
            };
        }

        // Location of the consumer indifferent between both firms.
        let d = (p2 - p1) / (2.0 * (s2 - s1)) + (s1 + s2) / 2.0;
        let left = d.max(0.0);
        let right = (1.0 - d).max(0.0);
        if s1 < s2 {
            (left * p1, right * p2)
        } else {
            (right * p1, left * p2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Market;
    use crate::process::state::JointState;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_transition_moves_and_clamps() {
        let market = Market::default();
        let s = JointState::new(3, 3);
        assert_eq!(market.transition(s, 0, 2), JointState::new(2, 4));
        assert_eq!(market.transition(s, 1, 1), s);
        assert_eq!(
            market.transition(JointState::new(0, 6), 0, 2),
            JointState::new(0, 6)
        );
        assert_eq!(
            market.transition(JointState::new(0, 6), 2, 0),
            JointState::new(1, 5)
        );
    }

    #[test]
    fn test_transition_stays_on_market() {
        let market = Market::default();
        for own in 0..=6 {
            for other in 0..=6 {
                for a in 0..3 {
                    for b in 0..3 {
                        let next = market.transition(JointState::new(own, other), a, b);
                        assert!(next.is_within(6));
                    }
                }
            }
        }
    }

    #[test]
    fn test_colocated_price_war() {
        let market = Market::default();
        let s = JointState::new(2, 2);
        assert_eq!(market.profit(s, 1, 3), (0.25, 0.0));
        assert_eq!(market.profit(s, 4, 0), (0.0, 0.0));
        assert_eq!(market.profit(s, 3, 2), (0.0, 0.5));
        assert_eq!(market.profit(s, 2, 2), (0.25, 0.25));
        assert_eq!(market.profit(s, 0, 0), (0.0, 0.0));
    }

    #[test]
    fn test_split_market() {
        let market = Market::default();
        // Equal prices, symmetric locations: the midpoint splits demand.
        let (r1, r2) = market.profit(JointState::new(2, 4), 4, 4);
        assert_abs_diff_eq!(r1, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(r2, 0.5, epsilon = 1e-12);

        // Roles swap cleanly when the first firm sits on the right.
        let (l1, l2) = market.profit(JointState::new(1, 4), 2, 3);
        let (m1, m2) = market.profit(JointState::new(4, 1), 3, 2);
        assert_abs_diff_eq!(l1, m2, epsilon = 1e-12);
        assert_abs_diff_eq!(l2, m1, epsilon = 1e-12);

        // d = (0.75 - 0.5) / (2 / 3) + 0.5 = 0.875
        let (r1, r2) = market.profit(JointState::new(2, 4), 2, 3);
        assert_abs_diff_eq!(r1, 0.875 * 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(r2, 0.125 * 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_undercut_from_afar_takes_everything() {
        let market = Market::default();
        let (r1, r2) = market.profit(JointState::new(0, 1), 4, 1);
        assert_eq!(r1, 0.0);
        assert!(r2 > 0.0);
    }
}
