use crate::process::utils::uniform;
use ndarray::{Array1, ArrayView2};
use serde::Serialize;

pub type ActionId = usize;

/// Two-player general-sum game. Rows are the first player's actions,
/// columns the second player's; entry `(i, j)` of each matrix is that
/// player's payoff when row `i` meets column `j`.
#[derive(Debug, Clone, Copy)]
pub struct BimatrixGame<'a> {
    row_payoffs: ArrayView2<'a, f64>,
    column_payoffs: ArrayView2<'a, f64>,
}

/// A pair of mixed strategies together with the expected payoff each
/// player receives under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equilibrium {
    pub row_strategy: Array1<f64>,
    pub column_strategy: Array1<f64>,
    pub utilities: (f64, f64),
}

impl<'a> BimatrixGame<'a> {
    pub fn new(row_payoffs: ArrayView2<'a, f64>, column_payoffs: ArrayView2<'a, f64>) -> Self {
        assert_eq!(
            row_payoffs.dim(),
            column_payoffs.dim(),
            "payoff matrices must share the joint action set"
        );
        BimatrixGame {
            row_payoffs,
            column_payoffs,
        }
    }

    pub fn row_actions(&self) -> usize {
        self.row_payoffs.nrows()
    }

    pub fn column_actions(&self) -> usize {
        self.column_payoffs.ncols()
    }

    pub fn row_payoffs(&self) -> ArrayView2<'a, f64> {
        self.row_payoffs
    }

    pub fn column_payoffs(&self) -> ArrayView2<'a, f64> {
        self.column_payoffs
    }

    /// Expected payoff of every row action against a column mix.
    pub fn row_action_payoffs(&self, column_strategy: &Array1<f64>) -> Array1<f64> {
        self.row_payoffs.dot(column_strategy)
    }

    /// Expected payoff of every column action against a row mix.
    pub fn column_action_payoffs(&self, row_strategy: &Array1<f64>) -> Array1<f64> {
        self.column_payoffs.t().dot(row_strategy)
    }

    pub fn expected_utilities(
        &self,
        row_strategy: &Array1<f64>,
        column_strategy: &Array1<f64>,
    ) -> (f64, f64) {
        (
            row_strategy.dot(&self.row_payoffs.dot(column_strategy)),
            row_strategy.dot(&self.column_payoffs.dot(column_strategy)),
        )
    }

    pub fn profile(&self, row_strategy: Array1<f64>, column_strategy: Array1<f64>) -> Equilibrium {
        let utilities = self.expected_utilities(&row_strategy, &column_strategy);
        Equilibrium {
            row_strategy,
            column_strategy,
            utilities,
        }
    }

    /// Both players mixing uniformly over all their actions.
    pub fn uniform_profile(&self) -> Equilibrium {
        self.profile(uniform(self.row_actions()), uniform(self.column_actions()))
    }
}

#[cfg(test)]
mod tests {
    use super::BimatrixGame;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_expected_utilities() {
        let a = arr2(&[[3.0, 0.0], [5.0, 1.0]]);
        let b = arr2(&[[3.0, 5.0], [0.0, 1.0]]);
        let game = BimatrixGame::new(a.view(), b.view());
        let (u1, u2) = game.expected_utilities(&arr1(&[1.0, 0.0]), &arr1(&[0.0, 1.0]));
        assert_eq!((u1, u2), (0.0, 5.0));

        let half = arr1(&[0.5, 0.5]);
        let (u1, u2) = game.expected_utilities(&half, &half);
        assert_abs_diff_eq!(u1, 2.25, epsilon = 1e-12);
        assert_abs_diff_eq!(u2, 2.25, epsilon = 1e-12);
        assert_eq!(game.row_action_payoffs(&half), arr1(&[1.5, 3.0]));
        assert_eq!(game.column_action_payoffs(&half), arr1(&[1.5, 3.0]));
    }

    #[test]
    fn test_uniform_profile() {
        let a = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let b = a.t().to_owned();
        let game = BimatrixGame::new(a.view(), b.view());
        let eq = game.uniform_profile();
        assert_abs_diff_eq!(eq.row_strategy.sum(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eq.utilities.0, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eq.utilities.1, 5.0, epsilon = 1e-12);
    }
}
