//! Nash equilibria of bimatrix games by support enumeration.
//!
//! Candidate supports are visited by size, then lexicographically for the
//! row player, then lexicographically for the column player. The first
//! candidate pair whose indifference solution is a proper equilibrium wins,
//! so the result is deterministic for a given game. A support tied with an
//! action outside it (a degenerate game, e.g. all payoffs equal) is never
//! accepted; such games fall back to uniform mixing. This includes games
//! with a pure equilibrium whose best response is tied, e.g. both players
//! facing `[[1, 1], [0, 0]]`, which early in learning is common: the agents
//! then mix uniformly until their estimates separate.

use crate::games::game::{ActionId, BimatrixGame, Equilibrium};
use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView2};

const TOLERANCE: f64 = 1e-9;

/// Solves the game given by the two payoff matrices and returns the first
/// equilibrium found, or the uniform profile if enumeration finds none.
/// Never fails and never touches its inputs.
pub fn solve<'a>(
    row_payoffs: ArrayView2<'a, f64>,
    column_payoffs: ArrayView2<'a, f64>,
) -> Equilibrium {
    let game = BimatrixGame::new(row_payoffs, column_payoffs);
    first_equilibrium(&game).unwrap_or_else(|| {
        log::trace!("no equilibrium found by support enumeration, mixing uniformly");
        game.uniform_profile()
    })
}

pub fn first_equilibrium(game: &BimatrixGame) -> Option<Equilibrium> {
    equilibria(game).next()
}

/// Lazily enumerates all non-degenerate equilibria in enumeration order.
pub fn equilibria<'a>(game: &BimatrixGame<'a>) -> impl Iterator<Item = Equilibrium> + 'a {
    let game = *game;
    let rows = game.row_actions();
    let columns = game.column_actions();
    (1..=rows.min(columns))
        .flat_map(move |size| {
            (0..rows)
                .combinations(size)
                .cartesian_product((0..columns).combinations(size).collect::<Vec<_>>())
        })
        .filter_map(move |(row_support, column_support)| {
            check_supports(&game, &row_support, &column_support)
        })
}

fn check_supports(
    game: &BimatrixGame,
    row_support: &[ActionId],
    column_support: &[ActionId],
) -> Option<Equilibrium> {
    // The column mix must leave the row player indifferent over its support
    // and vice versa.
    let column_strategy = indifference_mix(
        game.row_payoffs(),
        row_support,
        column_support,
        game.column_actions(),
    )?;
    let row_strategy = indifference_mix(
        game.column_payoffs().reversed_axes(),
        column_support,
        row_support,
        game.row_actions(),
    )?;
    if !best_responses_match(&game.row_action_payoffs(&column_strategy), row_support)
        || !best_responses_match(&game.column_action_payoffs(&row_strategy), column_support)
    {
        return None;
    }
    Some(game.profile(row_strategy, column_strategy))
}

/// Mix over `mixed_support` (with `actions` entries in total) that makes
/// the opponent, whose payoffs are `payoffs[opponent_action, action]`,
/// indifferent between all actions of `indifferent_support`.
fn indifference_mix(
    payoffs: ArrayView2<f64>,
    indifferent_support: &[ActionId],
    mixed_support: &[ActionId],
    actions: usize,
) -> Option<Array1<f64>> {
    let k = mixed_support.len();
    debug_assert_eq!(indifferent_support.len(), k);

    // Unknowns: k probabilities followed by the common value v.
    let mut system = Array2::<f64>::zeros((k + 1, k + 1));
    let mut rhs = Array1::<f64>::zeros(k + 1);
    for (eq, &i) in indifferent_support.iter().enumerate() {
        for (var, &j) in mixed_support.iter().enumerate() {
            system[(eq, var)] = payoffs[(i, j)];
        }
        system[(eq, k)] = -1.0;
    }
    for var in 0..k {
        system[(k, var)] = 1.0;
    }
    rhs[k] = 1.0;

    let solution = solve_linear(system, rhs)?;
    let mut mix = Array1::<f64>::zeros(actions);
    for (var, &j) in mixed_support.iter().enumerate() {
        let p = solution[var];
        if !p.is_finite() || p <= TOLERANCE {
            return None;
        }
        mix[j] = p;
    }
    let sum = mix.sum();
    mix.mapv_inplace(|p| p / sum);
    Some(mix)
}

/// True if the support is exactly the set of best responses.
fn best_responses_match(payoffs: &Array1<f64>, support: &[ActionId]) -> bool {
    let best = payoffs.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    payoffs.iter().enumerate().all(|(action, &value)| {
        let is_best = value >= best - TOLERANCE;
        is_best == support.contains(&action)
    })
}

/// Gaussian elimination with partial pivoting. `None` for singular systems.
fn solve_linear(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| a[(x, col)].abs().total_cmp(&a[(y, col)].abs()))
            .unwrap_or(col);
        if a[(pivot, col)].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for c in 0..n {
                a.swap((pivot, c), (col, c));
            }
            b.swap(pivot, col);
        }
        for row in col + 1..n {
            let factor = a[(row, col)] / a[(col, col)];
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[(row, c)] -= factor * a[(col, c)];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|c| a[(row, c)] * x[c]).sum();
        x[row] = (b[row] - tail) / a[(row, row)];
    }
    Some(x)
}
