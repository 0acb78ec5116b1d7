use crate::games::game::ActionId;
use ndarray::{Array1, ArrayView1};
use rand::Rng;

pub fn uniform(size: usize) -> Array1<f64> {
    Array1::from_elem(size, 1.0 / size as f64)
}

/// Draws an index with probability proportional to its weight.
/// Falls back to a uniform draw when the weights carry no mass.
pub fn sample_index<R: Rng + ?Sized>(weights: ArrayView1<f64>, rng: &mut R) -> ActionId {
    debug_assert!(weights.iter().all(|w| w.is_finite()));
    let size = weights.len();
    let sum: f64 = weights.sum();
    if sum <= 0.0 {
        return rng.gen_range(0..size);
    }
    let mut value: f64 = rng.gen_range(0.0..sum);
    for (i, w) in weights.iter().take(size - 1).enumerate() {
        if value < *w {
            return i;
        }
        value -= *w;
    }
    size - 1
}

/// Index and value of the first maximal entry.
pub fn argmax(values: ArrayView1<f64>) -> (ActionId, f64) {
    values
        .iter()
        .enumerate()
        .fold((0, values[0]), |(idx_max, val_max), (idx, val)| {
            if *val > val_max {
                (idx, *val)
            } else {
                (idx_max, val_max)
            }
        })
}

/// Learning rate of the n-th visit.
#[inline]
pub fn learning_rate(visits: u64) -> f64 {
    debug_assert!(visits > 0);
    1.0 / visits as f64
}

#[cfg(test)]
mod tests {
    use super::{argmax, learning_rate, sample_index, uniform};
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_check(weights: &[f64]) {
        let weights = arr1(weights);
        let mut counts = vec![0.0; weights.len()];
        let mut rng = SmallRng::seed_from_u64(0b101010001100011101010110001111);
        const COUNT: usize = 20000;
        for _ in 0..COUNT {
            counts[sample_index(weights.view(), &mut rng)] += 1.0;
        }
        let total = weights.sum();
        for (c, w) in counts.iter().zip(weights.iter()) {
            assert_abs_diff_eq!(c / COUNT as f64, w / total, epsilon = 0.015);
        }
    }

    #[test]
    fn test_sample_follows_weights() {
        sample_check(&[100.0, 100.0, 100.0]);
        sample_check(&[10.0, 0.0, 1.0]);
        sample_check(&[0.45, 0.45, 0.1]);
        sample_check(&[0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_sample_without_mass_is_uniform() {
        sample_check(&[1.0, 1.0, 1.0, 1.0]);
        let mut rng = SmallRng::seed_from_u64(3);
        let zeros = arr1(&[0.0, 0.0, 0.0]);
        for _ in 0..100 {
            assert!(sample_index(zeros.view(), &mut rng) < 3);
        }
    }

    #[test]
    fn test_argmax_prefers_first() {
        assert_eq!(argmax(arr1(&[0.0, 2.0, 2.0, -1.0]).view()), (1, 2.0));
        assert_eq!(argmax(arr1(&[0.0, 0.0]).view()), (0, 0.0));
        assert_eq!(argmax(arr1(&[-3.0, -2.0]).view()), (1, -2.0));
    }

    #[test]
    fn test_learning_rate_decreases() {
        let rates: Vec<f64> = (1..20).map(learning_rate).collect();
        assert_eq!(rates[0], 1.0);
        assert!(rates.windows(2).all(|w| w[1] < w[0]));
        assert_abs_diff_eq!(uniform(4).sum(), 1.0, epsilon = 1e-12);
    }
}
