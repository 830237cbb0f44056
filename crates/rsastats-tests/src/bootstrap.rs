//! Bootstrap pairwise model comparison.
//!
//! The dispersion comes from the bootstrap samples themselves: for each pair
//! of models the test counts how often one model scored below the other.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rsastats_core::contrast::pairs;
use rsastats_core::{Evaluations, InferenceError, Result};

/// Two-sided bootstrap p-values for every pair of models.
///
/// Trailing axes are averaged out first. The result is symmetric with a
/// unit diagonal and never drops below `1/n` for `n` samples.
pub fn pair_tests(evaluations: &Evaluations) -> Result<Array2<f64>> {
    let samples = evaluations.collapsed()?;
    pair_tests_samples(samples.view())
}

/// [`pair_tests`] on an explicit `samples × models` matrix.
pub fn pair_tests_samples(samples: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
    let (n, m) = samples.dim();
    if n == 0 {
        return Err(InferenceError::validation(
            "bootstrap test needs at least one sample",
        ));
    }
    log::debug!("bootstrap pair tests: {n} samples, {m} models");

    let mut p = Array2::<f64>::ones((m, m));
    for (i, j) in pairs(m) {
        let value = pair_p_value(samples.column(i), samples.column(j));
        p[[i, j]] = value;
        p[[j, i]] = value;
    }
    Ok(p)
}

/// Continuity-corrected two-sided p-value for one model pair.
fn pair_p_value(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let n = a.len();
    let (below, ties) = a
        .iter()
        .zip(b.iter())
        .fold((0usize, 0usize), |(below, ties), (x, y)| {
            if x < y {
                (below + 1, ties)
            } else if x == y {
                (below, ties + 1)
            } else {
                (below, ties)
            }
        });

    // all samples tied: no evidence either way
    let proportion = if ties == n {
        0.5
    } else {
        below as f64 / (n - ties) as f64
    };
    let p = 2.0 * proportion.min(1.0 - proportion);

    let nf = n as f64;
    (nf - 1.0) / nf * p + 1.0 / nf
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array3, array};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_samples(seed: u64, n: usize, m: usize) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((n, m), |_| rng.random::<f64>())
    }

    #[test]
    fn test_ordered_models() {
        // A > B > C in every sample
        let samples = array![
            [0.9, 0.6, 0.2],
            [0.8, 0.5, 0.1],
            [0.7, 0.6, 0.3],
            [0.9, 0.4, 0.2],
        ];
        let p = pair_tests_samples(samples.view()).unwrap();
        assert!(p[[0, 2]] <= p[[0, 1]]);
        assert!(p[[0, 2]] <= p[[1, 2]]);
        // every pair is maximally separated: only the continuity term remains
        assert_abs_diff_eq!(p[[0, 2]], 0.25);
    }

    #[test]
    fn test_symmetric_unit_diagonal() {
        let samples = random_samples(1, 50, 4);
        let p = pair_tests_samples(samples.view()).unwrap();
        for i in 0..4 {
            assert_eq!(p[[i, i]], 1.0);
            for j in 0..4 {
                assert_eq!(p[[i, j]], p[[j, i]]);
            }
        }
    }

    #[test]
    fn test_bounded_below_by_one_over_n() {
        for seed in 0..10 {
            let n = 20 + seed as usize;
            let samples = random_samples(seed, n, 5);
            let p = pair_tests_samples(samples.view()).unwrap();
            let floor = 1.0 / n as f64;
            assert!(p.iter().all(|&v| v >= floor - 1e-12 && v <= 1.0));
        }
    }

    #[test]
    fn test_all_ties_give_one() {
        let samples = array![[0.5, 0.5], [0.2, 0.2], [0.7, 0.7]];
        let p = pair_tests_samples(samples.view()).unwrap();
        assert_abs_diff_eq!(p[[0, 1]], 1.0);
    }

    #[test]
    fn test_ties_removed_from_denominator() {
        // one tie, one below, two above: proportion 1/3, p = 2/3
        let samples = array![[0.5, 0.5], [0.1, 0.2], [0.3, 0.2], [0.4, 0.2]];
        let p = pair_tests_samples(samples.view()).unwrap();
        assert_abs_diff_eq!(p[[0, 1]], 0.75 * (2.0 / 3.0) + 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_trailing_axes_averaged() {
        // fold values cancel out to identical models
        let values = Array3::from_shape_vec((2, 2, 2), vec![0.25, 0.75, 0.75, 0.25, 0.0, 1.0, 0.5, 0.5])
            .unwrap();
        let evals = Evaluations::new(values.into_dyn(), vec!["fold".into()]).unwrap();
        let p = pair_tests(&evals).unwrap();
        assert_abs_diff_eq!(p[[0, 1]], 1.0);
    }

    #[test]
    fn test_no_samples_fails() {
        let err = pair_tests_samples(Array2::<f64>::zeros((0, 3)).view()).unwrap_err();
        assert!(matches!(err, InferenceError::Validation(_)));
    }

    #[test]
    fn test_single_sample() {
        let p = pair_tests_samples(array![[0.1, 0.9]].view()).unwrap();
        assert_abs_diff_eq!(p[[0, 1]], 1.0);
    }
}
