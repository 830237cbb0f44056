//! Integration tests for rsastats-tests.
//!
//! Simulated bootstrap distributions go through every test in the battery
//! and through the comparison summary.

use ndarray::{Array1, Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rsastats_core::Evaluations;
use rsastats_tests::{
    CeilingVariance, ComparisonConfig, ErrorBars, MultipleTesting, SortOrder, Variance,
    compare_models, pair_tests, t_test_0, t_test_nc, t_tests,
};

/// `n` bootstrap samples of models with the given true means.
fn simulate(seed: u64, n: usize, means: &[f64], noise: f64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((n, means.len()), |(_, m)| {
        means[m] + rng.random_range(-noise..noise)
    })
}

fn sample_variance(samples: &Array2<f64>) -> Variance {
    Variance::PerModel(samples.var_axis(Axis(0), 0.0))
}

#[test]
fn all_p_values_in_unit_interval() {
    let samples = simulate(42, 200, &[0.3, 0.35, 0.6, 0.1], 0.2);
    let var = sample_variance(&samples);
    let evals = Evaluations::from_matrix(samples);

    let bootstrap = pair_tests(&evals).unwrap();
    let pairwise = t_tests(&evals, Some(&var), 1.0).unwrap();
    let zero = t_test_0(&evals, Some(&var), 1.0).unwrap();
    let ceiling = t_test_nc(&evals, Some(&var), 0.7, &CeilingVariance::NoCeilingVariance, 1.0)
        .unwrap();

    for p in bootstrap.iter().chain(pairwise.iter()).chain(zero.iter()).chain(ceiling.iter()) {
        assert!((0.0..=1.0).contains(p), "p-value {p} out of range");
    }
    assert!(bootstrap.iter().all(|&p| p >= 1.0 / 200.0));
}

#[test]
fn separated_models_are_significant() {
    let samples = simulate(7, 500, &[0.2, 0.5, 0.8], 0.1);
    let evals = Evaluations::from_matrix(samples);
    let names: Vec<String> = ["low", "mid", "high"].iter().map(|s| s.to_string()).collect();
    let config = ComparisonConfig {
        sort: SortOrder::Descending,
        correction: MultipleTesting::Bonferroni,
        ..Default::default()
    };
    let summary = compare_models(&evals, &names, &config).unwrap();
    assert_eq!(summary.models, vec!["high", "mid", "low"]);
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(summary.significant[[i, j]], i != j);
        }
    }
}

#[test]
fn overlapping_models_are_not_significant() {
    let samples = simulate(3, 400, &[0.5, 0.5], 0.2);
    let evals = Evaluations::from_matrix(samples);
    let names = vec!["a".to_string(), "b".to_string()];
    let summary = compare_models(&evals, &names, &ComparisonConfig::default()).unwrap();
    assert!(!summary.significant[[0, 1]]);
    assert!(summary.p_values[[0, 1]] > 0.05);
}

#[test]
fn noise_ceiling_modes_order_by_variance() {
    let samples = simulate(11, 100, &[0.4, 0.45], 0.1);
    let var = sample_variance(&samples);
    let evals = Evaluations::from_matrix(samples);

    let known = t_test_nc(&evals, Some(&var), 0.6, &CeilingVariance::NoCeilingVariance, 20.0)
        .unwrap();
    let independent = t_test_nc(
        &evals,
        Some(&var),
        0.6,
        &CeilingVariance::IndependentCeilingVariance(0.01),
        20.0,
    )
    .unwrap();
    // extra ceiling uncertainty can only weaken the evidence
    for (k, i) in known.iter().zip(independent.iter()) {
        assert!(k <= i);
    }
}

#[test]
fn ci_error_bars_bracket_the_mean() {
    let samples = simulate(5, 300, &[0.3, 0.6, 0.45], 0.15);
    let evals = Evaluations::from_matrix(samples);
    let names: Vec<String> = (0..3).map(|i| format!("m{i}")).collect();
    let config = ComparisonConfig {
        error_bars: ErrorBars::Ci { alpha: 0.05 },
        ..Default::default()
    };
    let summary = compare_models(&evals, &names, &config).unwrap();
    assert!(summary.error_low.iter().all(|&e| e > 0.0));
    assert!(summary.error_high.iter().all(|&e| e > 0.0));
    assert!(summary.description.contains("95% confidence interval"));
}

#[test]
fn folds_averaged_before_testing() {
    let mut rng = StdRng::seed_from_u64(99);
    let values = Array3::from_shape_fn((50, 2, 4), |(_, m, _)| {
        m as f64 * 0.5 + rng.random_range(-0.1..0.1)
    });
    let collapsed = Evaluations::from_matrix(values.mean_axis(Axis(2)).unwrap());
    let evals = Evaluations::new(values.into_dyn(), vec!["fold".into()]).unwrap();

    assert_eq!(pair_tests(&evals).unwrap(), pair_tests(&collapsed).unwrap());

    let var = Variance::PerModel(Array1::from_elem(2, 0.01));
    let a = t_tests(&evals, Some(&var), 5.0).unwrap();
    let b = t_tests(&collapsed, Some(&var), 5.0).unwrap();
    assert!((a[[0, 1]] - b[[0, 1]]).abs() < 1e-12);
}
