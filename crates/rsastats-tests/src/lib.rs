//! Inference battery for comparing RSA model evaluations.
//!
//! Provides the bootstrap pairwise test, three Student-t tests (pairwise,
//! against zero, against a noise ceiling), multiple-testing thresholds and a
//! model-comparison summary. Every test takes an [`Evaluations`] tensor of
//! shape `samples × models × trailing...` and returns p-values in `[0, 1]`.
//!
//! ```
//! use ndarray::array;
//! use rsastats_core::Evaluations;
//! use rsastats_tests::{Variance, pair_tests, t_tests};
//!
//! let evals = Evaluations::from_matrix(array![[0.8, 0.4], [0.7, 0.5], [0.9, 0.3]]);
//! let bootstrap = pair_tests(&evals).unwrap();
//! assert_eq!(bootstrap[[0, 1]], bootstrap[[1, 0]]);
//!
//! let variances = Variance::PerModel(array![0.01, 0.01]);
//! let parametric = t_tests(&evals, Some(&variances), 2.0).unwrap();
//! assert!(parametric[[0, 1]] < 1.0);
//! ```
//!
//! [`Evaluations`]: rsastats_core::Evaluations

pub mod bootstrap;
pub mod correction;
pub mod summary;
pub mod ttest;

pub use bootstrap::{pair_tests, pair_tests_samples};
pub use correction::{MultipleTesting, significant_pairs, threshold};
pub use summary::{
    ComparisonConfig, ErrorBars, ModelComparison, Resampling, SortOrder, compare_models,
};
pub use ttest::{CeilingVariance, Variance, t_test_0, t_test_nc, t_tests};
