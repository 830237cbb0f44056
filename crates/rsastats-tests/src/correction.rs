//! Multiple-testing correction for pairwise p-value matrices.
//!
//! A matrix over `m` models carries `m(m-1)/2` distinct comparisons in its
//! upper triangle. Corrections turn a nominal alpha into a single p-value
//! threshold for those comparisons.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView2};
use rsastats_core::contrast::{pair_count, pairs};
use rsastats_core::InferenceError;
use serde::{Deserialize, Serialize};

/// Correction applied across all model pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultipleTesting {
    #[serde(alias = "none")]
    Uncorrected,
    /// Family-wise error rate.
    #[serde(alias = "fwer")]
    Bonferroni,
    /// False-discovery rate (Benjamini-Hochberg).
    #[default]
    Fdr,
}

impl fmt::Display for MultipleTesting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uncorrected => "uncorrected",
            Self::Bonferroni => "bonferroni",
            Self::Fdr => "fdr",
        })
    }
}

impl FromStr for MultipleTesting {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "uncorrected" => Ok(Self::Uncorrected),
            "bonferroni" | "fwer" => Ok(Self::Bonferroni),
            "fdr" => Ok(Self::Fdr),
            _ => Err(InferenceError::unsupported(s)),
        }
    }
}

/// Upper-triangle p-values, one per model pair.
fn pair_p_values(p_values: ArrayView2<'_, f64>) -> Vec<f64> {
    pairs(p_values.nrows()).map(|(i, j)| p_values[[i, j]]).collect()
}

/// p-value threshold below which a pairwise comparison is significant.
pub fn threshold(p_values: ArrayView2<'_, f64>, alpha: f64, method: MultipleTesting) -> f64 {
    let n_tests = pair_count(p_values.nrows());
    match method {
        MultipleTesting::Uncorrected => alpha,
        MultipleTesting::Bonferroni => alpha / n_tests.max(1) as f64,
        MultipleTesting::Fdr => fdr_threshold(&pair_p_values(p_values), alpha),
    }
}

/// Benjamini-Hochberg step-up criterion at the largest passing rank, or 0.
fn fdr_threshold(p_values: &[f64], alpha: f64) -> f64 {
    let mut sorted = p_values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = sorted.len() as f64;

    sorted
        .iter()
        .enumerate()
        .map(|(k, &p)| (p, alpha * (k + 1) as f64 / n))
        .filter(|(p, criterion)| p < criterion)
        .map(|(_, criterion)| criterion)
        .next_back()
        .unwrap_or(0.0)
}

/// `p < threshold` for every model pair; the diagonal is never significant.
pub fn significant_pairs(
    p_values: ArrayView2<'_, f64>,
    alpha: f64,
    method: MultipleTesting,
) -> Array2<bool> {
    let crit = threshold(p_values, alpha, method);
    let mut significant = p_values.mapv(|p| p < crit);
    significant.diag_mut().fill(false);
    significant
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn four_models() -> Array2<f64> {
        array![
            [1.0, 0.001, 0.020, 0.300],
            [0.001, 1.0, 0.040, 0.010],
            [0.020, 0.040, 1.0, 0.800],
            [0.300, 0.010, 0.800, 1.0],
        ]
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("FDR".parse::<MultipleTesting>().unwrap(), MultipleTesting::Fdr);
        assert_eq!("fwer".parse::<MultipleTesting>().unwrap(), MultipleTesting::Bonferroni);
        assert_eq!("none".parse::<MultipleTesting>().unwrap(), MultipleTesting::Uncorrected);
        assert!(matches!(
            "holm".parse::<MultipleTesting>(),
            Err(InferenceError::UnsupportedMetric(_))
        ));
    }

    #[test]
    fn test_uncorrected_threshold_is_alpha() {
        let p = four_models();
        assert_abs_diff_eq!(threshold(p.view(), 0.05, MultipleTesting::Uncorrected), 0.05);
    }

    #[test]
    fn test_bonferroni_divides_by_pairs() {
        let p = four_models();
        assert_abs_diff_eq!(threshold(p.view(), 0.05, MultipleTesting::Bonferroni), 0.05 / 6.0);
        let sig = significant_pairs(p.view(), 0.05, MultipleTesting::Bonferroni);
        assert!(sig[[0, 1]] && sig[[1, 0]]);
        assert!(!sig[[1, 3]]);
    }

    #[test]
    fn test_fdr_step_up() {
        // sorted: 0.001, 0.010, 0.020, 0.040, 0.300, 0.800
        // criteria at q=0.05: 0.0083, 0.0167, 0.025, 0.0333, 0.0417, 0.05
        // largest passing rank is 3
        let p = four_models();
        let crit = threshold(p.view(), 0.05, MultipleTesting::Fdr);
        assert_abs_diff_eq!(crit, 0.025, epsilon = 1e-12);
        let sig = significant_pairs(p.view(), 0.05, MultipleTesting::Fdr);
        assert!(sig[[0, 2]]);
        assert!(!sig[[1, 2]]);
    }

    #[test]
    fn test_fdr_zero_when_nothing_passes() {
        let p = array![[1.0, 0.5, 0.6], [0.5, 1.0, 0.9], [0.6, 0.9, 1.0]];
        assert_eq!(threshold(p.view(), 0.05, MultipleTesting::Fdr), 0.0);
        let sig = significant_pairs(p.view(), 0.05, MultipleTesting::Fdr);
        assert!(sig.iter().all(|&s| !s));
    }

    #[test]
    fn test_diagonal_never_significant() {
        let p = Array2::<f64>::zeros((3, 3));
        let sig = significant_pairs(p.view(), 0.05, MultipleTesting::Uncorrected);
        for i in 0..3 {
            assert!(!sig[[i, i]]);
        }
        assert!(sig[[0, 1]]);
    }
}
