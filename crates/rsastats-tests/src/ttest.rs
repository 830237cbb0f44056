//! Student-t tests on mean model evaluations.
//!
//! All three tests share one preparation step: the evaluation tensor is
//! collapsed to `samples × models`, averaged over samples, and the variance
//! estimate is promoted to a full covariance matrix over models.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rsastats_core::contrast::{pair_count, pairs, pairwise_contrast};
use rsastats_core::{Evaluations, InferenceError, Result};
use statrs::distribution::{ContinuousCDF, StudentsT};

// ═══════════════════════════════════════════════════════════════════════════════
// Variance estimates
// ═══════════════════════════════════════════════════════════════════════════════

/// Uncertainty of the mean evaluations.
#[derive(Debug, Clone, PartialEq)]
pub enum Variance {
    /// One variance per model; covariances are taken as zero.
    PerModel(Array1<f64>),
    /// Full `models × models` covariance matrix.
    Covariance(Array2<f64>),
}

impl Variance {
    /// Number of models the estimate covers.
    pub fn n_models(&self) -> usize {
        match self {
            Self::PerModel(v) => v.len(),
            Self::Covariance(c) => c.nrows(),
        }
    }

    /// The estimate as a covariance matrix.
    pub fn covariance(&self) -> Array2<f64> {
        match self {
            Self::PerModel(v) => Array2::from_diag(v),
            Self::Covariance(c) => c.clone(),
        }
    }

    fn checked_covariance(&self, n_models: usize) -> Result<Array2<f64>> {
        if let Self::Covariance(c) = self {
            if !c.is_square() {
                return Err(InferenceError::dimension_mismatch(
                    "covariance matrix",
                    format!("{n_models}x{n_models}"),
                    format!("{}x{}", c.nrows(), c.ncols()),
                ));
            }
        }
        if self.n_models() != n_models {
            return Err(InferenceError::dimension_mismatch(
                "variance estimate",
                n_models,
                self.n_models(),
            ));
        }
        Ok(self.covariance())
    }
}

impl From<Array1<f64>> for Variance {
    fn from(v: Array1<f64>) -> Self {
        Self::PerModel(v)
    }
}

impl From<Array2<f64>> for Variance {
    fn from(c: Array2<f64>) -> Self {
        Self::Covariance(c)
    }
}

/// Uncertainty of the noise ceiling in [`t_test_nc`].
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CeilingVariance {
    /// The ceiling is a known constant.
    #[default]
    NoCeilingVariance,
    /// Covariance of the ceiling with each model, followed by the
    /// ceiling's own variance (length `n_models + 1`).
    PairedCeilingVariance(Array1<f64>),
    /// Ceiling variance of an estimate independent of the models.
    IndependentCeilingVariance(f64),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Model means and covariance, checked against each other.
fn prepare(
    evaluations: &Evaluations,
    variances: Option<&Variance>,
    test: &'static str,
) -> Result<(Array1<f64>, Array2<f64>)> {
    let variances = variances.ok_or_else(|| InferenceError::missing_variance(test))?;
    let means = evaluations.model_means()?;
    let covariance = variances.checked_covariance(means.len())?;
    log::debug!(
        "{test}: {} models over {} samples",
        means.len(),
        evaluations.n_samples()
    );
    Ok((means, covariance))
}

fn student_t(dof: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, dof).map_err(|e| {
        InferenceError::InvalidDistribution(format!("Student-t with {dof} degrees of freedom: {e}"))
    })
}

fn two_sided(dist: &StudentsT, t: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    2.0 * dist.sf(t.abs())
}

fn upper_tail(dist: &StudentsT, t: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    dist.sf(t)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

/// Two-sided t-tests for every pair of models.
///
/// Differences `C·μ` and their variances `diag(C·Σ·Cᵀ)` come from the
/// pairwise contrast matrix `C`. The result is symmetric; the diagonal
/// holds `t = 0` and therefore `p = 1`.
///
/// A pair with zero difference and zero variance gives `0/0`, and its
/// p-value is NaN.
pub fn t_tests(
    evaluations: &Evaluations,
    variances: Option<&Variance>,
    dof: f64,
) -> Result<Array2<f64>> {
    let (means, covariance) = prepare(evaluations, variances, "pairwise t-test")?;
    let dist = student_t(dof)?;
    let m = means.len();

    let contrast = pairwise_contrast(m);
    let differences = contrast.dot(&means);
    let pair_variances = contrast.dot(&covariance).dot(&contrast.t()).diag().to_owned();
    debug_assert_eq!(differences.len(), pair_count(m));

    let mut t = Array2::<f64>::zeros((m, m));
    for (k, (i, j)) in pairs(m).enumerate() {
        let value = differences[k] / pair_variances[k].sqrt();
        t[[i, j]] = value;
        t[[j, i]] = value;
    }
    Ok(t.mapv(|value| two_sided(&dist, value)))
}

/// One-sided test of each model's mean against zero.
///
/// Returns `P(T ≥ t)` per model, so small p-values mean the model performs
/// above zero. A model with zero mean and zero variance gets a NaN p-value.
pub fn t_test_0(
    evaluations: &Evaluations,
    variances: Option<&Variance>,
    dof: f64,
) -> Result<Array1<f64>> {
    let (means, covariance) = prepare(evaluations, variances, "zero t-test")?;
    let dist = student_t(dof)?;
    let t = &means / &covariance.diag().mapv(f64::sqrt);
    Ok(t.mapv(|value| upper_tail(&dist, value)))
}

/// Two-sided test of each model's mean against the noise ceiling.
///
/// [`CeilingVariance::PairedCeilingVariance`] must hold exactly
/// `n_models + 1` entries: the covariance of the ceiling with each model,
/// then the ceiling's own variance. Any other length is a
/// [`InferenceError::DimensionMismatch`]. A model sitting exactly on the
/// ceiling with zero test variance gets a NaN p-value.
pub fn t_test_nc(
    evaluations: &Evaluations,
    variances: Option<&Variance>,
    noise_ceiling: f64,
    ceiling_variance: &CeilingVariance,
    dof: f64,
) -> Result<Array1<f64>> {
    let (means, covariance) = prepare(evaluations, variances, "noise ceiling t-test")?;
    let dist = student_t(dof)?;
    let test_variances = ceiling_adjusted(covariance.diag(), ceiling_variance)?;
    let t = (means - noise_ceiling) / test_variances.mapv(f64::sqrt);
    Ok(t.mapv(|value| two_sided(&dist, value)))
}

fn ceiling_adjusted(
    model_variances: ArrayView1<'_, f64>,
    ceiling_variance: &CeilingVariance,
) -> Result<Array1<f64>> {
    let m = model_variances.len();
    match ceiling_variance {
        CeilingVariance::NoCeilingVariance => Ok(model_variances.to_owned()),
        CeilingVariance::PairedCeilingVariance(c) => {
            if c.len() != m + 1 {
                return Err(InferenceError::dimension_mismatch(
                    "paired noise ceiling variance",
                    m + 1,
                    c.len(),
                ));
            }
            let own = c[m];
            let shared = c.slice_axis(Axis(0), (0..m).into());
            Ok(&model_variances - &(&shared * 2.0) + own)
        }
        CeilingVariance::IndependentCeilingVariance(s) => Ok(&model_variances + *s),
    }
}
