//! Consensus RDM for a collection under a chosen comparison method.
//!
//! Pooling normalises each row the way the comparison method would, then
//! averages column-wise over observed entries. The pooled RDM is the one
//! with maximal summed similarity to all input rows under that method,
//! which makes it the reference for noise-ceiling estimates.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{InferenceError, Result};
use crate::rdm::Rdms;
use crate::reduction::{column_mean, masked_min, masked_rank, row_mean, row_rms, row_std, validity_mask};

/// RDM comparison method the pooled RDM is optimised for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolMethod {
    /// Plain column mean of the raw dissimilarities.
    #[serde(rename = "euclid")]
    Euclid,
    /// Rows scaled to unit root-mean-square before averaging.
    #[default]
    #[serde(rename = "cosine")]
    Cosine,
    /// Same normalisation as [`PoolMethod::Cosine`].
    #[serde(rename = "cosine_cov")]
    CosineCov,
    /// Rows centred and scaled to unit standard deviation; the mean is shifted to start at 0.
    #[serde(rename = "corr")]
    Corr,
    /// Same normalisation as [`PoolMethod::Corr`].
    #[serde(rename = "corr_cov")]
    CorrCov,
    /// Rows replaced by their average ranks.
    #[serde(rename = "spearman")]
    Spearman,
    /// Same normalisation as [`PoolMethod::Spearman`].
    #[serde(rename = "rho-a")]
    RhoA,
    /// Average ranks, with a warning that tau has no exact pooled RDM.
    #[serde(rename = "kendall")]
    Kendall,
    /// Same as [`PoolMethod::Kendall`].
    #[serde(rename = "tau-b")]
    TauB,
    /// Same as [`PoolMethod::Kendall`].
    #[serde(rename = "tau-a")]
    TauA,
}

impl PoolMethod {
    pub const ALL: [PoolMethod; 10] = [
        Self::Euclid,
        Self::Cosine,
        Self::CosineCov,
        Self::Corr,
        Self::CorrCov,
        Self::Spearman,
        Self::RhoA,
        Self::Kendall,
        Self::TauB,
        Self::TauA,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Euclid => "euclid",
            Self::Cosine => "cosine",
            Self::CosineCov => "cosine_cov",
            Self::Corr => "corr",
            Self::CorrCov => "corr_cov",
            Self::Spearman => "spearman",
            Self::RhoA => "rho-a",
            Self::Kendall => "kendall",
            Self::TauB => "tau-b",
            Self::TauA => "tau-a",
        }
    }

    /// Kendall-type methods are pooled on averaged ranks, which only
    /// approximates the tau-optimal RDM.
    pub fn is_tau(&self) -> bool {
        matches!(self, Self::Kendall | Self::TauB | Self::TauA)
    }
}

impl fmt::Display for PoolMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolMethod {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| InferenceError::unsupported(s))
    }
}

/// Pool `rdms` into a single RDM under `method`.
///
/// Columns missing in every input row stay NaN. Collection descriptors,
/// the dissimilarity measure and pattern descriptors are copied; per-RDM
/// descriptors are dropped because the result is not any one input row.
pub fn pool_rdm(rdms: &Rdms, method: PoolMethod) -> Rdms {
    let vectors = rdms.vectors();
    let mask = validity_mask(vectors);
    log::debug!(
        "pooling {} RDM(s) of {} pairs with {method}",
        rdms.n_rdm(),
        rdms.n_pairs()
    );

    let pooled = match method {
        PoolMethod::Euclid => pool_euclid(vectors, mask.view()),
        PoolMethod::Cosine | PoolMethod::CosineCov => pool_cosine(vectors, mask.view()),
        PoolMethod::Corr | PoolMethod::CorrCov => pool_corr(vectors, mask.view()),
        PoolMethod::Spearman | PoolMethod::RhoA => pool_ranks(vectors, mask.view()),
        PoolMethod::Kendall | PoolMethod::TauB | PoolMethod::TauA => {
            log::warn!("Noise ceiling for tau based on averaged ranks!");
            pool_ranks(vectors, mask.view())
        }
    };

    rdms.with_vectors(pooled.insert_axis(Axis(0)), false)
}

/// [`pool_rdm`] with the method given by name.
pub fn pool_rdm_by_name(rdms: &Rdms, method: &str) -> Result<Rdms> {
    Ok(pool_rdm(rdms, method.parse()?))
}

fn pool_euclid(vectors: ArrayView2<'_, f64>, mask: ArrayView2<'_, bool>) -> Array1<f64> {
    column_mean(vectors, mask).0
}

fn pool_cosine(vectors: ArrayView2<'_, f64>, mask: ArrayView2<'_, bool>) -> Array1<f64> {
    let rms = row_rms(vectors, mask).insert_axis(Axis(1));
    let scaled = &vectors / &rms;
    column_mean(scaled.view(), mask).0
}

fn pool_corr(vectors: ArrayView2<'_, f64>, mask: ArrayView2<'_, bool>) -> Array1<f64> {
    let mean = row_mean(vectors, mask).insert_axis(Axis(1));
    let centred = &vectors - &mean;
    let std = row_std(centred.view(), mask).insert_axis(Axis(1));
    let standardised = centred / &std;

    let (pooled, observed) = column_mean(standardised.view(), mask);
    match masked_min(pooled.view(), observed.view()) {
        Some(min) => pooled - min,
        None => pooled,
    }
}

fn pool_ranks(vectors: ArrayView2<'_, f64>, mask: ArrayView2<'_, bool>) -> Array1<f64> {
    let mut ranks = Array2::<f64>::zeros(vectors.raw_dim());
    for ((mut out, row), m) in ranks
        .outer_iter_mut()
        .zip(vectors.outer_iter())
        .zip(mask.outer_iter())
    {
        out.assign(&masked_rank(row, m));
    }
    column_mean(ranks.view(), mask).0
}
