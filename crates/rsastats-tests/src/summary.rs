//! Numeric summary of a model comparison: means, error bars, pairwise
//! significance and a one-paragraph description of the inference.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rsastats_core::contrast::pair_count;
use rsastats_core::{Evaluations, InferenceError, Result};
use serde::{Deserialize, Serialize};

use crate::bootstrap::pair_tests_samples;
use crate::correction::{MultipleTesting, significant_pairs, threshold};

// ═══════════════════════════════════════════════════════════════════════════════
// Options
// ═══════════════════════════════════════════════════════════════════════════════

/// Model order in the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Keep the input order.
    #[default]
    None,
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        })
    }
}

impl FromStr for SortOrder {
    type Err = InferenceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "ascending" => Ok(Self::Ascending),
            "descending" => Ok(Self::Descending),
            _ => Err(InferenceError::unsupported(s)),
        }
    }
}

/// How the spread of the bootstrap distribution is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorBars {
    /// Standard deviation of the bootstrap distribution (symmetric).
    #[default]
    Sem,
    /// Central interval leaving `alpha` of the samples outside.
    Ci { alpha: f64 },
}

/// What was resampled to obtain the bootstrap distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    /// Subjects (rows of the RDM collection).
    Rdm,
    /// Experimental conditions.
    Pattern,
    /// Subjects and conditions.
    Both,
}

impl Resampling {
    fn describe(&self) -> &'static str {
        match self {
            Self::Rdm => "Inference by bootstrap resampling of subjects.",
            Self::Pattern => "Inference by bootstrap resampling of experimental conditions.",
            Self::Both => {
                "Inference by bootstrap resampling of subjects and experimental conditions."
            }
        }
    }
}

impl FromStr for Resampling {
    type Err = InferenceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rdm" | "bootstrap_rdm" => Ok(Self::Rdm),
            "pattern" | "bootstrap_pattern" => Ok(Self::Pattern),
            "both" | "bootstrap" | "bootstrap_crossval" => Ok(Self::Both),
            _ => Err(InferenceError::unsupported(s)),
        }
    }
}

/// Options for [`compare_models`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub alpha: f64,
    pub correction: MultipleTesting,
    pub sort: SortOrder,
    pub error_bars: ErrorBars,
    pub resampling: Option<Resampling>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            correction: MultipleTesting::Fdr,
            sort: SortOrder::None,
            error_bars: ErrorBars::Sem,
            resampling: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Summary
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-model statistics and pairwise significance, in display order.
#[derive(Debug, Clone)]
pub struct ModelComparison {
    pub models: Vec<String>,
    pub means: Array1<f64>,
    /// Distance from the mean down to the lower end of the error bar.
    pub error_low: Array1<f64>,
    /// Distance from the mean up to the upper end of the error bar.
    pub error_high: Array1<f64>,
    pub p_values: Array2<f64>,
    pub threshold: f64,
    pub significant: Array2<bool>,
    /// Bootstrap samples left after dropping unevaluated ones.
    pub n_samples: usize,
    pub description: String,
}

/// Summarise the bootstrap distribution of model evaluations.
///
/// Trailing axes are averaged with NaN entries skipped, and samples in
/// which the first model was not evaluated are dropped before anything is
/// computed.
pub fn compare_models(
    evaluations: &Evaluations,
    names: &[String],
    config: &ComparisonConfig,
) -> Result<ModelComparison> {
    if names.len() != evaluations.n_models() {
        return Err(InferenceError::dimension_mismatch(
            "model names",
            evaluations.n_models(),
            names.len(),
        ));
    }
    check_alpha("alpha", config.alpha)?;
    if let ErrorBars::Ci { alpha } = config.error_bars {
        check_alpha("error bar alpha", alpha)?;
    }

    let samples = evaluations.complete_samples()?;
    let n_samples = samples.nrows();
    if n_samples == 0 {
        return Err(InferenceError::validation(
            "no bootstrap sample evaluated the first model",
        ));
    }
    log::debug!(
        "comparing {} models on {n_samples} of {} samples",
        names.len(),
        evaluations.n_samples()
    );

    let means = samples.sum_axis(Axis(0)) / n_samples as f64;
    let order = sort_order(&means, config.sort);
    let samples = samples.select(Axis(1), &order);
    let means = means.select(Axis(0), &order);
    let models: Vec<String> = order.iter().map(|&i| names[i].clone()).collect();

    let (error_low, error_high) = match config.error_bars {
        ErrorBars::Sem => {
            let sd = samples.std_axis(Axis(0), 0.0);
            (sd.clone(), sd)
        }
        ErrorBars::Ci { alpha } => {
            let low = samples.map_axis(Axis(0), |col| quantile(col, alpha / 2.0));
            let high = samples.map_axis(Axis(0), |col| quantile(col, 1.0 - alpha / 2.0));
            (&means - &low, &high - &means)
        }
    };

    let p_values = pair_tests_samples(samples.view())?;
    let crit = threshold(p_values.view(), config.alpha, config.correction);
    let significant = significant_pairs(p_values.view(), config.alpha, config.correction);
    let description = describe(config, pair_count(models.len()));

    Ok(ModelComparison {
        models,
        means,
        error_low,
        error_high,
        p_values,
        threshold: crit,
        significant,
        n_samples,
        description,
    })
}

fn check_alpha(what: &str, alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(InferenceError::validation(format!(
            "{what} must lie in (0, 1), got {alpha}"
        )))
    }
}

fn sort_order(means: &Array1<f64>, sort: SortOrder) -> Vec<usize> {
    let mut order: Vec<usize> = (0..means.len()).collect();
    match sort {
        SortOrder::None => {}
        SortOrder::Ascending => order.sort_by(|&a, &b| means[a].total_cmp(&means[b])),
        SortOrder::Descending => order.sort_by(|&a, &b| means[b].total_cmp(&means[a])),
    }
    order
}

/// Linearly interpolated quantile of a column, `q` in `[0, 1]`.
fn quantile(values: ArrayView1<'_, f64>, q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn describe(config: &ComparisonConfig, n_tests: usize) -> String {
    let alpha = config.alpha;
    let mut text = String::from("Model comparisons: two-tailed, ");
    text.push_str(&match config.correction {
        MultipleTesting::Bonferroni => format!(
            "p < {alpha:.3}, Bonferroni-corrected for {n_tests} model-pair comparisons"
        ),
        MultipleTesting::Fdr => {
            format!("FDR q < {alpha:.3} ({n_tests} model-pair comparisons)")
        }
        MultipleTesting::Uncorrected => {
            format!("p < {alpha:.3}, uncorrected ({n_tests} model-pair comparisons)")
        }
    });
    if let Some(resampling) = config.resampling {
        text.push('\n');
        text.push_str(resampling.describe());
    }
    text.push_str("\nError bars indicate the ");
    match config.error_bars {
        ErrorBars::Sem => text.push_str("standard error of the mean."),
        ErrorBars::Ci { alpha } => {
            text.push_str(&format!("{:.0}% confidence interval.", (1.0 - alpha) * 100.0));
        }
    }
    text
}
