//! Model evaluation tensors.
//!
//! Axis 0 indexes bootstrap samples (or folds), axis 1 indexes models. Any
//! further axes are *named* trailing axes such as cross-validation folds;
//! callers reduce them explicitly with [`Evaluations::reduce`] or all at
//! once with [`Evaluations::collapsed`].

use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayViewD, Axis, Ix2, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{InferenceError, Result};

/// Evaluation scores with shape `samples × models × trailing...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluations {
    values: ArrayD<f64>,
    trailing_axes: Vec<String>,
}

impl Evaluations {
    /// Wrap a tensor whose axes beyond the second are named by `trailing_axes`.
    pub fn new(values: ArrayD<f64>, trailing_axes: Vec<String>) -> Result<Self> {
        let expected = 2 + trailing_axes.len();
        if values.ndim() != expected {
            return Err(InferenceError::dimension_mismatch(
                "evaluation tensor rank",
                expected,
                values.ndim(),
            ));
        }
        for (k, name) in trailing_axes.iter().enumerate() {
            if trailing_axes[..k].contains(name) {
                return Err(InferenceError::validation(format!(
                    "trailing axis '{name}' named twice"
                )));
            }
            if values.len_of(Axis(k + 2)) == 0 {
                return Err(InferenceError::validation(format!(
                    "trailing axis '{name}' is empty"
                )));
            }
        }
        Ok(Self {
            values,
            trailing_axes,
        })
    }

    /// A plain `samples × models` matrix with no trailing axes.
    pub fn from_matrix(values: Array2<f64>) -> Self {
        Self {
            values: values.into_dyn(),
            trailing_axes: Vec::new(),
        }
    }

    pub fn n_samples(&self) -> usize {
        self.values.len_of(Axis(0))
    }

    pub fn n_models(&self) -> usize {
        self.values.len_of(Axis(1))
    }

    pub fn trailing_axes(&self) -> &[String] {
        &self.trailing_axes
    }

    pub fn values(&self) -> ArrayViewD<'_, f64> {
        self.values.view()
    }

    /// Average over the named trailing axes, keeping the others.
    pub fn reduce(&self, axes: &[&str]) -> Result<Self> {
        let mut positions = Vec::with_capacity(axes.len());
        for name in axes {
            let pos = self
                .trailing_axes
                .iter()
                .position(|a| a == name)
                .ok_or_else(|| {
                    InferenceError::validation(format!("no trailing axis named '{name}'"))
                })?;
            if positions.contains(&pos) {
                return Err(InferenceError::validation(format!(
                    "trailing axis '{name}' requested twice"
                )));
            }
            positions.push(pos);
        }
        // Highest axis first so the remaining indices stay valid.
        positions.sort_unstable_by(|a, b| b.cmp(a));

        let mut values = self.values.clone();
        let mut trailing_axes = self.trailing_axes.clone();
        for pos in positions {
            values = mean_over(&values, Axis(pos + 2));
            trailing_axes.remove(pos);
        }
        Ok(Self {
            values,
            trailing_axes,
        })
    }

    /// The `samples × models` matrix with every trailing axis averaged out.
    pub fn collapsed(&self) -> Result<Array2<f64>> {
        let mut values = self.values.clone();
        while values.ndim() > 2 {
            values = mean_over(&values, Axis(values.ndim() - 1));
        }
        into_matrix(values)
    }

    /// Like [`collapsed`](Self::collapsed), but NaN entries are skipped while averaging.
    pub fn nan_collapsed(&self) -> Result<Array2<f64>> {
        let mut values = self.values.clone();
        while values.ndim() > 2 {
            let axis = Axis(values.ndim() - 1);
            values = values.map_axis(axis, nan_mean);
        }
        into_matrix(values)
    }

    /// NaN-aware collapse, keeping only samples where the first model was evaluated.
    pub fn complete_samples(&self) -> Result<Array2<f64>> {
        let collapsed = self.nan_collapsed()?;
        let keep: Vec<usize> = (0..collapsed.nrows())
            .filter(|&i| collapsed.ncols() > 0 && !collapsed[[i, 0]].is_nan())
            .collect();
        Ok(collapsed.select(Axis(0), &keep))
    }

    /// Mean evaluation per model (samples and trailing axes averaged).
    pub fn model_means(&self) -> Result<Array1<f64>> {
        let collapsed = self.collapsed()?;
        if collapsed.nrows() == 0 {
            return Err(InferenceError::validation("evaluation tensor has no samples"));
        }
        let n = collapsed.nrows() as f64;
        Ok(collapsed.sum_axis(Axis(0)) / n)
    }
}

fn mean_over(values: &ArrayD<f64>, axis: Axis) -> ArrayD<f64> {
    values.map_axis(axis, |lane| lane.sum() / lane.len() as f64)
}

fn nan_mean(lane: ArrayView1<'_, f64>) -> f64 {
    let (sum, count) = lane
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

fn into_matrix(values: ArrayD<f64>) -> Result<Array2<f64>> {
    let shape = format!("{:?}", values.shape());
    values
        .into_dimensionality::<Ix2>()
        .map_err(|_| InferenceError::dimension_mismatch("collapsed evaluations", "2 axes", shape))
}

/// JSON form of an evaluation tensor: row-major values, `null` = not evaluated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationsRecord {
    pub shape: Vec<usize>,
    pub values: Vec<Option<f64>>,
    #[serde(default)]
    pub trailing_axes: Vec<String>,
    #[serde(default)]
    pub models: Vec<String>,
}

impl EvaluationsRecord {
    /// Validate the record and split it into the tensor and per-model names.
    ///
    /// Missing names default to `model_0`, `model_1`, ...
    pub fn into_parts(self) -> Result<(Evaluations, Vec<String>)> {
        let values: Vec<f64> = self
            .values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        let expected: usize = self.shape.iter().product();
        if values.len() != expected {
            return Err(InferenceError::dimension_mismatch(
                "evaluation values",
                expected,
                values.len(),
            ));
        }
        let tensor = ArrayD::from_shape_vec(IxDyn(&self.shape), values)
            .map_err(|e| InferenceError::validation(e.to_string()))?;
        let evaluations = Evaluations::new(tensor, self.trailing_axes)?;

        let n_models = evaluations.n_models();
        let models = if self.models.is_empty() {
            (0..n_models).map(|i| format!("model_{i}")).collect()
        } else if self.models.len() == n_models {
            self.models
        } else {
            return Err(InferenceError::dimension_mismatch(
                "model names",
                n_models,
                self.models.len(),
            ));
        };
        Ok((evaluations, models))
    }
}
