//! Consistency checks for model-evaluation inputs.
//!
//! [`input_check_model`] normalises the parameter and fitter arguments of an
//! evaluation run to one entry per model and allocates the zeroed buffer the
//! evaluation loop fills in.

use ndarray::{Array1, Array2};

use crate::error::{InferenceError, Result};
use crate::model::{Fitter, Model};

/// One model or a homogeneous list of models.
#[derive(Clone, Copy)]
pub enum ModelInput<'a> {
    Single(&'a dyn Model),
    List(&'a [&'a dyn Model]),
}

impl<'a> ModelInput<'a> {
    fn models(&self) -> Vec<&'a dyn Model> {
        match *self {
            Self::Single(model) => vec![model],
            Self::List(models) => models.to_vec(),
        }
    }
}

/// Fitting procedures requested by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FitterOverride {
    /// Every model keeps its own default fitter.
    #[default]
    Default,
    /// One fitter for all models.
    Broadcast(Fitter),
    /// One entry per model; `None` keeps that model's default.
    PerModel(Vec<Option<Fitter>>),
}

/// Zeroed evaluation storage shaped for the run.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationBuffer {
    /// Single model: one score per sample.
    PerSample(Array1<f64>),
    /// Model list with more than one sample: `samples × models`.
    SampleByModel(Array2<f64>),
    /// Model list with a single sample: one score per model.
    PerModel(Array1<f64>),
}

impl EvaluationBuffer {
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::PerSample(a) | Self::PerModel(a) => a.shape(),
            Self::SampleByModel(a) => a.shape(),
        }
    }
}

/// Normalised inputs: one parameter slot and one fitter per model.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInputs {
    pub evaluations: EvaluationBuffer,
    pub theta: Vec<Option<Vec<f64>>>,
    pub fitters: Vec<Fitter>,
}

/// Check model, parameter and fitter arguments and allocate the evaluation buffer.
///
/// `theta`, when given, must hold exactly one (possibly empty) parameter set
/// per model. `n_samples` is the number of bootstrap samples or folds the
/// caller will evaluate.
pub fn input_check_model(
    model: ModelInput<'_>,
    theta: Option<Vec<Option<Vec<f64>>>>,
    fitter: FitterOverride,
    n_samples: usize,
) -> Result<ValidatedInputs> {
    let models = model.models();
    let n_models = models.len();
    if n_models == 0 {
        return Err(InferenceError::validation(
            "model should be a Model or a non-empty list of Models",
        ));
    }
    if n_samples == 0 {
        return Err(InferenceError::validation(
            "number of evaluation samples must be at least 1",
        ));
    }

    let theta = match theta {
        Some(theta) if theta.len() != n_models => {
            return Err(InferenceError::validation(format!(
                "there should be equally many models as parameters: {n_models} models, {} parameter sets",
                theta.len()
            )));
        }
        Some(theta) => theta,
        None => vec![None; n_models],
    };

    let fitters = match fitter {
        FitterOverride::Default => models.iter().map(|m| m.default_fitter()).collect(),
        FitterOverride::Broadcast(f) => vec![f; n_models],
        FitterOverride::PerModel(list) => {
            if list.len() != n_models {
                return Err(InferenceError::validation(format!(
                    "if fitters are passed there should be as many as models: {n_models} models, {} fitters",
                    list.len()
                )));
            }
            list.into_iter()
                .zip(&models)
                .map(|(f, m)| f.unwrap_or_else(|| m.default_fitter()))
                .collect()
        }
    };

    let evaluations = match model {
        ModelInput::Single(_) => EvaluationBuffer::PerSample(Array1::zeros(n_samples)),
        ModelInput::List(_) if n_samples > 1 => {
            EvaluationBuffer::SampleByModel(Array2::zeros((n_samples, n_models)))
        }
        ModelInput::List(_) => EvaluationBuffer::PerModel(Array1::zeros(n_models)),
    };

    log::debug!(
        "validated {n_models} model(s), evaluation buffer shape {:?}",
        evaluations.shape()
    );

    Ok(ValidatedInputs {
        evaluations,
        theta,
        fitters,
    })
}
