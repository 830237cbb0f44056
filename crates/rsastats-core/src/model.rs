//! Model trait and fitting procedures.
//!
//! Every candidate model implements the [`Model`] trait, which provides a
//! stable name, the fitting procedure it uses by default, and RDM
//! predictions for a parameter vector. Building the selectable,
//! interpolated or weighted model families is the job of the model layer;
//! this crate only reads identity and default fitters.

use std::fmt;

use ndarray::Array1;

use crate::rdm::Rdms;

/// Signature of a fitting procedure: estimate parameters of `model` on `data`.
pub type FitFn = fn(&dyn Model, &Rdms) -> Option<Vec<f64>>;

/// A named fitting procedure.
///
/// Two fitters compare equal when their names match, so a model's default
/// fitter can be recognised after it has been copied into a fitter list.
#[derive(Clone, Copy)]
pub struct Fitter {
    name: &'static str,
    func: FitFn,
}

impl Fitter {
    pub const fn new(name: &'static str, func: FitFn) -> Self {
        Self { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the procedure. Returns `None` for models without parameters.
    pub fn fit(&self, model: &dyn Model, data: &Rdms) -> Option<Vec<f64>> {
        (self.func)(model, data)
    }
}

impl PartialEq for Fitter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Fitter {}

impl fmt::Debug for Fitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fitter").field(&self.name).finish()
    }
}

/// Trait that every model must implement.
pub trait Model: Send + Sync {
    /// Stable display name (e.g. `"Layer03"`).
    fn name(&self) -> &str;

    /// Fitting procedure used when the caller does not override it.
    fn default_fitter(&self) -> Fitter;

    /// Number of free parameters.
    fn n_params(&self) -> usize {
        0
    }

    /// Predicted dissimilarity vector for the given parameters.
    fn predict(&self, theta: Option<&[f64]>) -> Array1<f64>;
}

/// Fitter for parameter-free models: there is nothing to estimate.
pub fn fit_mock(_model: &dyn Model, _data: &Rdms) -> Option<Vec<f64>> {
    None
}

/// Default fitter of [`FixedModel`].
pub const MOCK_FITTER: Fitter = Fitter::new("fit_mock", fit_mock);

/// A model whose prediction is one constant RDM.
///
/// A pooled RDM wrapped in a `FixedModel` can be evaluated like any other
/// candidate, e.g. as a noise-ceiling reference.
#[derive(Debug, Clone)]
pub struct FixedModel {
    name: String,
    rdm: Array1<f64>,
}

impl FixedModel {
    pub fn new(name: impl Into<String>, rdm: Array1<f64>) -> Self {
        Self {
            name: name.into(),
            rdm,
        }
    }

    /// Use the first row of an RDM collection as the prediction.
    pub fn from_rdms(name: impl Into<String>, rdms: &Rdms) -> Option<Self> {
        let row = rdms.vectors().outer_iter().next()?.to_owned();
        Some(Self::new(name, row))
    }
}

impl Model for FixedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_fitter(&self) -> Fitter {
        MOCK_FITTER
    }

    fn predict(&self, _theta: Option<&[f64]>) -> Array1<f64> {
        self.rdm.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fit_ones(model: &dyn Model, _data: &Rdms) -> Option<Vec<f64>> {
        Some(vec![1.0; model.n_params().max(1)])
    }

    #[test]
    fn test_fixed_model_prediction_ignores_theta() {
        let model = FixedModel::new("fixed", array![1.0, 2.0, 3.0]);
        assert_eq!(model.predict(None), array![1.0, 2.0, 3.0]);
        assert_eq!(model.predict(Some(&[9.0])), array![1.0, 2.0, 3.0]);
        assert_eq!(model.n_params(), 0);
    }

    #[test]
    fn test_mock_fitter_returns_no_parameters() {
        let model = FixedModel::new("fixed", array![1.0, 2.0, 3.0]);
        let data = Rdms::new(array![[1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(model.default_fitter(), MOCK_FITTER);
        assert_eq!(model.default_fitter().fit(&model, &data), None);
    }

    #[test]
    fn test_fitter_equality_by_name() {
        let a = Fitter::new("ones", fit_ones);
        let b = Fitter::new("ones", fit_ones);
        assert_eq!(a, b);
        assert_ne!(a, MOCK_FITTER);
        assert_eq!(format!("{a:?}"), "Fitter(\"ones\")");
    }

    #[test]
    fn test_fixed_model_from_rdms() {
        let rdms = Rdms::new(array![[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]).unwrap();
        let model = FixedModel::from_rdms("pooled", &rdms).unwrap();
        assert_eq!(model.name(), "pooled");
        assert_eq!(model.predict(None), array![0.1, 0.2, 0.3]);
    }
}
