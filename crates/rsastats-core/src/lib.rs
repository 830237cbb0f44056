//! # rsastats-core
//!
//! Data structures and preprocessing for representational similarity
//! analysis (RSA) inference.
//!
//! ## Quick Start
//!
//! ```
//! use ndarray::array;
//! use rsastats_core::{PoolMethod, Rdms, pool_rdm};
//!
//! // Two subjects, three conditions (three pairwise dissimilarities each)
//! let rdms = Rdms::new(array![[0.2, 0.4, 0.6], [0.3, f64::NAN, 0.5]]).unwrap();
//!
//! let pooled = pool_rdm(&rdms, PoolMethod::Euclid);
//! assert_eq!(pooled.n_rdm(), 1);
//! assert!((pooled.vectors()[[0, 1]] - 0.4).abs() < 1e-12);
//! ```
//!
//! ## Architecture
//!
//! RDMs → Pool (consensus RDM) → Models evaluated on bootstrap samples →
//! Evaluation tensor → tests in `rsastats-tests`
//!
//! Missing dissimilarities and evaluations are NaN at the boundary. Inside
//! the reductions they become an explicit validity mask, so every helper in
//! [`reduction`] states which entries it may read.

pub mod contrast;
pub mod crossval;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod pool;
pub mod rdm;
pub mod reduction;
pub mod validate;

pub use contrast::{pair_count, pairs, pairwise_contrast};
pub use crossval::{
    BOOTSTRAP_RETAINED_FRACTION, bootstrap_retained, default_k_pattern,
    default_k_pattern_bootstrap, default_k_rdm, default_k_rdm_bootstrap,
};
pub use error::{InferenceError, Result};
pub use evaluation::{Evaluations, EvaluationsRecord};
pub use model::{FitFn, Fitter, FixedModel, MOCK_FITTER, Model, fit_mock};
pub use pool::{PoolMethod, pool_rdm, pool_rdm_by_name};
pub use rdm::{Rdms, RdmsRecord, matrix_to_vector, vector_to_matrix};
pub use validate::{
    EvaluationBuffer, FitterOverride, ModelInput, ValidatedInputs, input_check_model,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
