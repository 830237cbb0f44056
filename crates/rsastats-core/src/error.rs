//! Error taxonomy shared by every rsastats crate.

use thiserror::Error;

/// Errors raised by validation, pooling and the significance tests.
///
/// None of these are retried: every input is an in-memory array, so the
/// same call fails the same way again.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
    /// Malformed or inconsistent model, parameter or fitter arguments.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown pooling or comparison method name.
    #[error("Unsupported method: '{0}'")]
    UnsupportedMetric(String),

    /// A parametric test was called without a variance estimate.
    #[error("No variance estimates provided for {test}")]
    MissingVariance {
        /// Name of the test that needed the estimate.
        test: &'static str,
    },

    /// An array does not have the shape the operation requires.
    #[error("Dimension mismatch for {what}: expected {expected}, actual {actual}")]
    DimensionMismatch {
        /// What was being checked (e.g. "variance vector").
        what: &'static str,
        /// Expected size or shape.
        expected: String,
        /// Size or shape actually supplied.
        actual: String,
    },

    /// The Student-t distribution rejected its parameters.
    #[error("Invalid distribution parameters: {0}")]
    InvalidDistribution(String),
}

impl InferenceError {
    /// Create a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an UnsupportedMetric error.
    pub fn unsupported(method: impl Into<String>) -> Self {
        Self::UnsupportedMetric(method.into())
    }

    /// Create a MissingVariance error.
    pub fn missing_variance(test: &'static str) -> Self {
        Self::MissingVariance { test }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(
        what: &'static str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::DimensionMismatch {
            what,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, InferenceError>;
