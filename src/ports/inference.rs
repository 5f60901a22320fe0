//! Inference ports: Traits for the fitted preprocessing and classifier artifacts.
//!
//! The application only sees these contracts; the concrete artifact formats live
//! in `adapters::sklearn`.

use crate::domain::PatientRecord;

/// Failure raised while transforming a record or running the classifier.
///
/// Always recoverable: the form stays usable and the user may resubmit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("Feature '{feature}' is not a finite number")]
    NonFinite { feature: String },

    #[error("Feature '{feature}' has value {value}, which the preprocessor was not fitted on")]
    UnknownCategory { feature: String, value: f64 },

    #[error("Feature count mismatch: got {got}, expected {expected}")]
    FeatureCount { got: usize, expected: usize },

    #[error("Classifier returned unsupported label {0}")]
    UnsupportedLabel(i64),

    #[error("Classifier returned invalid probability {0}")]
    InvalidProbability(f64),

    #[error("{0}")]
    Failed(String),
}

impl InferenceError {
    /// Short, value-free name of the failure for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NonFinite { .. } => "non_finite",
            Self::UnknownCategory { .. } => "unknown_category",
            Self::FeatureCount { .. } => "feature_count",
            Self::UnsupportedLabel(_) => "unsupported_label",
            Self::InvalidProbability(_) => "invalid_probability",
            Self::Failed(_) => "failed",
        }
    }
}

/// A fitted, deterministic transform from a patient record to the numeric row
/// the classifier was trained on.
pub trait Preprocessor: Send + Sync {
    /// Number of values `transform` produces.
    fn output_width(&self) -> usize;

    /// Transform a record into the classifier's input representation.
    ///
    /// # Errors
    /// Returns `InferenceError` if the record cannot be represented, e.g. a
    /// categorical value the transform was not fitted on.
    fn transform(&self, record: &PatientRecord) -> Result<Vec<f64>, InferenceError>;
}

/// A fitted binary classifier over transformed rows.
pub trait Classifier: Send + Sync {
    /// Number of input values the classifier expects.
    fn n_features_in(&self) -> usize;

    /// Predict the hard class label for one row.
    ///
    /// # Errors
    /// Returns `InferenceError::FeatureCount` if the row has the wrong width.
    fn predict(&self, row: &[f64]) -> Result<i64, InferenceError>;

    /// Estimate `[p(class 0), p(class 1)]` for one row.
    ///
    /// # Errors
    /// Returns `InferenceError::FeatureCount` if the row has the wrong width.
    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], InferenceError>;
}
