//! Evaluators for artifacts exported from a scikit-learn training pipeline.
//!
//! The training side writes the fitted parameters as JSON; nothing here fits
//! or updates a model.

mod classifier;
mod preprocessor;

pub use classifier::{ClassifierArtifact, EstimatorArtifact, FittedClassifier, NodeArtifact, TreeArtifact};
pub use preprocessor::{
    ColumnSpec, ColumnTransform, ColumnTransformerArtifact, FittedColumnTransformer, HandleUnknown,
};

/// Artifact `format_version` this build understands.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;
