//! Startup: load both artifacts once, or fail before any form is shown.

use std::sync::Arc;

use crate::adapters::artifacts::{self, ArtifactError, ArtifactKind};
use crate::adapters::sklearn::{
    ClassifierArtifact, ColumnTransformerArtifact, FittedClassifier, FittedColumnTransformer,
};
use crate::config::ArtifactConfig;
use crate::ports::{Classifier, Preprocessor};

use super::assessment::{DefaultAssessmentService, RiskAssessmentService};

/// The two collaborators, loaded and cross-checked.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub preprocessor: FittedColumnTransformer,
    pub classifier: FittedClassifier,
}

impl LoadedArtifacts {
    /// Wrap the artifacts in a shareable assessment service.
    #[must_use]
    pub fn into_service(self) -> DefaultAssessmentService {
        RiskAssessmentService::new(Arc::new(self.preprocessor), Arc::new(self.classifier))
    }
}

/// Load and validate both artifacts.
///
/// Existence of both files is checked (preprocessor first) before anything
/// is deserialized.
///
/// # Errors
/// Returns `ArtifactError` if either artifact is missing, unreadable, fails
/// its manifest digest, does not deserialize, fails structural validation, or
/// if the preprocessor output width differs from the classifier input width.
pub fn load_artifacts(config: &ArtifactConfig) -> Result<LoadedArtifacts, ArtifactError> {
    let preprocessor_path = config.preprocessor_path();
    let model_path = config.model_path();

    artifacts::ensure_present(ArtifactKind::Preprocessor, &preprocessor_path)?;
    artifacts::ensure_present(ArtifactKind::Model, &model_path)?;

    let manifest = artifacts::load_manifest(&config.model_dir, config.require_manifest)?;

    let raw: ColumnTransformerArtifact =
        artifacts::read_artifact(ArtifactKind::Preprocessor, &preprocessor_path, manifest.as_ref())?;
    let preprocessor =
        FittedColumnTransformer::from_artifact(raw).map_err(|reason| ArtifactError::Corrupt {
            kind: ArtifactKind::Preprocessor,
            path: preprocessor_path.clone(),
            reason,
        })?;

    let raw: ClassifierArtifact =
        artifacts::read_artifact(ArtifactKind::Model, &model_path, manifest.as_ref())?;
    let classifier = FittedClassifier::from_artifact(raw).map_err(|reason| ArtifactError::Corrupt {
        kind: ArtifactKind::Model,
        path: model_path.clone(),
        reason,
    })?;

    if preprocessor.output_width() != classifier.n_features_in() {
        return Err(ArtifactError::Incompatible(format!(
            "preprocessor produces {} values but the model expects {}",
            preprocessor.output_width(),
            classifier.n_features_in()
        )));
    }

    tracing::info!(
        "Artifacts ready (estimator={}, n_features_in={})",
        classifier.kind(),
        classifier.n_features_in()
    );

    Ok(LoadedArtifacts {
        preprocessor,
        classifier,
    })
}

/// Load the artifacts and build the assessment service.
///
/// # Errors
/// Returns `CardioRiskError::Artifact` on any startup failure.
pub fn start(config: &ArtifactConfig) -> crate::Result<DefaultAssessmentService> {
    tracing::info!("Loading model artifacts from {:?}", config.model_dir);
    let service = load_artifacts(config)?.into_service();
    Ok(service)
}
