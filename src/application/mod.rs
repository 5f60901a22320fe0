//! Application layer: Use cases and services.
//!
//! Orchestrates the domain types with the inference ports: startup loading of
//! the artifacts and the per-submission risk assessment.

mod assessment;
pub mod bootstrap;

pub use assessment::{DefaultAssessmentService, RiskAssessmentService};
pub use bootstrap::{load_artifacts, LoadedArtifacts};

#[cfg(test)]
pub(crate) use assessment::mocks;
