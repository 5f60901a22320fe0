//! # CardioRisk
//!
//! Heart disease risk assessment form for the terminal.
//!
//! This crate provides:
//! - A thirteen-field patient record in the column order of the fitted artifacts
//! - Loading and verification of the exported preprocessing and classifier artifacts
//! - A risk assessment service returning a label and a probability
//! - Terminal UI with the input form and the result panel
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (PatientRecord, Assessment, RiskLabel)
//! - `ports`: Trait definitions for the preprocessing and classifier collaborators
//! - `adapters`: Artifact loading and the scikit-learn export evaluators
//! - `application`: Startup and assessment use cases
//! - `config`: Environment configuration
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Assessment, PatientRecord, RiskLabel};

/// Result type for CardioRisk operations
pub type Result<T> = std::result::Result<T, CardioRiskError>;

/// Main error type for CardioRisk
#[derive(Debug, thiserror::Error)]
pub enum CardioRiskError {
    #[error(transparent)]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}
