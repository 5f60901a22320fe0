//! Domain layer: Core business types.
//!
//! Pure Rust types with no external dependencies.

mod assessment;
mod patient;

pub use assessment::{format_percent, Assessment, RiskLabel, DISCLAIMER};
pub use patient::{FieldKind, FieldSpec, PatientRecord, FEATURE_NAMES, FIELD_SPECS};

#[cfg(test)]
pub(crate) use patient::strategies;
