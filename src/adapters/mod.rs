//! Adapters layer: Concrete implementations of ports.
//!
//! - `artifacts`: locating, verifying and deserializing model artifacts
//! - `sklearn`: evaluators for the exported preprocessing transform and classifier

pub mod artifacts;
pub mod sklearn;

pub use artifacts::{ArtifactError, ArtifactKind};
