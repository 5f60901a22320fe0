//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundary between
//! the application and the fitted model artifacts.

mod inference;

pub use inference::{Classifier, InferenceError, Preprocessor};
