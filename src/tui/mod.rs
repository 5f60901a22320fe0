//! TUI module: Terminal User Interface using Ratatui.
//!
//! A single screen with:
//! - The thirteen-field patient form
//! - The result panel (one of two templates, or a non-fatal error)
//! - A blocking error view when the artifacts could not be loaded

mod app;
mod styles;
mod ui;

pub use app::App;
