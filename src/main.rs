//! CardioRisk: heart disease risk assessment form
//!
//! Main entry point for the terminal application.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiorisk::application::bootstrap;
use cardiorisk::config::AppConfig;
use cardiorisk::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging.
    //
    // Writing logs to the terminal would corrupt the TUI (alternate screen), so
    // an interactive session logs to a file unless told otherwise.
    let interactive = std::io::stdout().is_terminal();

    let (writer, _guard) = if config.log.mode.use_file(interactive) {
        tracing_appender::non_blocking(open_log_file(&config.log.file)?)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    tracing::info!("Starting CardioRisk...");

    let mut app = App::from_startup(bootstrap::start(&config.artifacts));
    app.run()?;

    if let Some(error) = app.startup_error() {
        bail!("{error}");
    }

    tracing::info!("CardioRisk shutdown complete.");
    Ok(())
}

/// Open the log file for appending, creating its directory first.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}
