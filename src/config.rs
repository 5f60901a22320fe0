//! Runtime configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `CARDIORISK_MODEL_DIR` | `models` |
//! | `CARDIORISK_PREPROCESSOR_FILE` | `preprocessor.json` |
//! | `CARDIORISK_MODEL_FILE` | `final_model.json` |
//! | `CARDIORISK_REQUIRE_MANIFEST` | off |
//! | `CARDIORISK_LOG_MODE` | `auto` (`file` or `stdout`) |
//! | `CARDIORISK_LOG_FILE` | `cardiorisk.log` |

use std::path::PathBuf;

pub const DEFAULT_MODEL_DIR: &str = "models";
pub const DEFAULT_PREPROCESSOR_FILE: &str = "preprocessor.json";
pub const DEFAULT_MODEL_FILE: &str = "final_model.json";
pub const DEFAULT_LOG_FILE: &str = "cardiorisk.log";

/// Where the two artifacts live and how strictly they are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    pub model_dir: PathBuf,
    pub preprocessor_file: String,
    pub model_file: String,
    /// Refuse to start without a `manifest.json`.
    pub require_manifest: bool,
}

impl ArtifactConfig {
    /// Default file names inside `model_dir`.
    #[must_use]
    pub fn in_dir(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            preprocessor_file: DEFAULT_PREPROCESSOR_FILE.to_string(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            require_manifest: false,
        }
    }

    #[must_use]
    pub fn preprocessor_path(&self) -> PathBuf {
        self.model_dir.join(&self.preprocessor_file)
    }

    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self::in_dir(DEFAULT_MODEL_DIR)
    }
}

/// Log destination.
///
/// Writing logs to the terminal would corrupt the TUI (alternate screen), so
/// `Auto` logs to a file when stdout is interactive and to stdout otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Whether to log to a file given whether stdout is a terminal.
    #[must_use]
    pub fn use_file(&self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub mode: LogMode,
    pub file: PathBuf,
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub artifacts: ArtifactConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            artifacts: ArtifactConfig {
                model_dir: PathBuf::from(get("CARDIORISK_MODEL_DIR", DEFAULT_MODEL_DIR)),
                preprocessor_file: get("CARDIORISK_PREPROCESSOR_FILE", DEFAULT_PREPROCESSOR_FILE),
                model_file: get("CARDIORISK_MODEL_FILE", DEFAULT_MODEL_FILE),
                require_manifest: lookup("CARDIORISK_REQUIRE_MANIFEST")
                    .is_some_and(|v| parse_bool(&v)),
            },
            log: LogConfig {
                mode: LogMode::parse(&get("CARDIORISK_LOG_MODE", "auto")),
                file: PathBuf::from(get("CARDIORISK_LOG_FILE", DEFAULT_LOG_FILE)),
            },
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}
