//! Invocation configuration.
//!
//! # Responsibility
//! - Collect storage root, backend, editor and logging settings into one
//!   explicit value handed to the entry point.
//! - Apply environment fallbacks and documented defaults.
//!
//! # Invariants
//! - Nothing here is process-global; callers own the `JotConfig` they build.
//! - Explicit overrides always win over environment values.

use crate::editor::DEFAULT_EDITOR;
use crate::logging::default_log_level;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable overriding the storage root.
pub const HOME_ENV: &str = "JOTHOME";
/// Environment variable selecting the storage backend.
pub const BACKEND_ENV: &str = "JOT_BACKEND";
/// Environment variable naming the editor command line.
pub const EDITOR_ENV: &str = "JOT_EDITOR";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "JOT_LOG";

const DEFAULT_HOME_DIR: &str = ".jot";
const LOG_DIR: &str = "logs";

/// Persistence strategy selected at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// Single SQLite database file.
    #[default]
    Sqlite,
    /// Hashed directory tree of JSON documents.
    Fs,
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Fs => write!(f, "fs"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "db" => Ok(Self::Sqlite),
            "fs" | "files" | "filesystem" => Ok(Self::Fs),
            other => Err(format!(
                "unsupported storage backend `{other}`; expected sqlite|fs"
            )),
        }
    }
}

/// Explicit overrides, typically parsed from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub home: Option<PathBuf>,
    pub backend: Option<StorageBackend>,
    pub editor: Option<String>,
    pub log_level: Option<String>,
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JotConfig {
    /// Storage root holding the database or document tree.
    pub home: PathBuf,
    pub backend: StorageBackend,
    /// Editor command line, split on whitespace when run.
    pub editor: String,
    pub log_level: String,
}

impl JotConfig {
    /// Builds a configuration rooted at `home` with defaults elsewhere.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            backend: StorageBackend::default(),
            editor: DEFAULT_EDITOR.to_string(),
            log_level: default_log_level().to_string(),
        }
    }

    /// Resolves overrides against the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, String> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves overrides against an arbitrary variable lookup.
    ///
    /// Precedence per setting: override, then environment, then default.
    pub fn resolve_with<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let home = match overrides.home.or_else(|| env(HOME_ENV).map(PathBuf::from)) {
            Some(home) => home,
            None => dirs::home_dir()
                .ok_or("could not determine home directory; set JOTHOME")?
                .join(DEFAULT_HOME_DIR),
        };

        let backend = match overrides.backend {
            Some(backend) => backend,
            None => env(BACKEND_ENV)
                .map(|value| value.parse::<StorageBackend>())
                .transpose()?
                .unwrap_or_default(),
        };

        let editor = overrides
            .editor
            .or_else(|| env(EDITOR_ENV))
            .or_else(|| env("VISUAL"))
            .or_else(|| env("EDITOR"))
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());

        let log_level = overrides
            .log_level
            .or_else(|| env(LOG_LEVEL_ENV))
            .unwrap_or_else(|| default_log_level().to_string());

        Ok(Self {
            home,
            backend,
            editor,
            log_level,
        })
    }

    /// Directory receiving rotated log files.
    pub fn log_dir(&self) -> PathBuf {
        self.home.join(LOG_DIR)
    }
}
