use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::config::language::{FileExtension, Language, Languages, Toolchain};
use crate::types::Limits;

pub mod language;
mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../codexec.example.toml");

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "CODEXEC";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid characters in file extension")]
    InvalidFileExtChars,

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for codexec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for temporary sources and binaries (OS temp dir if unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Upper bound on executions in flight at once (unbounded if unset)
    #[serde(default)]
    pub max_concurrent: Option<usize>,

    /// Limits applied to every execution unless the request overrides them
    #[serde(default)]
    pub default_limits: Limits,

    /// Toolchains keyed by language ID
    #[serde(default)]
    pub languages: Languages,
}

impl Config {
    /// Create a new config with the built-in toolchains
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the toolchain for a language
    pub fn toolchain(&self, language: Language) -> &Toolchain {
        self.languages.get(language)
    }

    /// Resolve a language ID and return its toolchain
    pub fn get_language(&self, id: &str) -> Result<(Language, &Toolchain), ConfigError> {
        let language: Language = id.parse()?;
        Ok((language, self.toolchain(language)))
    }

    /// Directory in which artifacts are created
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Merge limits with defaults
    pub fn effective_limits(&self, overrides: Option<&Limits>) -> Limits {
        match overrides {
            Some(limits) => self.default_limits.with_overrides(limits),
            None => self.default_limits.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            temp_dir: None,
            max_concurrent: None,
            default_limits: Limits::default(),
            languages: Languages::default(),
        }
    }
}
