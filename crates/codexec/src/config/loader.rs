//! Configuration file loading for codexec
//!
//! Handles loading and parsing configuration files using the config crate.

use std::path::Path;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};

use crate::config::{Config, ConfigError, ENV_PREFIX};

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        Self::finish(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        Self::finish(config)
    }

    /// Load configuration from an optional file, then apply `CODEXEC_*`
    /// environment overrides (e.g. `CODEXEC_TEMP_DIR`,
    /// `CODEXEC_DEFAULT_LIMITS__TIMEOUT`)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder.add_source(env).build()?;

        Self::finish(config)
    }

    fn finish(config: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        for (language, toolchain) in self.languages.iter() {
            let id = language.id();
            if toolchain.extension.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' has empty extension"
                )));
            }
            if toolchain.run.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' has empty run command"
                )));
            }
            match (&toolchain.compile, language.requires_compilation()) {
                (Some(compile), true) if compile.is_empty() => {
                    return Err(ConfigError::Invalid(format!(
                        "language '{id}' has empty compile command"
                    )));
                }
                (None, true) => {
                    return Err(ConfigError::Invalid(format!(
                        "language '{id}' requires a compile command"
                    )));
                }
                (Some(_), false) => {
                    return Err(ConfigError::Invalid(format!(
                        "language '{id}' is interpreted and cannot have a compile command"
                    )));
                }
                _ => {}
            }
        }

        self.default_limits
            .validate()
            .map_err(|message| ConfigError::Invalid(format!("default_limits: {message}")))?;

        if self.max_concurrent == Some(0) {
            return Err(ConfigError::Invalid(
                "max_concurrent must be greater than zero".to_owned(),
            ));
        }

        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
