//! Configuration
//!
//! Layered, lowest priority first:
//! 1. Built-in defaults
//! 2. `rhythm-proc.toml` in the working directory, or the file given with
//!    `--config` / `RHYTHM_PROC_CONFIG_PATH` (required when given)
//! 3. `RHYTHM_PROC_*` environment variables
//!
//! A `.env` file is loaded into the environment first.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "rhythm-proc.toml";
pub const ENV_PREFIX: &str = "RHYTHM_PROC";
pub const CONFIG_PATH_ENV: &str = "RHYTHM_PROC_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// `tracing-subscriber` filter directives
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Cancel `run` procs after this many milliseconds
    #[serde(default)]
    pub cancel_after_ms: Option<u64>,

    /// Enable the engine's per-step debug logs
    #[serde(default)]
    pub trace_steps: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            cancel_after_ms: None,
            trace_steps: false,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load with the default search path
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    /// Filter directives to install, including step tracing when enabled
    pub fn effective_log_filter(&self) -> String {
        if self.trace_steps {
            format!("{},rhythm_proc::proc=debug", self.log_filter)
        } else {
            self.log_filter.clone()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    cancel_after_ms: Option<u64>,
    skip_env: bool,
}

impl ConfigBuilder {
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Override applied after every other source
    pub fn cancel_after_ms(mut self, ms: Option<u64>) -> Self {
        self.cancel_after_ms = ms;
        self
    }

    /// Ignore `.env` and `RHYTHM_PROC_*` variables
    pub fn skip_env(mut self, skip: bool) -> Self {
        self.skip_env = skip;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        if !self.skip_env {
            let _ = dotenvy::dotenv();
        }

        let explicit = self.config_path.or_else(|| {
            if self.skip_env {
                None
            } else {
                std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from)
            }
        });

        let mut builder = ::config::Config::builder()
            .set_default("log_filter", default_log_filter())?
            .set_default("trace_steps", false)?;

        builder = match &explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingFile(path.clone()));
                }
                builder.add_source(
                    ::config::File::from(path.as_path())
                        .format(::config::FileFormat::Toml)
                        .required(true),
                )
            }
            None => builder.add_source(
                ::config::File::from(Path::new(DEFAULT_CONFIG_FILE))
                    .format(::config::FileFormat::Toml)
                    .required(false),
            ),
        };

        if !self.skip_env {
            builder = builder.add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .ignore_empty(true),
            );
        }

        if let Some(ms) = self.cancel_after_ms {
            builder = builder.set_override("cancel_after_ms", ms)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::builder()
            .config_path(Some(dir.path().join("absent.toml")))
            .skip_env(true)
            .build();

        assert!(matches!(config, Err(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_file_values_are_loaded() {
        let file = write_config(
            r#"
log_filter = "debug"
cancel_after_ms = 250
trace_steps = true
"#,
        );

        let config = Config::builder()
            .config_path(Some(file.path().to_path_buf()))
            .skip_env(true)
            .build()
            .unwrap();

        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.cancel_after_ms, Some(250));
        assert_eq!(
            config.effective_log_filter(),
            "debug,rhythm_proc::proc=debug"
        );
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let file = write_config("trace_steps = false\n");

        let config = Config::builder()
            .config_path(Some(file.path().to_path_buf()))
            .skip_env(true)
            .build()
            .unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.effective_log_filter(), "info");
    }

    #[test]
    fn test_cancel_override_beats_file() {
        let file = write_config("cancel_after_ms = 10\n");

        let config = Config::builder()
            .config_path(Some(file.path().to_path_buf()))
            .cancel_after_ms(Some(99))
            .skip_env(true)
            .build()
            .unwrap();

        assert_eq!(config.cancel_after_ms, Some(99));
    }

    #[test]
    fn test_empty_log_filter_is_invalid() {
        let file = write_config("log_filter = \"  \"\n");

        let config = Config::builder()
            .config_path(Some(file.path().to_path_buf()))
            .skip_env(true)
            .build();

        assert!(matches!(config, Err(ConfigError::Invalid(_))));
    }
}
