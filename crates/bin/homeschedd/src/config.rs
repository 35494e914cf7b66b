//! Daemon configuration.
//!
//! Read from `homesched.toml` (or the file named by `HOMESCHED_CONFIG`), then
//! overridden field by field from the environment. A missing file is the
//! same as an empty one.
//!
//! ```toml
//! [database]
//! url = "sqlite:homesched.db?mode=rwc"
//!
//! [logging]
//! filter = "homeschedd=info,homesched=info"
//!
//! [scheduler]
//! tick_on_startup = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_PATH: &str = "homesched.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub scheduler: SchedulerSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    /// sqlx connection URL, e.g. `sqlite:homesched.db?mode=rwc` or `sqlite::memory:`.
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// `EnvFilter` directives.
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSection {
    /// Run a tick for the current minute as soon as the daemon starts instead
    /// of waiting for the next boundary.
    pub tick_on_startup: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite:homesched.db?mode=rwc".into(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "homeschedd=info,homesched=info".into(),
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            tick_on_startup: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to parse {}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("environment variable {name} has invalid value {value:?}")]
    Env { name: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

impl Config {
    /// Load the file, apply the process environment and validate.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed, when an
    /// override holds an unusable value, or when the result is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("HOMESCHED_CONFIG")
            .map_or_else(|| PathBuf::from(DEFAULT_PATH), PathBuf::from);
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `RUST_LOG` wins over `HOMESCHED_LOG` when both are set.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(url) = lookup("HOMESCHED_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(filter) = lookup("RUST_LOG").or_else(|| lookup("HOMESCHED_LOG")) {
            self.logging.filter = filter;
        }
        if let Some(value) = lookup("HOMESCHED_TICK_ON_STARTUP") {
            self.scheduler.tick_on_startup = parse_flag(&value).ok_or(ConfigError::Env {
                name: "HOMESCHED_TICK_ON_STARTUP",
                value,
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url is empty"));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter is empty"));
        }
        Ok(())
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
