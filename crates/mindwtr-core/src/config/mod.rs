use std::path::Path;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::types::RecurrenceStrategy;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub scheduling: SchedulingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    /// IANA zone used to read date-only and floating task dates.
    pub timezone: String,
    /// Strategy applied when a command does not name one.
    pub strategy: RecurrenceStrategy,
}

impl SchedulingConfig {
    /// ## Summary
    /// Resolves the configured IANA timezone name.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidTimezone` if the name is not in the tz database.
    pub fn zone(&self) -> CoreResult<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_err| CoreError::InvalidTimezone(self.timezone.clone()))
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, an optional TOML file and `MINDWTR_*`
    /// environment variables. Environment variables take precedence over file values.
    ///
    /// When `file` is `None`, `config.toml` in the working directory is read if present.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails,
    /// or if an explicitly named file does not exist.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config.toml").required(false),
        };

        let settings = Self::builder()?
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("MINDWTR")
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.scheduling.zone()?;
        Ok(settings)
    }

    /// ## Summary
    /// Loads configuration with the default file lookup.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", "info")?
            .set_default("scheduling.timezone", "UTC")?
            .set_default("scheduling.strategy", "strict")?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config(file: Option<&Path>) -> Result<Settings> {
    dotenvy::dotenv().ok();

    tracing::debug!(file = ?file, "Loading configuration");
    Settings::load_from(file)
}

#[cfg(test)]
mod tests;
