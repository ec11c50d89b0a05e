//! Main configuration types.
//!
//! This module provides the top-level [`DaedalusConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{BindingConfig, ConfigError, LogFormat, LoggingConfig};

/// Complete Daedalus configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use daedalus_config::DaedalusConfig;
///
/// let config = DaedalusConfig::default();
/// assert_eq!(config.binding.max_body_bytes, None);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DaedalusConfig {
    /// Request binding limits.
    #[serde(default)]
    pub binding: BindingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DaedalusConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::{BindingConfig, DaedalusConfig};
    ///
    /// let config = DaedalusConfig::builder()
    ///     .binding(BindingConfig {
    ///         max_body_bytes: Some(4096),
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.binding.max_body_bytes, Some(4096));
    /// ```
    #[must_use]
    pub fn builder() -> DaedalusConfigBuilder {
        DaedalusConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `binding.max_body_bytes` is zero
    /// - `logging.level` is not a valid filter directive
    /// - `logging.service_name` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.binding.max_body_bytes == Some(0) {
            return Err(ConfigError::invalid_value(
                "binding.max_body_bytes",
                "must be greater than 0",
            ));
        }

        if let Err(err) = daedalus_telemetry::create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", err.to_string()));
        }

        if self.logging.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.service_name",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug-level logs with source locations, no body ceiling.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::DaedalusConfig;
    ///
    /// let config = DaedalusConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON info-level logs and a 1 MiB body ceiling.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::{DaedalusConfig, LogFormat};
    ///
    /// let config = DaedalusConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// assert_eq!(config.binding.max_body_bytes, Some(1024 * 1024));
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.binding.max_body_bytes = Some(DEFAULT_PRODUCTION_BODY_LIMIT);
        config
    }
}

const DEFAULT_PRODUCTION_BODY_LIMIT: usize = 1024 * 1024;

/// Builder for [`DaedalusConfig`].
#[derive(Debug, Default)]
pub struct DaedalusConfigBuilder {
    binding: Option<BindingConfig>,
    logging: Option<LoggingConfig>,
}

impl DaedalusConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binding configuration.
    #[must_use]
    pub fn binding(mut self, binding: BindingConfig) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> DaedalusConfig {
        DaedalusConfig {
            binding: self.binding.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    pub fn build_validated(self) -> Result<DaedalusConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
