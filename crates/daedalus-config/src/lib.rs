//! Typed configuration for Daedalus.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`PREFIX__SECTION__KEY`)
//! - Strict parsing that rejects unknown fields
//! - Layered loading: defaults, then file, then env, then validation
//!
//! # Configuration File Format
//!
//! ```toml
//! [binding]
//! max_body_bytes = 1048576
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! include_location = false
//! service_name = "catalog"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use daedalus_config::ConfigLoader;
//! use daedalus_core::BindOptions;
//! use daedalus_telemetry::LogConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("daedalus.toml")?
//!     .with_env_prefix("DAEDALUS")
//!     .load()?;
//!
//! daedalus_telemetry::init_logging(&LogConfig::from(&config.logging))?;
//! let options = BindOptions::from(&config.binding);
//! # let _ = options;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{DaedalusConfig, DaedalusConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{BindingConfig, LogFormat, LoggingConfig};
