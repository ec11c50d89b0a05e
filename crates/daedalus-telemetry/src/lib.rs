//! Logging setup for Daedalus.
//!
//! The binding engine emits `tracing` events: `debug!` when a schema is
//! compiled, `warn!` for ignored tag modifiers, and `trace!`/`debug!` for
//! each bind outcome. This crate installs the subscriber that renders them.
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().with_service_name("catalog"))?;
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
