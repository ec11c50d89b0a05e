//! # Daedalus
//!
//! **Declarative request binding for handler functions**
//!
//! A handler takes a transport context and one flat record whose fields
//! are tagged with where their values come from. Daedalus compiles those
//! tags once, at registration, and fills a fresh record for every request:
//!
//! - **Five sources**: body, path, header, query, and server-side context values
//! - **Integer coercion** exact to the declared width
//! - **Presence rules** with per-field `optional`/`required` and defaults
//! - **Typed failures** mapped to `400`, `413` or `500`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use daedalus::prelude::*;
//!
//! #[derive(Default, Bind)]
//! struct GetProduct {
//!     #[bind(path = "id")]
//!     id: u64,
//!     #[bind(header = "brand,optional")]
//!     brand: String,
//!     #[bind(query = "q,required")]
//!     q: String,
//! }
//!
//! fn get_product(ctx: HttpContext, args: GetProduct) -> Result<(), HttpError> {
//!     Ok(())
//! }
//!
//! let handler = Adapted::new(get_product)?;
//! handler.call(ctx)?;
//! ```
//!
//! The derive expands to paths under `daedalus_core`, so crates deriving
//! `Bind` also depend on `daedalus-core` directly.
//!
//! ## Binding order
//!
//! ```text
//! body → path → header → query → context → handler
//! ```
//!
//! The first failing field stops binding; the handler is not invoked.

#![doc(html_root_url = "https://docs.rs/daedalus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the binding engine
pub use daedalus_core as core;

// Re-export the derive macro
pub use daedalus_macros::Bind;

// Re-export the reference HTTP adapter
pub use daedalus_http as http;

// Re-export configuration types
pub use daedalus_config as config;

// Re-export logging setup
pub use daedalus_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use daedalus::prelude::*;
/// ```
pub mod prelude {
    pub use daedalus_core::{
        compile, compile_record, error_code, Adapted, BindOptions, BindRecord, BindingError,
        BindingErrorKind, ErrorCode, HandlerSchema, RequestAdapter, RequestBinder, SchemaError,
        Source, TypeDescriptor,
    };

    // Re-export derive macro
    pub use daedalus_macros::Bind;

    // Re-export the HTTP adapter
    pub use daedalus_http::{ContextValues, HttpContext, HttpError, Params};

    // Re-export configuration
    pub use daedalus_config::{ConfigLoader, DaedalusConfig};

    // Re-export logging setup
    pub use daedalus_telemetry::{init_logging, LogConfig};
}
