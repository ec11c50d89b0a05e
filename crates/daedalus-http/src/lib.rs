//! # Daedalus HTTP
//!
//! Reference [`RequestAdapter`](daedalus_core::RequestAdapter) for Daedalus,
//! built on the `http` crate types.
//!
//! | Type | Role |
//! |------|------|
//! | [`HttpContext`] | One buffered request plus its path parameters and context values |
//! | [`HttpContextBuilder`] | Convenient construction, mostly for tests |
//! | [`Params`] | Ordered name/value pairs for path and query parameters |
//! | [`ContextValues`] | Values stored by trusted server-side code |
//! | [`HttpError`] | Status and message produced when binding fails |
//!
//! ## Lookup rules
//!
//! - Headers are matched case-insensitively. A header whose value is not
//!   valid UTF-8 counts as absent.
//! - The query string is percent-decoded once. When a name repeats, the
//!   first value wins.
//!
//! ## Example
//!
//! ```rust,ignore
//! use daedalus_core::Adapted;
//! use daedalus_http::{HttpContext, HttpError};
//!
//! fn get_product(ctx: HttpContext, args: GetProduct) -> Result<(), HttpError> {
//!     Ok(())
//! }
//!
//! let handler = Adapted::new(get_product)?;
//! handler.call(HttpContext::builder().path_param("id", "42").build())?;
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus-http/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod params;
mod values;

pub use context::{HttpContext, HttpContextBuilder};
pub use error::HttpError;
pub use params::Params;
pub use values::ContextValues;
