//! Derive macro for Daedalus argument records.
//!
//! `#[derive(Bind)]` implements `daedalus_core::BindRecord` for a struct with
//! named fields, describing where each field's value comes from.
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_macros::Bind;
//!
//! #[derive(Bind, Default)]
//! struct GetProduct {
//!     #[bind(path = "id")]
//!     id: u64,
//!     #[bind(header = "brand,optional")]
//!     brand: String,
//!     #[bind(query = "page", default = "1")]
//!     page: u32,
//!     #[bind(context = "user")]
//!     user: User,
//! }
//! ```
//!
//! # Attributes
//!
//! | Attribute | Applies to | Meaning |
//! |-----------|------------|---------|
//! | `path = "key"` | scalar fields | Named path parameter, always required |
//! | `header = "key[,optional]"` | scalar fields | Request header, required unless `optional` |
//! | `query = "key[,required]"` | scalar fields | Query parameter, optional unless `required` |
//! | `context = "key[,optional]"` | `Clone` fields | Request context value, required unless `optional` |
//! | `content_type = "mime"` | `body` | `application/json` or `application/octet-stream` |
//! | `default = "literal"` | header/query fields | Used when the value is absent or empty |
//!
//! The field named `body` receives the request payload. Scalar fields must
//! be integers, `String`, or `Option` of either. A context field typed
//! `Option<T>` accepts a stored `T` or `Option<T>`.
//!
//! Type parameters of a generic record must be `Default + Send + 'static`;
//! the derive adds those bounds to the generated impl.
//!
//! The generated code refers to `::daedalus_core`, so crates deriving `Bind`
//! depend on `daedalus-core` directly.

mod derive;
mod parse;

use proc_macro::TokenStream;

/// Derives `daedalus_core::BindRecord`.
///
/// See the [crate documentation](crate) for the attribute grammar.
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(item: TokenStream) -> TokenStream {
    derive::expand_bind(item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
