//! # Daedalus Core
//!
//! Schema compilation and request binding for Daedalus handlers.
//!
//! A handler declares its inputs as one flat record. Each field is tagged
//! with the request source it comes from (path, header, query, context) or
//! is the `body` field. Binding happens in two phases:
//!
//! 1. **Compile** (once per handler): the record's [`RecordDescriptor`] is
//!    turned into an immutable [`HandlerSchema`]. Malformed handlers and
//!    records are rejected here with a [`SchemaError`].
//! 2. **Bind** (once per request): the [`binder`] runs the schema against a
//!    [`RequestAdapter`] and yields a populated record or a
//!    [`BindingError`].
//!
//! ## Components
//!
//! - [`coerce`] - Text to scalar conversion at exact integer widths
//! - [`HandlerSchema`] - Compiled binding plan
//! - [`RequestBinder`] - Shared schema plus options
//! - [`BindingError`] / [`ErrorCode`] - Failure classification
//! - [`Adapted`] - A handler wrapped for a transport context
//!
//! Records normally implement [`BindRecord`] through `#[derive(Bind)]` from
//! `daedalus-macros`; the generated code refers to this crate by name.

#![doc(html_root_url = "https://docs.rs/daedalus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod adapter;
pub mod binder;
mod coerce;
pub mod descriptor;
mod error;
#[cfg(test)]
mod fixtures;
mod handler;
mod schema;

pub use adapter::RequestAdapter;
pub use binder::{bind, bind_with_options, BindOptions, RequestBinder};
pub use bytes::Bytes;
pub use coerce::{coerce, CoercionError};
pub use descriptor::{
    BindRecord, ContextValue, FieldDescriptor, RawBody, RecordDescriptor, ScalarField, ScalarKind,
    ScalarValue, Tag,
};
pub use error::{error_code, BindingError, BindingErrorKind, ErrorCode, SchemaError, Source};
pub use handler::{compile, validate_signature, Adapted, HandlerFn, Signature, TypeDescriptor};
pub use schema::{
    compile_record, BodyBinding, ContentKind, FieldBinding, HandlerSchema, BODY_FIELD,
};
