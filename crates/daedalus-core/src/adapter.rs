//! The transport boundary.
//!
//! A [`RequestAdapter`] exposes one inbound request to the binder. Any HTTP
//! framework can implement it; `daedalus-http` ships a reference
//! implementation.

use crate::descriptor::ContextValue;
use bytes::Bytes;
use http::StatusCode;
use std::borrow::Cow;

/// Read access to one inbound request, plus a way to build the transport's
/// error value.
///
/// Lookups return `None` when the key is absent. The binder treats `None`
/// and an empty string identically, so adapters may return either.
pub trait RequestAdapter {
    /// The transport's error type.
    type Error;

    /// Builds a transport error carrying an HTTP status and a message.
    fn new_error(&self, status: StatusCode, message: String) -> Self::Error;

    /// Returns the complete request payload.
    fn body(&self) -> Bytes;

    /// Returns a named path parameter.
    fn path_param(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Returns a request header. Lookup is case-insensitive.
    fn header_param(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Returns a query parameter.
    fn query_param(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Returns a value stored in the request context.
    fn context_value(&self, key: &str) -> Option<ContextValue>;

    /// Stores a value in the request context.
    fn set_context_value(&mut self, key: &str, value: ContextValue);
}
