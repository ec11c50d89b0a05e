//! The reference request adapter.
//!
//! [`HttpContext`] holds one request in terms of the `http` crate types plus
//! the path parameters captured by a router and a [`ContextValues`] map. It
//! implements [`RequestAdapter`], so any bindable handler taking an
//! `HttpContext` can be wrapped with `daedalus_core::Adapted`.

use crate::error::HttpError;
use crate::params::Params;
use crate::values::ContextValues;
use bytes::Bytes;
use daedalus_core::{ContextValue, RequestAdapter};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, Uri};
use std::borrow::Cow;
use tracing::warn;

/// One inbound HTTP request.
///
/// # Example
///
/// ```rust
/// use daedalus_core::RequestAdapter;
/// use daedalus_http::HttpContext;
/// use http::Method;
///
/// let ctx = HttpContext::builder()
///     .method(Method::GET)
///     .uri("/products/42?q=lamp")
///     .path_param("id", "42")
///     .header("x-brand", "acme")
///     .build();
///
/// assert_eq!(ctx.path_param("id").as_deref(), Some("42"));
/// assert_eq!(ctx.query_param("q").as_deref(), Some("lamp"));
/// assert_eq!(ctx.header_param("X-Brand").as_deref(), Some("acme"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
    query_params: Params,
    values: ContextValues,
}

impl HttpContext {
    /// Creates a context. The query string is decoded once, here.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes, path_params: Params) -> Self {
        let query_params = decode_query(&uri);
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
            query_params,
            values: ContextValues::new(),
        }
    }

    /// Creates a context from a buffered request.
    #[must_use]
    pub fn from_request(request: Request<Bytes>, path_params: Params) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body, path_params)
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> HttpContextBuilder {
        HttpContextBuilder::new()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the captured path parameters.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Returns the decoded query parameters.
    #[must_use]
    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    /// Returns the context values.
    #[must_use]
    pub fn values(&self) -> &ContextValues {
        &self.values
    }

    /// Returns the context values for modification.
    pub fn values_mut(&mut self) -> &mut ContextValues {
        &mut self.values
    }

    /// Returns the request body.
    #[must_use]
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }
}

fn decode_query(uri: &Uri) -> Params {
    let Some(query) = uri.query() else {
        return Params::new();
    };

    match Params::from_query(query) {
        Ok(params) => params,
        Err(err) => {
            warn!(query, error = %err, "ignoring undecodable query string");
            Params::new()
        }
    }
}

impl RequestAdapter for HttpContext {
    type Error = HttpError;

    fn new_error(&self, status: StatusCode, message: String) -> HttpError {
        HttpError::new(status, message)
    }

    fn body(&self) -> Bytes {
        self.body.clone()
    }

    fn path_param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.path_params.get(key).map(Cow::Borrowed)
    }

    fn header_param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.headers
            .get(key)
            .and_then(|value| value.to_str().ok())
            .map(Cow::Borrowed)
    }

    fn query_param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.query_params.get(key).map(Cow::Borrowed)
    }

    fn context_value(&self, key: &str) -> Option<ContextValue> {
        self.values.get_shared(key)
    }

    fn set_context_value(&mut self, key: &str, value: ContextValue) {
        self.values.insert_shared(key, value);
    }
}

/// Builder for [`HttpContext`].
#[derive(Debug, Default)]
pub struct HttpContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
    values: ContextValues,
}

impl HttpContextBuilder {
    /// Creates a builder for `GET /`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI. An unparseable URI is ignored.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        match uri.parse() {
            Ok(uri) => self.uri = Some(uri),
            Err(err) => warn!(uri, error = %err, "ignoring invalid uri"),
        }
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => warn!(name, "ignoring invalid header"),
        }
        self
    }

    /// Replaces all headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn path_param(mut self, name: &str, value: &str) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Stores a context value.
    #[must_use]
    pub fn value<T: Send + Sync + 'static>(mut self, key: &str, value: T) -> Self {
        self.values.insert(key, value);
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> HttpContext {
        let mut ctx = HttpContext::new(
            self.method.unwrap_or(Method::GET),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.body,
            self.path_params,
        );
        ctx.values = self.values;
        ctx
    }
}
