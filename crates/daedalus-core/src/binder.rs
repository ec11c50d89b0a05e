//! Request binding.
//!
//! The binder runs a compiled [`HandlerSchema`] against one request and
//! produces a populated record. Sources are visited in a fixed order:
//! body, path, header, query, context. Within a source, fields are visited in
//! declaration order. The first failure aborts binding.

use crate::adapter::RequestAdapter;
use crate::coerce::coerce;
use crate::descriptor::{BindRecord, ScalarKind, ScalarValue};
use crate::error::{BindingError, Source};
use crate::schema::{BodyBinding, BodySetter, FieldBinding, FieldSetter, HandlerSchema};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Per-binder limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindOptions {
    /// Largest accepted body, in bytes. `None` accepts any size.
    pub max_body_bytes: Option<usize>,
}

impl BindOptions {
    /// Options with no limits.
    pub const fn new() -> Self {
        Self {
            max_body_bytes: None,
        }
    }

    /// Sets the body size ceiling.
    pub const fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = Some(max);
        self
    }
}

/// Binds `adapter` against `schema` with default options.
///
/// Returns a fresh record on success. On failure no partially populated
/// record is returned.
pub fn bind<R, A>(schema: &HandlerSchema<R>, adapter: &A) -> Result<R, BindingError>
where
    R: BindRecord,
    A: RequestAdapter + ?Sized,
{
    bind_with_options(schema, adapter, BindOptions::default())
}

/// Binds `adapter` against `schema`.
pub fn bind_with_options<R, A>(
    schema: &HandlerSchema<R>,
    adapter: &A,
    options: BindOptions,
) -> Result<R, BindingError>
where
    R: BindRecord,
    A: RequestAdapter + ?Sized,
{
    match populate(schema, adapter, options) {
        Ok(record) => {
            trace!(record = schema.record_type(), "bound request");
            Ok(record)
        }
        Err(err) => {
            debug!(
                record = schema.record_type(),
                field = err.field().unwrap_or_default(),
                source = %err.binding_source(),
                code = err.error_code(),
                error = %err,
                "request binding failed"
            );
            Err(err)
        }
    }
}

fn populate<R, A>(
    schema: &HandlerSchema<R>,
    adapter: &A,
    options: BindOptions,
) -> Result<R, BindingError>
where
    R: BindRecord,
    A: RequestAdapter + ?Sized,
{
    let mut record = R::default();

    if let Some(body) = schema.body() {
        bind_body(&mut record, body, adapter, options)?;
    }

    for (key, binding) in schema.path_params() {
        let value = non_empty(adapter.path_param(key));
        bind_scalar(&mut record, Source::Path, binding, value)?;
    }

    for (key, binding) in schema.headers() {
        let value = non_empty(adapter.header_param(key));
        bind_scalar(&mut record, Source::Header, binding, value)?;
    }

    for (key, binding) in schema.query_params() {
        let value = non_empty(adapter.query_param(key));
        bind_scalar(&mut record, Source::Query, binding, value)?;
    }

    for (key, binding) in schema.context_values() {
        bind_context(&mut record, binding, adapter.context_value(key))?;
    }

    Ok(record)
}

fn non_empty(value: Option<Cow<'_, str>>) -> Option<Cow<'_, str>> {
    value.filter(|v| !v.is_empty())
}

fn bind_body<R, A>(
    record: &mut R,
    body: &BodyBinding<R>,
    adapter: &A,
    options: BindOptions,
) -> Result<(), BindingError>
where
    A: RequestAdapter + ?Sized,
{
    let payload = adapter.body();
    if let Some(max) = options.max_body_bytes {
        if payload.len() > max {
            return Err(BindingError::payload_too_large(
                body.name(),
                max,
                payload.len(),
            ));
        }
    }

    match body.setter() {
        BodySetter::Json(set) => {
            set(record, &payload).map_err(|err| BindingError::malformed_body(body.name(), err))
        }
        BodySetter::Raw(set) => {
            set(record, payload);
            Ok(())
        }
    }
}

fn bind_scalar<R>(
    record: &mut R,
    source: Source,
    binding: &FieldBinding<R>,
    value: Option<Cow<'_, str>>,
) -> Result<(), BindingError> {
    let FieldSetter::Scalar(set) = binding.setter() else {
        return Err(setter_rejected(source, binding));
    };
    let kind = binding.kind().unwrap_or(ScalarKind::Text);

    let scalar = match (value, binding.default_value()) {
        (Some(text), _) => coerce(kind, &text)
            .map_err(|err| BindingError::invalid_value(source, binding.name(), binding.key(), err))?,
        (None, Some(default)) if source != Source::Path => default.clone(),
        (None, _) if binding.is_required() => {
            return Err(BindingError::missing(source, binding.name(), binding.key()));
        }
        (None, _) => return Ok(()),
    };

    store(record, source, binding, *set, scalar)
}

fn store<R>(
    record: &mut R,
    source: Source,
    binding: &FieldBinding<R>,
    set: fn(&mut R, ScalarValue) -> bool,
    value: ScalarValue,
) -> Result<(), BindingError> {
    if set(record, value) {
        Ok(())
    } else {
        Err(setter_rejected(source, binding))
    }
}

fn setter_rejected<R>(source: Source, binding: &FieldBinding<R>) -> BindingError {
    BindingError::type_mismatch(source, binding.name(), binding.key(), binding.type_name())
}

fn bind_context<R>(
    record: &mut R,
    binding: &FieldBinding<R>,
    value: Option<crate::descriptor::ContextValue>,
) -> Result<(), BindingError> {
    let Some(value) = value else {
        if binding.is_required() {
            return Err(BindingError::missing(
                Source::Context,
                binding.name(),
                binding.key(),
            ));
        }
        return Ok(());
    };

    let FieldSetter::Context(set) = binding.setter() else {
        return Err(setter_rejected(Source::Context, binding));
    };
    if set(record, &*value) {
        Ok(())
    } else {
        Err(setter_rejected(Source::Context, binding))
    }
}

/// A compiled schema plus binding options, shared across requests.
///
/// Cloning is cheap; clones share the same schema.
///
/// ```rust,ignore
/// let binder = RequestBinder::<Product>::compile()?
///     .with_options(BindOptions::new().with_max_body_bytes(1024));
/// let product = binder.bind(&request)?;
/// ```
pub struct RequestBinder<R> {
    schema: Arc<HandlerSchema<R>>,
    options: BindOptions,
}

impl<R: BindRecord> RequestBinder<R> {
    /// Compiles the schema of `R` and wraps it in a binder.
    pub fn compile() -> Result<Self, crate::error::SchemaError> {
        Ok(Self::new(Arc::new(HandlerSchema::compile()?)))
    }

    /// Binds one request.
    pub fn bind<A>(&self, adapter: &A) -> Result<R, BindingError>
    where
        A: RequestAdapter + ?Sized,
    {
        bind_with_options(&self.schema, adapter, self.options)
    }
}

impl<R> RequestBinder<R> {
    /// Creates a binder over an already compiled schema.
    pub fn new(schema: Arc<HandlerSchema<R>>) -> Self {
        Self {
            schema,
            options: BindOptions::default(),
        }
    }

    /// Replaces the binding options.
    pub fn with_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    /// The compiled schema.
    pub fn schema(&self) -> &HandlerSchema<R> {
        &self.schema
    }

    /// The shared schema handle.
    pub fn shared_schema(&self) -> Arc<HandlerSchema<R>> {
        Arc::clone(&self.schema)
    }

    /// The binding options.
    pub fn options(&self) -> BindOptions {
        self.options
    }
}

impl<R> Clone for RequestBinder<R> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            options: self.options,
        }
    }
}

impl<R> fmt::Debug for RequestBinder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBinder")
            .field("record", &self.schema.record_type())
            .field("options", &self.options)
            .finish()
    }
}
