//! Schema compilation.
//!
//! A [`HandlerSchema`] is the compiled, immutable binding plan for one
//! argument record. It is built once from the record's
//! [`RecordDescriptor`] and then shared by every request bound with it.
//!
//! Compilation interprets each field's tags:
//!
//! | Tag | Key | Required by default | Override |
//! |-----|-----|---------------------|----------|
//! | `path` | first token | always | none |
//! | `header` | first token | yes | `optional` |
//! | `query` | first token | no | `required` |
//! | `context` | first token | yes | `optional` |
//!
//! The field named `body` receives the request payload. Its content kind is
//! taken from a `content_type` tag, else raw bytes for byte-sequence fields,
//! else JSON.

use crate::coerce::coerce;
use crate::descriptor::{
    BindRecord, ContextSetter, FieldDescriptor, JsonSetter, RawSetter, RecordDescriptor,
    ScalarKind, ScalarSetter, ScalarValue, Tag,
};
use crate::error::{SchemaError, Source};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Name of the record field that receives the request payload.
pub const BODY_FIELD: &str = "body";

/// How the body payload is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Deserialize as JSON into the field's type.
    Json,
    /// Store the payload bytes unchanged.
    RawBytes,
}

impl ContentKind {
    /// Returns the MIME type that selects this kind.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::RawBytes => "application/octet-stream",
        }
    }

    /// Resolves a content type, ignoring any `;` parameters.
    ///
    /// ```rust
    /// use daedalus_core::ContentKind;
    ///
    /// assert_eq!(
    ///     ContentKind::from_content_type("application/json; charset=utf-8"),
    ///     Some(ContentKind::Json)
    /// );
    /// assert_eq!(ContentKind::from_content_type("text/xml"), None);
    /// ```
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        [Self::Json, Self::RawBytes]
            .into_iter()
            .find(|kind| kind.mime_type().eq_ignore_ascii_case(essence))
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

pub(crate) enum FieldSetter<R> {
    Scalar(ScalarSetter<R>),
    Context(ContextSetter<R>),
}

pub(crate) enum BodySetter<R> {
    Json(JsonSetter<R>),
    Raw(RawSetter<R>),
}

/// Compiled binding of one field to a keyed source.
pub struct FieldBinding<R> {
    index: usize,
    name: &'static str,
    key: String,
    required: bool,
    kind: Option<ScalarKind>,
    type_name: &'static str,
    default_literal: &'static str,
    default_value: Option<ScalarValue>,
    setter: FieldSetter<R>,
}

impl<R> FieldBinding<R> {
    /// Position of the field in the record.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The field's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The lookup key in the source.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether an empty value is an error.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The scalar kind values are coerced to. `None` for context fields.
    pub fn kind(&self) -> Option<ScalarKind> {
        self.kind
    }

    /// The field's declared type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The default literal, or `""` when there is none.
    pub fn default_literal(&self) -> &'static str {
        self.default_literal
    }

    /// The default literal coerced to the field's kind.
    ///
    /// A literal that does not coerce fails compilation with
    /// [`SchemaError::InvalidDefault`], so this is never an unchecked value.
    pub fn default_value(&self) -> Option<&ScalarValue> {
        self.default_value.as_ref()
    }

    pub(crate) fn setter(&self) -> &FieldSetter<R> {
        &self.setter
    }
}

impl<R> PartialEq for FieldBinding<R> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.name == other.name
            && self.key == other.key
            && self.required == other.required
            && self.kind == other.kind
            && self.type_name == other.type_name
            && self.default_literal == other.default_literal
            && self.default_value == other.default_value
    }
}

impl<R> fmt::Debug for FieldBinding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("key", &self.key)
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .field("default_literal", &self.default_literal)
            .finish_non_exhaustive()
    }
}

/// Compiled binding of the body field.
pub struct BodyBinding<R> {
    index: usize,
    name: &'static str,
    type_name: &'static str,
    content_kind: ContentKind,
    setter: BodySetter<R>,
}

impl<R> BodyBinding<R> {
    /// Position of the field in the record.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The field's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The field's declared type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// How the payload is decoded.
    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    pub(crate) fn setter(&self) -> &BodySetter<R> {
        &self.setter
    }
}

impl<R> PartialEq for BodyBinding<R> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.name == other.name
            && self.type_name == other.type_name
            && self.content_kind == other.content_kind
    }
}

impl<R> fmt::Debug for BodyBinding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyBinding")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("content_kind", &self.content_kind)
            .finish_non_exhaustive()
    }
}

/// The compiled binding plan for record type `R`.
///
/// Structural equality ignores setter function pointers, so compiling the
/// same record twice produces equal schemas.
pub struct HandlerSchema<R> {
    record_type: &'static str,
    field_names: Vec<&'static str>,
    body: Option<BodyBinding<R>>,
    path: IndexMap<String, FieldBinding<R>>,
    header: IndexMap<String, FieldBinding<R>>,
    query: IndexMap<String, FieldBinding<R>>,
    context: IndexMap<String, FieldBinding<R>>,
}

/// Compiles the schema of a record without validating a handler.
pub fn compile_record<R: BindRecord>() -> Result<HandlerSchema<R>, SchemaError> {
    HandlerSchema::compile()
}

impl<R: BindRecord> HandlerSchema<R> {
    /// Compiles the schema of `R`.
    pub fn compile() -> Result<Self, SchemaError> {
        Self::from_descriptor(&R::descriptor())
    }
}

impl<R> HandlerSchema<R> {
    /// Compiles a schema from a descriptor.
    pub fn from_descriptor(descriptor: &RecordDescriptor<R>) -> Result<Self, SchemaError> {
        check_field_indices(descriptor)?;
        check_sources(descriptor)?;

        let body = compile_body(descriptor)?;
        let path = compile_source(descriptor, Source::Path)?;
        let header = compile_source(descriptor, Source::Header)?;
        let query = compile_source(descriptor, Source::Query)?;
        let context = compile_source(descriptor, Source::Context)?;
        warn_ignored_tags(descriptor);

        let schema = Self {
            record_type: descriptor.type_name(),
            field_names: descriptor.fields().iter().map(FieldDescriptor::name).collect(),
            body,
            path,
            header,
            query,
            context,
        };

        debug!(
            record = schema.record_type,
            fields = schema.field_names.len(),
            bound = schema.bound_field_count(),
            has_body = schema.body.is_some(),
            "compiled binding schema"
        );

        Ok(schema)
    }

    /// The record's type name.
    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    /// All field names in declaration order.
    pub fn field_names(&self) -> &[&'static str] {
        &self.field_names
    }

    /// The body binding, if the record has a `body` field.
    pub fn body(&self) -> Option<&BodyBinding<R>> {
        self.body.as_ref()
    }

    /// Path bindings keyed by parameter name.
    pub fn path_params(&self) -> &IndexMap<String, FieldBinding<R>> {
        &self.path
    }

    /// Header bindings keyed by lowercased header name.
    pub fn headers(&self) -> &IndexMap<String, FieldBinding<R>> {
        &self.header
    }

    /// Query bindings keyed by parameter name.
    pub fn query_params(&self) -> &IndexMap<String, FieldBinding<R>> {
        &self.query
    }

    /// Context bindings keyed by context key.
    pub fn context_values(&self) -> &IndexMap<String, FieldBinding<R>> {
        &self.context
    }

    /// Keyed bindings for `source`. Returns `None` for [`Source::Body`].
    pub fn bindings(&self, source: Source) -> Option<&IndexMap<String, FieldBinding<R>>> {
        match source {
            Source::Body => None,
            Source::Path => Some(&self.path),
            Source::Header => Some(&self.header),
            Source::Query => Some(&self.query),
            Source::Context => Some(&self.context),
        }
    }

    /// Number of fields bound to any source.
    pub fn bound_field_count(&self) -> usize {
        usize::from(self.body.is_some())
            + self.path.len()
            + self.header.len()
            + self.query.len()
            + self.context.len()
    }
}

impl<R> PartialEq for HandlerSchema<R> {
    fn eq(&self, other: &Self) -> bool {
        self.record_type == other.record_type
            && self.field_names == other.field_names
            && self.body == other.body
            && self.path.iter().eq(other.path.iter())
            && self.header.iter().eq(other.header.iter())
            && self.query.iter().eq(other.query.iter())
            && self.context.iter().eq(other.context.iter())
    }
}

impl<R> fmt::Debug for HandlerSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSchema")
            .field("record_type", &self.record_type)
            .field("field_names", &self.field_names)
            .field("body", &self.body)
            .field("path", &self.path)
            .field("header", &self.header)
            .field("query", &self.query)
            .field("context", &self.context)
            .finish()
    }
}

const fn source_tag(source: Source) -> Option<Tag> {
    match source {
        Source::Body => None,
        Source::Path => Some(Tag::Path),
        Source::Header => Some(Tag::Header),
        Source::Query => Some(Tag::Query),
        Source::Context => Some(Tag::Context),
    }
}

/// Splits a tag into its key and modifier tokens, all trimmed.
fn parse_tag(raw: &str) -> (&str, Vec<&str>) {
    let mut tokens = raw.split(',').map(str::trim);
    let key = tokens.next().unwrap_or_default();
    (key, tokens.collect())
}

fn bound_key<R>(field: &FieldDescriptor<R>, source: Source) -> Option<&'static str> {
    let raw = field.tag(source_tag(source)?)?;
    let (key, _) = parse_tag(raw);
    (!key.is_empty()).then_some(key)
}

/// Sources a field is bound to, in binding order.
fn field_sources<R>(field: &FieldDescriptor<R>) -> Vec<Source> {
    Source::ALL
        .into_iter()
        .filter(|source| match source {
            Source::Body => field.name() == BODY_FIELD,
            _ => bound_key(field, *source).is_some(),
        })
        .collect()
}

fn check_field_indices<R>(descriptor: &RecordDescriptor<R>) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in descriptor.fields() {
        if !seen.insert(field.index()) {
            return Err(SchemaError::DuplicateFieldIndex {
                record: descriptor.type_name(),
                index: field.index(),
            });
        }
    }
    Ok(())
}

fn check_sources<R>(descriptor: &RecordDescriptor<R>) -> Result<(), SchemaError> {
    for field in descriptor.fields() {
        if let [first, second, ..] = field_sources(field)[..] {
            return Err(SchemaError::ConflictingSources {
                field: field.name(),
                first,
                second,
            });
        }
    }
    Ok(())
}

fn is_required(source: Source, field: &'static str, modifiers: &[&str]) -> bool {
    let (default, toggle) = match source {
        Source::Header | Source::Context => (true, Some("optional")),
        Source::Query => (false, Some("required")),
        Source::Path | Source::Body => (true, None),
    };

    let mut required = default;
    for (position, modifier) in modifiers.iter().enumerate() {
        if position == 0 && toggle == Some(*modifier) {
            required = !default;
        } else if !modifier.is_empty() {
            warn!(field, source = %source, modifier, "ignoring unrecognised tag modifier");
        }
    }
    required
}

fn compile_source<R>(
    descriptor: &RecordDescriptor<R>,
    source: Source,
) -> Result<IndexMap<String, FieldBinding<R>>, SchemaError> {
    let mut bindings: IndexMap<String, FieldBinding<R>> = IndexMap::new();
    let Some(tag) = source_tag(source) else {
        return Ok(bindings);
    };

    for field in descriptor.fields() {
        let Some(raw) = field.tag(tag) else {
            continue;
        };
        let (key, modifiers) = parse_tag(raw);
        if key.is_empty() {
            continue;
        }

        // Header names are case-insensitive on the wire.
        let map_key = match source {
            Source::Header => key.to_ascii_lowercase(),
            _ => key.to_owned(),
        };
        if let Some(existing) = bindings.get(&map_key) {
            return Err(SchemaError::DuplicateKey {
                source_kind: source,
                key: key.to_owned(),
                first_field: existing.name,
                second_field: field.name(),
            });
        }

        let required = is_required(source, field.name(), &modifiers);
        let binding = match source {
            Source::Context => context_binding(field, key, required)?,
            _ => scalar_binding(field, source, key, required)?,
        };
        bindings.insert(map_key, binding);
    }

    Ok(bindings)
}

fn scalar_binding<R>(
    field: &FieldDescriptor<R>,
    source: Source,
    key: &str,
    required: bool,
) -> Result<FieldBinding<R>, SchemaError> {
    let (kind, setter) = field
        .scalar()
        .ok_or_else(|| SchemaError::MissingAccessor {
            field: field.name(),
            type_name: field.type_name(),
            source_kind: source,
        })?;

    let default_literal = match source {
        Source::Header | Source::Query => field.tag(Tag::Default).unwrap_or_default(),
        _ => "",
    };
    let default_value = if default_literal.is_empty() {
        None
    } else {
        let value = coerce(kind, default_literal).map_err(|source| SchemaError::InvalidDefault {
            field: field.name(),
            literal: default_literal,
            source,
        })?;
        Some(value)
    };

    Ok(FieldBinding {
        index: field.index(),
        name: field.name(),
        key: key.to_owned(),
        required,
        kind: Some(kind),
        type_name: field.type_name(),
        default_literal,
        default_value,
        setter: FieldSetter::Scalar(setter),
    })
}

fn context_binding<R>(
    field: &FieldDescriptor<R>,
    key: &str,
    required: bool,
) -> Result<FieldBinding<R>, SchemaError> {
    let setter = field
        .context_setter()
        .ok_or_else(|| SchemaError::MissingAccessor {
            field: field.name(),
            type_name: field.type_name(),
            source_kind: Source::Context,
        })?;

    Ok(FieldBinding {
        index: field.index(),
        name: field.name(),
        key: key.to_owned(),
        required,
        kind: None,
        type_name: field.type_name(),
        default_literal: "",
        default_value: None,
        setter: FieldSetter::Context(setter),
    })
}

fn compile_body<R>(descriptor: &RecordDescriptor<R>) -> Result<Option<BodyBinding<R>>, SchemaError> {
    let Some(field) = descriptor
        .fields()
        .iter()
        .find(|field| field.name() == BODY_FIELD)
    else {
        return Ok(None);
    };

    let explicit = field
        .tag(Tag::ContentType)
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let content_kind = match explicit {
        Some(content_type) => ContentKind::from_content_type(content_type).ok_or(
            SchemaError::UnsupportedContentType {
                field: field.name(),
                content_type,
            },
        )?,
        None if field.is_raw_bytes() => ContentKind::RawBytes,
        None => ContentKind::Json,
    };

    let setter = match content_kind {
        ContentKind::Json => field.json_setter().map(BodySetter::Json),
        ContentKind::RawBytes => field.raw_setter().map(BodySetter::Raw),
    }
    .ok_or_else(|| SchemaError::IncompatibleBody {
        field: field.name(),
        type_name: field.type_name(),
        content_kind,
    })?;

    Ok(Some(BodyBinding {
        index: field.index(),
        name: field.name(),
        type_name: field.type_name(),
        content_kind,
        setter,
    }))
}

fn warn_ignored_tags<R>(descriptor: &RecordDescriptor<R>) {
    for field in descriptor.fields() {
        if field.name() != BODY_FIELD && field.tag(Tag::ContentType).is_some() {
            warn!(
                field = field.name(),
                "ignoring content_type tag on a field that is not the body"
            );
        }

        let takes_default = matches!(
            field_sources(field).first(),
            Some(Source::Header | Source::Query)
        );
        if !takes_default && field.tag(Tag::Default).is_some() {
            warn!(
                field = field.name(),
                "ignoring default tag; defaults apply to header and query fields only"
            );
        }
    }
}
