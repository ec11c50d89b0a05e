//! Record descriptors.
//!
//! A [`RecordDescriptor`] is the static description of an argument record:
//! its ordered fields, each field's declared type name, the raw binding tags
//! attached to it and the typed setters that store a value into the field.
//!
//! Descriptors are normally generated by `#[derive(Bind)]`. They can also be
//! built by hand, which is how the unit tests in this crate exercise the
//! compiler without going through the derive macro.
//!
//! ```rust
//! use daedalus_core::{FieldDescriptor, RecordDescriptor, ScalarField, ScalarValue, Tag};
//!
//! #[derive(Default)]
//! struct Lookup {
//!     id: i64,
//! }
//!
//! let descriptor = RecordDescriptor::<Lookup>::new("Lookup").field(
//!     FieldDescriptor::new(0, "id", "i64")
//!         .with_tag(Tag::Path, "id")
//!         .with_scalar(i64::KIND, |record: &mut Lookup, value: ScalarValue| {
//!             match i64::from_scalar(value) {
//!                 Some(v) => {
//!                     record.id = v;
//!                     true
//!                 }
//!                 None => false,
//!             }
//!         }),
//! );
//!
//! assert_eq!(descriptor.fields().len(), 1);
//! assert_eq!(descriptor.fields()[0].tag(Tag::Path), Some("id"));
//! ```

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A value stored in a request's context by trusted server-side code.
pub type ContextValue = Arc<dyn Any + Send + Sync>;

/// Stores an already-coerced scalar into a field. Returns `false` when the
/// value's kind does not match the field.
pub type ScalarSetter<R> = fn(&mut R, ScalarValue) -> bool;

/// Stores a context value into a field. Returns `false` when the dynamic
/// value is not of the field's declared type.
pub type ContextSetter<R> = fn(&mut R, &(dyn Any + Send + Sync)) -> bool;

/// Decodes a JSON payload into the body field.
pub type JsonSetter<R> = fn(&mut R, &[u8]) -> Result<(), serde_json::Error>;

/// Stores the raw payload bytes into the body field.
pub type RawSetter<R> = fn(&mut R, Bytes);

/// Scalar kinds accepted for path, header and query fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// 8-bit signed integer
    I8,
    /// 16-bit signed integer
    I16,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// Pointer-sized signed integer
    Isize,
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit unsigned integer
    U64,
    /// Pointer-sized unsigned integer
    Usize,
    /// UTF-8 text, copied verbatim
    Text,
}

impl ScalarKind {
    /// Returns `true` for every integer kind.
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Returns the kind's name as used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::Text => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A coerced scalar value, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ScalarValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    Text(String),
}

impl ScalarValue {
    /// Returns the kind of this value.
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::I8(_) => ScalarKind::I8,
            Self::I16(_) => ScalarKind::I16,
            Self::I32(_) => ScalarKind::I32,
            Self::I64(_) => ScalarKind::I64,
            Self::Isize(_) => ScalarKind::Isize,
            Self::U8(_) => ScalarKind::U8,
            Self::U16(_) => ScalarKind::U16,
            Self::U32(_) => ScalarKind::U32,
            Self::U64(_) => ScalarKind::U64,
            Self::Usize(_) => ScalarKind::Usize,
            Self::Text(_) => ScalarKind::Text,
        }
    }
}

/// Field types that can receive path, header and query values.
///
/// Implemented for every fixed-width integer, `isize`/`usize`, `String`, and
/// `Option<T>` of any of those. Using any other type in a scalar position is
/// rejected when the crate is compiled.
pub trait ScalarField: Sized {
    /// The kind the raw text is coerced to.
    const KIND: ScalarKind;

    /// Unwraps a coerced value of kind [`Self::KIND`].
    fn from_scalar(value: ScalarValue) -> Option<Self>;
}

macro_rules! impl_scalar_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ScalarField for $ty {
                const KIND: ScalarKind = ScalarKind::$variant;

                fn from_scalar(value: ScalarValue) -> Option<Self> {
                    match value {
                        ScalarValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_scalar_field! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    String => Text,
}

impl<T: ScalarField> ScalarField for Option<T> {
    const KIND: ScalarKind = T::KIND;

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        T::from_scalar(value).map(Some)
    }
}

/// Body field types that can receive the payload verbatim.
pub trait RawBody {
    /// Builds the field value from the payload.
    fn from_bytes(bytes: Bytes) -> Self;
}

impl RawBody for Bytes {
    fn from_bytes(bytes: Bytes) -> Self {
        bytes
    }
}

impl RawBody for Vec<u8> {
    fn from_bytes(bytes: Bytes) -> Self {
        bytes.to_vec()
    }
}

/// Decodes a JSON body. Used by generated JSON setters.
pub fn decode_json<T: DeserializeOwned>(payload: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(payload)
}

/// Recovers a typed copy of a context value. Used by generated context
/// setters; this is the only place a dynamic value is inspected.
pub fn downcast_context<T: Clone + 'static>(value: &(dyn Any + Send + Sync)) -> Option<T> {
    value.downcast_ref::<T>().cloned()
}

/// Like [`downcast_context`], for `Option<T>` fields.
///
/// Accepts a stored `T` or a stored `Option<T>`.
pub fn downcast_optional_context<T: Clone + 'static>(
    value: &(dyn Any + Send + Sync),
) -> Option<Option<T>> {
    match value.downcast_ref::<T>() {
        Some(inner) => Some(Some(inner.clone())),
        None => value.downcast_ref::<Option<T>>().cloned(),
    }
}

/// The binding tags a field can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `path = "key"`
    Path,
    /// `header = "key[,optional]"`
    Header,
    /// `query = "key[,required]"`
    Query,
    /// `context = "key[,optional]"`
    Context,
    /// `content_type = "application/json"`
    ContentType,
    /// `default = "literal"`
    Default,
}

impl Tag {
    /// All tags, in the order they are reported.
    pub const ALL: [Self; 6] = [
        Self::Path,
        Self::Header,
        Self::Query,
        Self::Context,
        Self::ContentType,
        Self::Default,
    ];

    /// Returns the tag's attribute name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Header => "header",
            Self::Query => "query",
            Self::Context => "context",
            Self::ContentType => "content_type",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of one record field.
pub struct FieldDescriptor<R> {
    index: usize,
    name: &'static str,
    type_name: &'static str,
    tags: Vec<(Tag, &'static str)>,
    scalar: Option<(ScalarKind, ScalarSetter<R>)>,
    context: Option<ContextSetter<R>>,
    json: Option<JsonSetter<R>>,
    raw: Option<RawSetter<R>>,
}

impl<R> FieldDescriptor<R> {
    /// Creates a descriptor for the field at `index`.
    pub fn new(index: usize, name: &'static str, type_name: &'static str) -> Self {
        Self {
            index,
            name,
            type_name,
            tags: Vec::new(),
            scalar: None,
            context: None,
            json: None,
            raw: None,
        }
    }

    /// Attaches a raw tag string. A later value for the same tag replaces
    /// the earlier one.
    pub fn with_tag(mut self, tag: Tag, value: &'static str) -> Self {
        self.tags.retain(|(existing, _)| *existing != tag);
        self.tags.push((tag, value));
        self
    }

    /// Declares the field as a scalar of `kind`.
    pub fn with_scalar(mut self, kind: ScalarKind, setter: ScalarSetter<R>) -> Self {
        self.scalar = Some((kind, setter));
        self
    }

    /// Declares how the field receives a context value.
    pub fn with_context(mut self, setter: ContextSetter<R>) -> Self {
        self.context = Some(setter);
        self
    }

    /// Declares how the field decodes a JSON body.
    pub fn with_json_body(mut self, setter: JsonSetter<R>) -> Self {
        self.json = Some(setter);
        self
    }

    /// Declares the field as a raw byte sequence.
    pub fn with_raw_body(mut self, setter: RawSetter<R>) -> Self {
        self.raw = Some(setter);
        self
    }

    /// Position of the field in declaration order.
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

    /// Returns the raw string of `tag`, if present.
    pub fn tag(&self, tag: Tag) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(existing, _)| *existing == tag)
            .map(|(_, value)| *value)
    }

    /// Returns `true` if the field's declared type is a raw byte sequence.
    pub fn is_raw_bytes(&self) -> bool {
        self.raw.is_some()
    }

    pub(crate) fn scalar(&self) -> Option<(ScalarKind, ScalarSetter<R>)> {
        self.scalar
    }

    pub(crate) fn context_setter(&self) -> Option<ContextSetter<R>> {
        self.context
    }

    pub(crate) fn json_setter(&self) -> Option<JsonSetter<R>> {
        self.json
    }

    pub(crate) fn raw_setter(&self) -> Option<RawSetter<R>> {
        self.raw
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("tags", &self.tags)
            .field("scalar_kind", &self.scalar.map(|(kind, _)| kind))
            .field("context", &self.context.is_some())
            .field("json", &self.json.is_some())
            .field("raw", &self.raw.is_some())
            .finish()
    }
}

/// Static description of an argument record.
pub struct RecordDescriptor<R> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> RecordDescriptor<R> {
    /// Creates an empty descriptor.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn field(mut self, field: FieldDescriptor<R>) -> Self {
        self.fields.push(field);
        self
    }

    /// The record's type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }
}

impl<R> fmt::Debug for RecordDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// An argument record that can be populated from a request.
///
/// Implement with `#[derive(Bind)]`. The zero value the binder starts from
/// is [`Default::default`].
pub trait BindRecord: Default + Send + 'static {
    /// Describes the record's fields.
    fn descriptor() -> RecordDescriptor<Self>;
}
