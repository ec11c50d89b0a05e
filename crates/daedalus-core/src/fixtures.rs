//! Hand-built records and an in-memory adapter shared by the unit tests.

use crate::adapter::RequestAdapter;
use crate::descriptor::{
    decode_json, BindRecord, ContextValue, FieldDescriptor, RawBody, RecordDescriptor, Tag,
};
use bytes::Bytes;
use http::StatusCode;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

macro_rules! scalar_field {
    ($record:ty, $index:expr, $field:ident: $ty:ty) => {
        $crate::descriptor::FieldDescriptor::<$record>::new(
            $index,
            stringify!($field),
            ::std::any::type_name::<$ty>(),
        )
        .with_scalar(
            <$ty as $crate::descriptor::ScalarField>::KIND,
            |record: &mut $record, value: $crate::descriptor::ScalarValue| {
                match <$ty as $crate::descriptor::ScalarField>::from_scalar(value) {
                    Some(v) => {
                        record.$field = v;
                        true
                    }
                    None => false,
                }
            },
        )
    };
}

macro_rules! context_field {
    ($record:ty, $index:expr, $field:ident: $ty:ty) => {
        $crate::descriptor::FieldDescriptor::<$record>::new(
            $index,
            stringify!($field),
            ::std::any::type_name::<$ty>(),
        )
        .with_context(
            |record: &mut $record, value: &(dyn ::std::any::Any + Send + Sync)| {
                match $crate::descriptor::downcast_context::<$ty>(value) {
                    Some(v) => {
                        record.$field = v;
                        true
                    }
                    None => false,
                }
            },
        )
    };
}

pub(crate) use scalar_field;

/// `GET /products/{id}?q=...` with an optional `brand` header.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Product {
    pub id: u64,
    pub brand: String,
    pub q: String,
}

impl BindRecord for Product {
    fn descriptor() -> RecordDescriptor<Self> {
        RecordDescriptor::new("Product")
            .field(scalar_field!(Product, 0, id: u64).with_tag(Tag::Path, "id"))
            .field(scalar_field!(Product, 1, brand: String).with_tag(Tag::Header, "brand,optional"))
            .field(scalar_field!(Product, 2, q: String).with_tag(Tag::Query, "q,required"))
    }
}

/// A single required header with no default.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Traced {
    pub request_id: String,
}

impl BindRecord for Traced {
    fn descriptor() -> RecordDescriptor<Self> {
        RecordDescriptor::new("Traced").field(
            scalar_field!(Traced, 0, request_id: String).with_tag(Tag::Header, "X-Request-Id"),
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Payload {
    pub id: i64,
    pub name: String,
}

/// JSON body, a defaulted header and a required context value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct CreateItem {
    pub body: Payload,
    pub page: i32,
    pub user: String,
}

impl BindRecord for CreateItem {
    fn descriptor() -> RecordDescriptor<Self> {
        RecordDescriptor::new("CreateItem")
            .field(
                FieldDescriptor::new(0, "body", "Payload").with_json_body(
                    |record: &mut CreateItem, payload: &[u8]| {
                        record.body = decode_json(payload)?;
                        Ok(())
                    },
                ),
            )
            .field(
                scalar_field!(CreateItem, 1, page: i32)
                    .with_tag(Tag::Header, "page")
                    .with_tag(Tag::Default, "43"),
            )
            .field(context_field!(CreateItem, 2, user: String).with_tag(Tag::Context, "user"))
    }
}

/// Raw body and an optional context value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Upload {
    pub body: Vec<u8>,
    pub tenant: String,
}

impl BindRecord for Upload {
    fn descriptor() -> RecordDescriptor<Self> {
        RecordDescriptor::new("Upload")
            .field(
                FieldDescriptor::new(0, "body", "alloc::vec::Vec<u8>")
                    .with_json_body(|record: &mut Upload, payload: &[u8]| {
                        record.body = decode_json(payload)?;
                        Ok(())
                    })
                    .with_raw_body(|record: &mut Upload, payload: Bytes| {
                        record.body = <Vec<u8> as RawBody>::from_bytes(payload);
                    }),
            )
            .field(
                context_field!(Upload, 1, tenant: String)
                    .with_tag(Tag::Context, "tenant,optional"),
            )
    }
}

/// One optional query parameter per integer width.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Widths {
    pub tiny: i8,
    pub small: i16,
    pub medium: i32,
    pub large: i64,
    pub native: isize,
    pub utiny: u8,
    pub usmall: u16,
    pub umedium: u32,
    pub ularge: u64,
    pub unative: usize,
}

impl BindRecord for Widths {
    fn descriptor() -> RecordDescriptor<Self> {
        RecordDescriptor::new("Widths")
            .field(scalar_field!(Widths, 0, tiny: i8).with_tag(Tag::Query, "i8"))
            .field(scalar_field!(Widths, 1, small: i16).with_tag(Tag::Query, "i16"))
            .field(scalar_field!(Widths, 2, medium: i32).with_tag(Tag::Query, "i32"))
            .field(scalar_field!(Widths, 3, large: i64).with_tag(Tag::Query, "i64"))
            .field(scalar_field!(Widths, 4, native: isize).with_tag(Tag::Query, "isize"))
            .field(scalar_field!(Widths, 5, utiny: u8).with_tag(Tag::Query, "u8"))
            .field(scalar_field!(Widths, 6, usmall: u16).with_tag(Tag::Query, "u16"))
            .field(scalar_field!(Widths, 7, umedium: u32).with_tag(Tag::Query, "u32"))
            .field(scalar_field!(Widths, 8, ularge: u64).with_tag(Tag::Query, "u64"))
            .field(scalar_field!(Widths, 9, unative: usize).with_tag(Tag::Query, "usize"))
    }
}

/// In-memory request.
#[derive(Default)]
pub(crate) struct MockRequest {
    pub body: Bytes,
    pub path: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub context: HashMap<String, ContextValue>,
}

impl MockRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn path(mut self, key: &str, value: &str) -> Self {
        self.path.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_ascii_lowercase(), value.to_owned());
        self
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn context<T: Send + Sync + 'static>(mut self, key: &str, value: T) -> Self {
        self.context.insert(key.to_owned(), Arc::new(value));
        self
    }
}

impl RequestAdapter for MockRequest {
    type Error = (StatusCode, String);

    fn new_error(&self, status: StatusCode, message: String) -> Self::Error {
        (status, message)
    }

    fn body(&self) -> Bytes {
        self.body.clone()
    }

    fn path_param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.path.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }

    fn header_param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(|v| Cow::Borrowed(v.as_str()))
    }

    fn query_param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.query.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }

    fn context_value(&self, key: &str) -> Option<ContextValue> {
        self.context.get(key).cloned()
    }

    fn set_context_value(&mut self, key: &str, value: ContextValue) {
        self.context.insert(key.to_owned(), value);
    }
}
