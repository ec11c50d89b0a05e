//! Error taxonomy.
//!
//! Two families of errors exist:
//!
//! - [`SchemaError`]: a handler or record is malformed. Raised once, when the
//!   handler is compiled, and never at request time.
//! - [`BindingError`]: a request could not be bound. Each error records which
//!   source and field failed, and maps to an HTTP status and a stable code.

use crate::coerce::CoercionError;
use crate::schema::ContentKind;
use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Where a bound value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The request payload
    Body,
    /// Named path parameters (e.g. `/users/{id}`)
    Path,
    /// Request headers
    Header,
    /// Query string parameters
    Query,
    /// Values stored in the request context by server-side code
    Context,
}

impl Source {
    /// Sources in binding order.
    pub const ALL: [Self; 5] = [
        Self::Body,
        Self::Path,
        Self::Header,
        Self::Query,
        Self::Context,
    ];
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Path => write!(f, "path"),
            Self::Header => write!(f, "header"),
            Self::Query => write!(f, "query"),
            Self::Context => write!(f, "context"),
        }
    }
}

/// A handler or record that cannot be compiled into a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// No leading parameter types were supplied.
    #[error("the expected leading parameter list must not be empty")]
    EmptyExpectedParams,

    /// The handler takes the wrong number of parameters.
    #[error("handler must take {expected} parameters, found {actual}")]
    ParamCount {
        /// Leading parameters plus the record
        expected: usize,
        /// Parameters the handler declares
        actual: usize,
    },

    /// A leading parameter has the wrong type.
    #[error("handler parameter {position} must be `{expected}`, found `{actual}`")]
    LeadingParamMismatch {
        /// Zero-based parameter position
        position: usize,
        /// Expected type name
        expected: &'static str,
        /// Declared type name
        actual: &'static str,
    },

    /// Two fields share the same position.
    #[error("record `{record}` declares field index {index} twice")]
    DuplicateFieldIndex {
        /// Record type name
        record: &'static str,
        /// Repeated index
        index: usize,
    },

    /// A field is tagged for more than one source.
    #[error("field `{field}` is bound to both {first} and {second}")]
    ConflictingSources {
        /// Field name
        field: &'static str,
        /// First source
        first: Source,
        /// Second source
        second: Source,
    },

    /// Two fields of one source use the same key.
    #[error("{source_kind} key '{key}' is used by both `{first_field}` and `{second_field}`")]
    DuplicateKey {
        /// Source the key belongs to
        source_kind: Source,
        /// Repeated key
        key: String,
        /// Field declared first
        first_field: &'static str,
        /// Field declared second
        second_field: &'static str,
    },

    /// The body's content type tag names an unknown encoding.
    #[error("field `{field}` has unsupported content type '{content_type}'")]
    UnsupportedContentType {
        /// Body field name
        field: &'static str,
        /// Raw tag value
        content_type: &'static str,
    },

    /// The body field's type cannot receive the resolved content kind.
    #[error("body field `{field}` of type `{type_name}` cannot receive {content_kind} content")]
    IncompatibleBody {
        /// Body field name
        field: &'static str,
        /// Declared type name
        type_name: &'static str,
        /// Resolved content kind
        content_kind: ContentKind,
    },

    /// A tagged field has no setter for its source.
    #[error("field `{field}` of type `{type_name}` cannot be bound from {source_kind}")]
    MissingAccessor {
        /// Field name
        field: &'static str,
        /// Declared type name
        type_name: &'static str,
        /// Source it is tagged for
        source_kind: Source,
    },

    /// A default literal does not convert to the field's kind.
    #[error("invalid default '{literal}' for field `{field}`")]
    InvalidDefault {
        /// Field name
        field: &'static str,
        /// Raw default literal
        literal: &'static str,
        /// Conversion failure
        #[source]
        source: CoercionError,
    },
}

/// Classification of a [`BindingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingErrorKind {
    /// A required value is absent or empty.
    MissingRequired,
    /// A value did not convert to its declared kind.
    InvalidValue,
    /// The body failed to decode.
    MalformedBody,
    /// The body exceeds the configured limit.
    PayloadTooLarge,
    /// A value supplied by server-side code does not have the field's
    /// declared type.
    TypeMismatch,
}

impl BindingErrorKind {
    /// Returns `true` if the client caused the failure.
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::TypeMismatch)
    }
}

/// Coarse outcome code exposed to callers of the binding engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode {
    /// Binding succeeded.
    #[default]
    NoError,
    /// Binding failed for a reason other than a missing value.
    UnexpectedError,
    /// A required parameter was absent.
    MissingRequiredParamError,
}

impl ErrorCode {
    /// Classifies an optional binding error.
    pub fn of(error: Option<&BindingError>) -> Self {
        error.map_or(Self::NoError, BindingError::code)
    }
}

/// Returns the [`ErrorCode`] for a binding outcome.
///
/// ```rust
/// use daedalus_core::{error_code, BindingError, ErrorCode, Source};
///
/// let ok: Result<(), BindingError> = Ok(());
/// assert_eq!(error_code(&ok), ErrorCode::NoError);
///
/// let missing: Result<(), BindingError> =
///     Err(BindingError::missing(Source::Path, "id", "id"));
/// assert_eq!(error_code(&missing), ErrorCode::MissingRequiredParamError);
/// ```
pub fn error_code<T>(result: &Result<T, BindingError>) -> ErrorCode {
    ErrorCode::of(result.as_ref().err())
}

/// A request that could not be bound to its argument record.
///
/// # Example
///
/// ```rust
/// use daedalus_core::{BindingError, Source};
/// use http::StatusCode;
///
/// let err = BindingError::missing(Source::Header, "brand", "brand");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.binding_source(), Source::Header);
/// assert_eq!(err.error_code(), "MISSING_PARAMETER");
/// assert!(err.to_string().contains("brand"));
/// ```
#[derive(Debug)]
pub struct BindingError {
    binding_source: Source,
    kind: BindingErrorKind,
    field: Option<&'static str>,
    key: Option<String>,
    raw_value: Option<String>,
    message: String,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BindingError {
    /// A required value was absent or empty.
    #[must_use]
    pub fn missing(source: Source, field: &'static str, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            binding_source: source,
            kind: BindingErrorKind::MissingRequired,
            field: Some(field),
            message: format!("required {source} parameter '{key}' is empty"),
            key: Some(key),
            raw_value: None,
            cause: None,
        }
    }

    /// A value did not convert to the field's kind.
    #[must_use]
    pub fn invalid_value(
        source: Source,
        field: &'static str,
        key: impl Into<String>,
        error: CoercionError,
    ) -> Self {
        let key = key.into();
        Self {
            binding_source: source,
            kind: BindingErrorKind::InvalidValue,
            field: Some(field),
            message: format!(
                "could not convert {source} parameter '{key}' to {}: {}",
                error.kind(),
                error.parse_error()
            ),
            key: Some(key),
            raw_value: Some(error.text().to_owned()),
            cause: Some(Box::new(error)),
        }
    }

    /// The body failed to decode as JSON.
    #[must_use]
    pub fn malformed_body(field: &'static str, error: serde_json::Error) -> Self {
        Self {
            binding_source: Source::Body,
            kind: BindingErrorKind::MalformedBody,
            field: Some(field),
            message: format!("could not parse body as JSON: {error}"),
            key: None,
            raw_value: None,
            cause: Some(Box::new(error)),
        }
    }

    /// The body exceeds `max_size` bytes.
    #[must_use]
    pub fn payload_too_large(field: &'static str, max_size: usize, actual_size: usize) -> Self {
        Self {
            binding_source: Source::Body,
            kind: BindingErrorKind::PayloadTooLarge,
            field: Some(field),
            message: format!(
                "request body too large: {actual_size} bytes exceeds limit of {max_size} bytes"
            ),
            key: None,
            raw_value: None,
            cause: None,
        }
    }

    /// A value from trusted server-side code does not have the field's type.
    #[must_use]
    pub fn type_mismatch(
        source: Source,
        field: &'static str,
        key: impl Into<String>,
        expected_type: &'static str,
    ) -> Self {
        let key = key.into();
        Self {
            binding_source: source,
            kind: BindingErrorKind::TypeMismatch,
            field: Some(field),
            message: format!("could not convert {source} value '{key}' to type {expected_type}"),
            key: Some(key),
            raw_value: None,
            cause: None,
        }
    }

    /// Returns the source being bound when the error occurred.
    pub fn binding_source(&self) -> Source {
        self.binding_source
    }

    /// Returns the error classification.
    pub fn kind(&self) -> BindingErrorKind {
        self.kind
    }

    /// Returns the record field that failed.
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Returns the source key that failed, if the source is keyed.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the raw text that failed to convert.
    pub fn raw_value(&self) -> Option<&str> {
        self.raw_value.as_deref()
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            BindingErrorKind::MissingRequired
            | BindingErrorKind::InvalidValue
            | BindingErrorKind::MalformedBody => StatusCode::BAD_REQUEST,
            BindingErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            BindingErrorKind::TypeMismatch => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            BindingErrorKind::MissingRequired => "MISSING_PARAMETER",
            BindingErrorKind::InvalidValue => "INVALID_PARAMETER",
            BindingErrorKind::MalformedBody => "DESERIALIZATION_FAILED",
            BindingErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            BindingErrorKind::TypeMismatch => "TYPE_MISMATCH",
        }
    }

    /// Returns the coarse outcome code.
    pub fn code(&self) -> ErrorCode {
        match self.kind {
            BindingErrorKind::MissingRequired => ErrorCode::MissingRequiredParamError,
            _ => ErrorCode::UnexpectedError,
        }
    }

    /// Returns `true` if the client caused the failure.
    pub fn is_client_error(&self) -> bool {
        self.kind.is_client_error()
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
