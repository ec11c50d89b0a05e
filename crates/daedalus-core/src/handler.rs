//! Handler shape validation and adaptation.
//!
//! A bindable handler is a plain function whose leading parameters are
//! fixed by the integration (usually the framework's request context) and
//! whose trailing parameter is a [`BindRecord`]. It returns
//! `Result<(), E>`.
//!
//! [`compile`] checks a handler against the expected leading parameter types
//! and compiles the record's schema. [`Adapted`] wraps a handler so that a
//! transport can call it with nothing but its request context.
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_core::Adapted;
//!
//! fn get_product(ctx: HttpContext, args: GetProduct) -> Result<(), HttpError> {
//!     // ...
//!     Ok(())
//! }
//!
//! let adapted = Adapted::new(get_product)?;
//! adapted.call(ctx)?;
//! ```

use crate::adapter::RequestAdapter;
use crate::binder::{BindOptions, RequestBinder};
use crate::descriptor::BindRecord;
use crate::error::SchemaError;
use crate::schema::HandlerSchema;
use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Identity and name of a parameter type.
#[derive(Debug, Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Describes `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The type's identity.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type's name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Parameter and return types of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<TypeDescriptor>,
    output: TypeDescriptor,
}

impl Signature {
    /// Creates a signature.
    pub fn new(params: Vec<TypeDescriptor>, output: TypeDescriptor) -> Self {
        Self { params, output }
    }

    /// All parameter types, in order.
    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    /// The return type.
    pub fn output(&self) -> TypeDescriptor {
        self.output
    }

    /// The trailing parameter, if any.
    pub fn record(&self) -> Option<TypeDescriptor> {
        self.params.last().copied()
    }
}

/// Functions that can be bound.
///
/// Implemented for every `Fn(A1, .., An, R) -> Result<(), E>` with up to
/// three leading parameters, where `R` is a [`BindRecord`]. `Args` is the
/// full parameter tuple and only disambiguates the implementations.
pub trait HandlerFn<Args>: Send + Sync + 'static {
    /// The trailing argument record.
    type Record: BindRecord;

    /// The handler's error type.
    type Error;

    /// The handler's parameter and return types.
    fn signature() -> Signature;
}

macro_rules! impl_handler_fn {
    ($($param:ident),*) => {
        impl<F, $($param,)* R, E> HandlerFn<($($param,)* R,)> for F
        where
            F: Fn($($param,)* R) -> Result<(), E> + Send + Sync + 'static,
            $($param: 'static,)*
            R: BindRecord,
            E: 'static,
        {
            type Record = R;
            type Error = E;

            fn signature() -> Signature {
                Signature::new(
                    vec![$(TypeDescriptor::of::<$param>(),)* TypeDescriptor::of::<R>()],
                    TypeDescriptor::of::<Result<(), E>>(),
                )
            }
        }
    };
}

impl_handler_fn!();
impl_handler_fn!(A1);
impl_handler_fn!(A1, A2);
impl_handler_fn!(A1, A2, A3);

/// Checks a handler signature against the expected leading parameters.
pub fn validate_signature(
    signature: &Signature,
    expected_leading: &[TypeDescriptor],
) -> Result<(), SchemaError> {
    if expected_leading.is_empty() {
        return Err(SchemaError::EmptyExpectedParams);
    }

    let params = signature.params();
    if params.len() != expected_leading.len() + 1 {
        return Err(SchemaError::ParamCount {
            expected: expected_leading.len() + 1,
            actual: params.len(),
        });
    }

    for (position, (expected, actual)) in expected_leading.iter().zip(params).enumerate() {
        if expected != actual {
            return Err(SchemaError::LeadingParamMismatch {
                position,
                expected: expected.name(),
                actual: actual.name(),
            });
        }
    }

    Ok(())
}

/// Validates `handler` and compiles the schema of its trailing record.
///
/// The handler value only identifies its type; it is not called.
pub fn compile<H, Args>(
    _handler: &H,
    expected_leading: &[TypeDescriptor],
) -> Result<HandlerSchema<H::Record>, SchemaError>
where
    H: HandlerFn<Args>,
{
    validate_signature(&H::signature(), expected_leading)?;
    let schema = HandlerSchema::compile()?;

    debug!(
        handler = type_name::<H>(),
        record = schema.record_type(),
        "compiled handler"
    );

    Ok(schema)
}

/// A handler bound to a transport context type `C`.
///
/// The schema is compiled once, in [`Adapted::new`]. Each [`Adapted::call`]
/// binds the request and invokes the handler, or turns the binding error
/// into the transport's error without invoking it.
pub struct Adapted<C, R, F> {
    handler: F,
    binder: RequestBinder<R>,
    _context: PhantomData<fn(C)>,
}

impl<C, R, F> Adapted<C, R, F>
where
    C: RequestAdapter + 'static,
    C::Error: 'static,
    R: BindRecord,
    F: Fn(C, R) -> Result<(), C::Error> + Send + Sync + 'static,
{
    /// Validates `handler` against `C` and compiles its schema.
    pub fn new(handler: F) -> Result<Self, SchemaError> {
        Self::with_options(handler, BindOptions::default())
    }

    /// Like [`Adapted::new`], with binding options.
    pub fn with_options(handler: F, options: BindOptions) -> Result<Self, SchemaError> {
        let schema = compile::<F, (C, R)>(&handler, &[TypeDescriptor::of::<C>()])?;
        Ok(Self {
            handler,
            binder: RequestBinder::new(Arc::new(schema)).with_options(options),
            _context: PhantomData,
        })
    }

    /// Binds `ctx` and invokes the handler.
    pub fn call(&self, ctx: C) -> Result<(), C::Error> {
        let record = match self.binder.bind(&ctx) {
            Ok(record) => record,
            Err(err) => return Err(ctx.new_error(err.status_code(), err.to_string())),
        };
        (self.handler)(ctx, record)
    }

    /// The compiled schema.
    pub fn schema(&self) -> &HandlerSchema<R> {
        self.binder.schema()
    }
}

impl<C, R, F> fmt::Debug for Adapted<C, R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapted")
            .field("context", &type_name::<C>())
            .field("handler", &type_name::<F>())
            .field("binder", &self.binder)
            .finish()
    }
}
