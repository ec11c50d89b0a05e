//! Adapter conformance tests.
//!
//! Every bindable handler shape is run through `Adapted` with an
//! `HttpContext`, checking the values the handler actually receives.

use bytes::Bytes;
use daedalus_core::{Adapted, BindRecord};
use daedalus_http::{HttpContext, HttpError};
use daedalus_macros::Bind;
use http::{Method, StatusCode};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Wraps `handler` and calls it with `ctx`.
fn run<R, F>(ctx: HttpContext, handler: F) -> Result<(), HttpError>
where
    R: BindRecord,
    F: Fn(HttpContext, R) -> Result<(), HttpError> + Send + Sync + 'static,
{
    Adapted::new(handler)
        .expect("handler should compile")
        .call(ctx)
}

/// Runs a handler that stores `extract(args)` and returns the stored value.
fn capture<R, T>(ctx: HttpContext, extract: fn(R) -> T) -> Result<T, HttpError>
where
    R: BindRecord,
    T: Send + 'static,
{
    let slot = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&slot);
    run(ctx, move |_ctx: HttpContext, args: R| {
        *sink.lock().unwrap() = Some(extract(args));
        Ok(())
    })?;
    let value = slot.lock().unwrap().take();
    Ok(value.expect("handler was not invoked"))
}

fn request() -> daedalus_http::HttpContextBuilder {
    HttpContext::builder().method(Method::POST)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Person {
    id: i64,
    name: String,
}

#[derive(Default, Bind)]
struct PathArgs {
    #[bind(path = "pathParam")]
    p: String,
}

#[derive(Default, Bind)]
struct HeaderArgs {
    #[bind(header = "headerParam")]
    p: String,
}

#[derive(Default, Bind)]
struct QueryArgs {
    #[bind(query = "queryParam")]
    p: String,
}

#[derive(Default, Bind)]
struct JsonArgs {
    body: Person,
}

#[derive(Default, Bind)]
struct TypedJsonArgs {
    #[bind(content_type = "application/json")]
    body: Person,
}

#[derive(Default, Bind)]
struct RawArgs {
    body: Vec<u8>,
}

#[derive(Debug, Default, PartialEq, Bind)]
struct IntArgs {
    #[bind(path = "pathParam")]
    p: i32,
    #[bind(header = "headerParam")]
    h: i64,
    #[bind(query = "queryParam")]
    q: usize,
}

#[derive(Debug, Default, PartialEq, Bind)]
struct WidthArgs {
    #[bind(query = "a")]
    a: i8,
    #[bind(query = "b")]
    b: u16,
    #[bind(query = "c")]
    c: i32,
    #[bind(query = "d")]
    d: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Caller {
    subject: String,
}

#[derive(Default, Bind)]
struct ContextArgs {
    #[bind(context = "caller")]
    caller: Caller,
}

#[derive(Debug, Default, PartialEq, Bind)]
struct OptionalArgs {
    #[bind(header = "headerParam,optional")]
    h: String,
    #[bind(query = "queryParam")]
    q: Option<u32>,
    #[bind(context = "caller,optional")]
    caller: Caller,
}

#[derive(Default, Bind)]
struct DefaultArgs {
    #[bind(header = "headerParam", default = "43")]
    h: u32,
    #[bind(query = "queryParam", default = "fallback")]
    q: String,
}

#[test]
fn test_path_param() {
    let ctx = request().path_param("pathParam", "fake-path-param").build();
    let value = capture(ctx, |args: PathArgs| args.p).unwrap();
    assert_eq!(value, "fake-path-param");
}

#[test]
fn test_header_param() {
    let ctx = request().header("headerParam", "fake-header-param").build();
    let value = capture(ctx, |args: HeaderArgs| args.p).unwrap();
    assert_eq!(value, "fake-header-param");
}

#[test]
fn test_query_param() {
    let ctx = request().uri("/?queryParam=fake-query-param").build();
    let value = capture(ctx, |args: QueryArgs| args.p).unwrap();
    assert_eq!(value, "fake-query-param");
}

#[test]
fn test_json_body() {
    let ctx = request().body(r#"{"id":32,"name":"John Doe"}"#).build();
    let value = capture(ctx, |args: JsonArgs| args.body).unwrap();
    assert_eq!(
        value,
        Person {
            id: 32,
            name: "John Doe".into(),
        }
    );
}

#[test]
fn test_json_body_with_content_type_tag() {
    let ctx = request().body(r#"{"id":32,"name":"John Doe"}"#).build();
    let value = capture(ctx, |args: TypedJsonArgs| args.body.name).unwrap();
    assert_eq!(value, "John Doe");
}

#[test]
fn test_raw_body() {
    let ctx = request().body(r#"{"id":32,"name":"John Doe"}"#).build();
    let value = capture(ctx, |args: RawArgs| args.body).unwrap();
    assert_eq!(value, br#"{"id":32,"name":"John Doe"}"#);
}

#[test]
fn test_integer_params() {
    let ctx = request()
        .path_param("pathParam", "42")
        .header("headerParam", "43")
        .uri("/?queryParam=44")
        .build();
    let value = capture(ctx, |args: IntArgs| args).unwrap();
    assert_eq!(value, IntArgs { p: 42, h: 43, q: 44 });
}

#[test]
fn test_integer_widths() {
    let ctx = request().uri("/?a=-128&b=65535&c=-7&d=123").build();
    let value = capture(ctx, |args: WidthArgs| args).unwrap();
    assert_eq!(
        value,
        WidthArgs {
            a: -128,
            b: 65535,
            c: -7,
            d: 123,
        }
    );
}

#[test]
fn test_context_value() {
    let ctx = request()
        .value(
            "caller",
            Caller {
                subject: "svc-a".into(),
            },
        )
        .build();
    let value = capture(ctx, |args: ContextArgs| args.caller.subject).unwrap();
    assert_eq!(value, "svc-a");
}

#[test]
fn test_optional_values_left_empty() {
    let ctx = request().build();
    let value = capture(ctx, |args: OptionalArgs| args).unwrap();
    assert_eq!(value, OptionalArgs::default());
}

#[test]
fn test_defaults_fill_missing_values() {
    let ctx = request().build();
    let (h, q) = capture(ctx, |args: DefaultArgs| (args.h, args.q)).unwrap();
    assert_eq!(h, 43);
    assert_eq!(q, "fallback");

    let ctx = request()
        .header("headerParam", "7")
        .uri("/?queryParam=given")
        .build();
    let (h, q) = capture(ctx, |args: DefaultArgs| (args.h, args.q)).unwrap();
    assert_eq!(h, 7);
    assert_eq!(q, "given");
}

#[test]
fn test_missing_header_is_bad_request() {
    let invoked = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&invoked);

    let err = run(request().build(), move |_ctx: HttpContext, _args: HeaderArgs| {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    })
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(err.message().contains("headerParam"));
    assert!(!invoked.load(Ordering::SeqCst));
}

#[test]
fn test_bad_integer_is_bad_request() {
    let ctx = request()
        .path_param("pathParam", "42")
        .header("headerParam", "forty-three")
        .build();

    let err = capture(ctx, |args: IntArgs| args).unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(err.message().contains("header parameter 'headerParam' to i64"));
}

#[test]
fn test_malformed_json_is_bad_request() {
    let ctx = request().body(Bytes::from_static(b"{\"id\":")).build();

    let err = capture(ctx, |args: JsonArgs| args.body).unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(err.message().starts_with("could not parse body as JSON"));
}

#[test]
fn test_context_of_wrong_type_is_server_error() {
    let ctx = request().value("caller", "svc-a".to_string()).build();

    let err = capture(ctx, |args: ContextArgs| args.caller).unwrap_err();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_handler_error_is_returned_unchanged() {
    let ctx = request().path_param("pathParam", "x").build();

    let err = run(ctx, |_ctx: HttpContext, _args: PathArgs| {
        Err(HttpError::new(StatusCode::CONFLICT, "already exists"))
    })
    .unwrap_err();
    assert_eq!(err, HttpError::new(StatusCode::CONFLICT, "already exists"));
}
