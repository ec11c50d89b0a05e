//! End-to-end binding through the facade: derive, compile, bind, invoke.

use daedalus::prelude::*;
use http::{Method, StatusCode};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone, PartialEq, Bind)]
struct GetProduct {
    #[bind(path = "id")]
    id: u64,
    #[bind(header = "brand,optional")]
    brand: String,
    #[bind(query = "q,required")]
    q: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
struct NewProduct {
    id: i64,
    name: String,
}

#[derive(Debug, Default, Clone, PartialEq, Bind)]
struct CreateProduct {
    body: NewProduct,
    #[bind(header = "x-page", default = "43")]
    page: i32,
    #[bind(context = "tenant")]
    tenant: Tenant,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Tenant(String);

#[derive(Debug, Default, Bind)]
struct Tiny {
    #[bind(query = "n,required")]
    n: i8,
    #[bind(query = "big")]
    big: u64,
}

/// Collects the records a handler receives.
#[derive(Clone, Default)]
struct Recorder<R> {
    seen: Arc<Mutex<Vec<R>>>,
}

impl<R: Clone + Send + 'static> Recorder<R> {
    fn handler(&self) -> impl Fn(HttpContext, R) -> Result<(), HttpError> + Send + Sync + 'static {
        let seen = Arc::clone(&self.seen);
        move |_ctx, record| {
            seen.lock().unwrap().push(record);
            Ok(())
        }
    }

    fn records(&self) -> Vec<R> {
        self.seen.lock().unwrap().clone()
    }
}

fn product_request(query: &str) -> HttpContext {
    HttpContext::builder()
        .uri(&format!("/products/42{query}"))
        .path_param("id", "42")
        .build()
}

#[test]
fn test_binds_path_optional_header_and_required_query() {
    let recorder = Recorder::<GetProduct>::default();
    let handler = Adapted::new(recorder.handler()).unwrap();

    handler.call(product_request("?q=x")).unwrap();

    assert_eq!(
        recorder.records(),
        vec![GetProduct {
            id: 42,
            brand: String::new(),
            q: "x".into(),
        }]
    );
}

#[test]
fn test_missing_required_query_skips_handler() {
    let recorder = Recorder::<GetProduct>::default();
    let handler = Adapted::new(recorder.handler()).unwrap();

    let err = handler.call(product_request("")).unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.message(), "required query parameter 'q' is empty");
    assert!(recorder.records().is_empty());
}

#[test]
fn test_schema_compiles_identically_twice() {
    let first = compile_record::<GetProduct>().unwrap();
    let second = HandlerSchema::<GetProduct>::compile().unwrap();
    assert_eq!(first, second);

    let recorder = Recorder::<GetProduct>::default();
    let adapted = Adapted::new(recorder.handler()).unwrap();
    assert_eq!(adapted.schema(), &first);
}

#[test]
fn test_schema_shape() {
    let schema = compile_record::<GetProduct>().unwrap();

    assert_eq!(schema.record_type(), "GetProduct");
    assert_eq!(schema.field_names(), ["id", "brand", "q"]);
    assert!(schema.body().is_none());
    assert!(schema.path_params()["id"].is_required());
    assert!(!schema.headers()["brand"].is_required());
    assert!(schema.query_params()["q"].is_required());
    assert_eq!(schema.bound_field_count(), 3);
}

#[test]
fn test_empty_path_value_fails() {
    let ctx = HttpContext::builder()
        .uri("/products/?q=x")
        .path_param("id", "")
        .build();

    let err = RequestBinder::<GetProduct>::compile()
        .unwrap()
        .bind(&ctx)
        .unwrap_err();

    assert_eq!(err.kind(), BindingErrorKind::MissingRequired);
    assert_eq!(err.binding_source(), Source::Path);
    assert_eq!(err.code(), ErrorCode::MissingRequiredParamError);
}

#[test]
fn test_json_body_default_header_and_context() {
    let recorder = Recorder::<CreateProduct>::default();
    let handler = Adapted::new(recorder.handler()).unwrap();

    let ctx = HttpContext::builder()
        .method(Method::POST)
        .body(r#"{"id":32,"name":"John Doe"}"#)
        .value("tenant", Tenant("acme".into()))
        .build();
    handler.call(ctx).unwrap();

    assert_eq!(
        recorder.records(),
        vec![CreateProduct {
            body: NewProduct {
                id: 32,
                name: "John Doe".into(),
            },
            page: 43,
            tenant: Tenant("acme".into()),
        }]
    );
}

#[test]
fn test_context_of_wrong_type_is_unexpected_error() {
    let recorder = Recorder::<CreateProduct>::default();
    let handler = Adapted::new(recorder.handler()).unwrap();

    let ctx = HttpContext::builder()
        .method(Method::POST)
        .body(r#"{"id":1,"name":"x"}"#)
        .value("tenant", "acme".to_string())
        .build();
    let err = handler.call(ctx).unwrap_err();

    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(recorder.records().is_empty());

    let ctx = HttpContext::builder()
        .body(r#"{"id":1,"name":"x"}"#)
        .value("tenant", 7_u32)
        .build();
    let result = RequestBinder::<CreateProduct>::compile().unwrap().bind(&ctx);
    assert_eq!(error_code(&result), ErrorCode::UnexpectedError);
}

#[test]
fn test_integer_width_is_exact() {
    let binder = RequestBinder::<Tiny>::compile().unwrap();

    let ctx = HttpContext::builder().uri("/?n=300").build();
    let err = binder.bind(&ctx).unwrap_err();
    assert_eq!(err.kind(), BindingErrorKind::InvalidValue);
    assert_eq!(err.raw_value(), Some("300"));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let ctx = HttpContext::builder().uri("/?n=-128&big=123").build();
    let tiny = binder.bind(&ctx).unwrap();
    assert_eq!(tiny.n, -128);
    assert_eq!(tiny.big, 123);
}

#[test]
fn test_body_limit_from_config() {
    let config = ConfigLoader::new()
        .with_string("[binding]\nmax_body_bytes = 16", "toml")
        .unwrap()
        .load()
        .unwrap();

    let recorder = Recorder::<CreateProduct>::default();
    let handler =
        Adapted::with_options(recorder.handler(), BindOptions::from(&config.binding)).unwrap();

    let ctx = HttpContext::builder()
        .body(r#"{"id":32,"name":"John Doe"}"#)
        .value("tenant", Tenant("acme".into()))
        .build();
    let err = handler.call(ctx).unwrap_err();

    assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(recorder.records().is_empty());
}

#[test]
fn test_handler_with_wrong_context_type_is_rejected() {
    fn takes_string(_ctx: String, _args: GetProduct) -> Result<(), HttpError> {
        Ok(())
    }

    let err = compile(&takes_string, &[TypeDescriptor::of::<HttpContext>()]).unwrap_err();
    assert!(matches!(err, SchemaError::LeadingParamMismatch { position: 0, .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_one_schema() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handler = Arc::new(
        Adapted::new(move |_ctx: HttpContext, args: GetProduct| {
            assert_eq!(args.q, format!("q{}", args.id));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap(),
    );

    let tasks: Vec<_> = (0..64_u64)
        .map(|id| {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let ctx = HttpContext::builder()
                    .uri(&format!("/products/{id}?q=q{id}"))
                    .path_param("id", &id.to_string())
                    .build();
                handler.call(ctx)
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 64);
}
