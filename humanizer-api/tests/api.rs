use humanizer_api::auth::{Keys, KEY_VALID_DURATION};
use humanizer_api::config::{Config, DEFAULT_JWT_SECRET};
use humanizer_api::llm::MockBackend;
use humanizer_api::{routes, InnerAppState, SharedAppState};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(backend: Arc<MockBackend>) -> Router {
    let config = Config::default();
    routes::router(SharedAppState::from(InnerAppState::new(&config, backend)))
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn signup(app: &Router) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/auth/signup",
            json!({ "email": "a@b.com", "password": "x" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn signup_issues_token_for_email() {
    let app = app(Arc::new(MockBackend::echo()));
    let token = signup(&app).await;

    let claims = Keys::new(DEFAULT_JWT_SECRET.as_bytes()).verify(&token).unwrap();
    assert_eq!(claims.email, "a@b.com");

    let now = Utc::now().timestamp() as usize;
    let expected = now + KEY_VALID_DURATION as usize;
    assert!(claims.exp <= expected && claims.exp + 5 >= expected);
}

#[tokio::test]
async fn login_behaves_like_signup() {
    let app = app(Arc::new(MockBackend::echo()));
    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            json!({ "email": "someone@else.org", "password": "anything" }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    let claims = Keys::new(DEFAULT_JWT_SECRET.as_bytes()).verify(token).unwrap();
    assert_eq!(claims.email, "someone@else.org");
}

#[tokio::test]
async fn missing_credentials_are_rejected() {
    let app = app(Arc::new(MockBackend::echo()));
    let bodies = [
        json!({ "email": "a@b.com" }),
        json!({ "password": "x" }),
        json!({ "email": "", "password": "x" }),
        json!({}),
        json!("not an object"),
    ];

    for uri in ["/auth/signup", "/auth/login"] {
        for body in bodies.iter() {
            let (status, rsp) = send(&app, post_json(uri, body.clone(), None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {body}");
            assert_eq!(rsp, json!({ "error": "Email and password are required." }));
        }
    }
}

#[tokio::test]
async fn humanize_requires_token() {
    let backend = Arc::new(MockBackend::echo());
    let app = app(backend.clone());

    let (status, body) = send(
        &app,
        post_json("/humanize", json!({ "text": "short test" }), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Access denied. No token provided." }));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn bearer_without_token_is_unauthorized() {
    let backend = Arc::new(MockBackend::echo());
    let app = app(backend.clone());

    for value in ["Bearer", "Bearer "] {
        let request = Request::post("/humanize")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, value)
            .body(Body::from(json!({ "text": "short test" }).to_string()))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{value:?}");
        assert_eq!(body, json!({ "error": "Access denied. No token provided." }));
    }
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn humanize_rejects_bad_tokens() {
    let backend = Arc::new(MockBackend::echo());
    let app = app(backend.clone());

    let expired = Keys::new(DEFAULT_JWT_SECRET.as_bytes())
        .generate_jwt_at("a@b.com", Utc::now() - chrono::Duration::hours(2))
        .unwrap();
    let foreign = Keys::new(b"some other secret")
        .generate_jwt("a@b.com")
        .unwrap();

    for token in [expired.as_str(), foreign.as_str(), "garbage"] {
        let (status, body) = send(
            &app,
            post_json("/humanize", json!({ "text": "short test" }), Some(token)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Invalid token." }));
    }

    let request = Request::post("/humanize")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Basic YTpi")
        .body(Body::from(json!({ "text": "short test" }).to_string()))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn humanize_requires_text() {
    let backend = Arc::new(MockBackend::echo());
    let app = app(backend.clone());
    let token = signup(&app).await;

    for body in [json!({}), json!({ "text": "" }), json!({ "text": 42 })] {
        let (status, rsp) = send(&app, post_json("/humanize", body, Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(rsp, json!({ "error": "Invalid input: text is required." }));
    }
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn temperature_may_be_numeric_string() {
    let backend = Arc::new(MockBackend::echo().recording());
    let app = app(backend.clone());
    let token = signup(&app).await;

    let (status, _) = send(
        &app,
        post_json(
            "/humanize",
            json!({ "text": "short test", "temperature": "0.8" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.requests()[0].temperature, Some(0.8));

    let (status, body) = send(
        &app,
        post_json(
            "/humanize",
            json!({ "text": "short test", "temperature": "warm" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Invalid input: temperature must be a number." })
    );
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn signup_then_humanize_short_text() {
    let backend = Arc::new(MockBackend::echo());
    let app = app(backend.clone());
    let token = signup(&app).await;

    let (status, body) = send(
        &app,
        post_json("/humanize", json!({ "text": "short test" }), Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let text = body["humanizedText"].as_str().unwrap();
    assert!(!text.is_empty());
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn long_text_gets_second_pass() {
    let backend = Arc::new(
        MockBackend::echo()
            .recording()
            .with_response("first pass output"),
    );
    let app = app(backend.clone());
    let token = signup(&app).await;

    let text = "A sentence that keeps going. ".repeat(50);
    assert!(text.chars().count() > 1000);

    let (status, body) = send(
        &app,
        post_json(
            "/humanize",
            json!({ "text": text, "temperature": 0.7, "model": "gpt-4o" }),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["humanizedText"].as_str().is_some());
    assert_eq!(backend.call_count(), 2);

    let requests = backend.requests();
    assert_eq!(requests[1].model, "gpt-4o");
    assert!(requests[1]
        .last_user_message()
        .unwrap()
        .ends_with("\n\nfirst pass output"));
}

#[tokio::test]
async fn upstream_failure_reports_details() {
    let backend = Arc::new(MockBackend::echo().with_failure("provider down"));
    let app = app(backend.clone());
    let token = signup(&app).await;

    let (status, body) = send(
        &app,
        post_json("/humanize", json!({ "text": "short test" }), Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "error": "Failed to humanize text using AI.",
            "details": "Backend unavailable: provider down"
        })
    );
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app(Arc::new(MockBackend::echo()));
    let request = Request::post("/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::from(
            json!({ "email": "a@b.com", "password": "x" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
