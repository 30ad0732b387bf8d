use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    middleware::from_fn,
    routing::get,
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value as JsonValue;
use tower::ServiceExt;
use uuid::Uuid;

use hirehero_backend::middleware::auth::{require_bearer_auth, Claims};
use hirehero_backend::routes::health::health;

fn init_test_config() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://localhost/hirehero_test");
    env::set_var("JWT_SECRET", "test_secret_key");
    // Multiple tests share the process-wide config.
    let _ = hirehero_backend::config::init_config();
}

fn app() -> Router {
    Router::new().route("/health", get(health)).route(
        "/guarded",
        get(|| async { "ok" }).layer(from_fn(require_bearer_auth)),
    )
}

fn mint_token(secret: &str, expires_in_secs: i64) -> String {
    let exp = (chrono::Utc::now().timestamp() + expires_in_secs) as usize;
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp,
        role: Some("hr".to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode token")
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    init_test_config();

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn guarded_route_rejects_missing_authorization() {
    init_test_config();

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/guarded")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "missing_authorization");
}

#[tokio::test]
async fn guarded_route_rejects_non_bearer_scheme() {
    init_test_config();

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/guarded")
                .header(header::AUTHORIZATION, "Basic abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "unsupported_scheme");
}

#[tokio::test]
async fn guarded_route_accepts_valid_token() {
    init_test_config();
    let token = mint_token("test_secret_key", 3600);

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/guarded")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn guarded_route_rejects_expired_token() {
    init_test_config();
    let token = mint_token("test_secret_key", -3600);

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/guarded")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "invalid_token");
}

#[tokio::test]
async fn guarded_route_rejects_token_signed_with_other_secret() {
    init_test_config();
    let token = mint_token("some_other_secret", 3600);

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/guarded")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
