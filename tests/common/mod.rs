//! Common test utilities

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::util::ServiceExt;

use nutrition_coach::api::{self, AppState};
use nutrition_coach::auth::PasswordHasher;

/// In-memory application state with a cheap password hasher
pub fn test_state() -> AppState {
    AppState::in_memory(chrono::Duration::minutes(30), PasswordHasher::new(64, 1))
}

/// The full `/api` router over in-memory stores
pub fn test_app() -> Router {
    api::create_router(test_state())
}

/// Send one request and decode the JSON response body (`Null` when empty)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}

/// Sign up `username` with `profile` fields merged into the body, then log in
pub async fn signup_and_login(app: &Router, username: &str, profile: Value) -> String {
    let mut body = json!({ "username": username, "password": "secret1" });
    if let (Some(body), Some(profile)) = (body.as_object_mut(), profile.as_object()) {
        body.extend(profile.clone());
    }

    let (status, _) = send(app, "POST", "/api/user/signup", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "signup failed for {}", username);

    let (status, token) = send(
        app,
        "POST",
        "/api/user/login",
        None,
        Some(json!({ "username": username, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {}", username);

    token["access_token"].as_str().unwrap().to_string()
}

/// Connect to the test database, or `None` when DATABASE_URL is not set
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    nutrition_coach::db::run_migrations(&pool)
        .await
        .expect("Failed to apply schema");

    Some(pool)
}

/// A username no other test run will use
pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
