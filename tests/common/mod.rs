//! Test helpers for web API tests.
//!
//! Builds the API router on top of an in-memory backend and drives the
//! email OTP flow.

#![allow(dead_code)]

use axum::http::header::SET_COOKIE;
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use std::sync::Arc;

use storeit::backend::MemoryBackend;
use storeit::config::{BackendConfig, Config};
use storeit::web::{create_router, AppState};

/// A test server together with the backend it talks to.
pub struct TestApp {
    pub server: TestServer,
    pub backend: MemoryBackend,
    pub config: Config,
}

/// Create a test configuration.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.backend = BackendConfig::memory();
    config.web.secure_cookies = false;
    config.web.max_upload_size_mb = 1;
    config
}

/// Create a test server with an empty in-memory backend.
pub fn create_test_app() -> TestApp {
    let config = create_test_config();
    let backend = MemoryBackend::with_config(&config.backend);
    let app_state = Arc::new(AppState::new(Arc::new(backend.clone()), &config));
    let router = create_router(app_state, &config.web);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        backend,
        config,
    }
}

/// Cookie header carrying a session secret.
pub fn session_cookie(secret: &str) -> String {
    format!("appwrite-session={}", secret)
}

/// Value of the session cookie set by a response.
pub fn session_from_response(response: &TestResponse) -> String {
    let header = response.header(SET_COOKIE);
    let header = header.to_str().expect("Set-Cookie is not ASCII");
    let pair = header.split(';').next().unwrap_or_default();
    pair.strip_prefix("appwrite-session=")
        .expect("Set-Cookie is not the session cookie")
        .to_string()
}

/// Sign up and return the account id.
pub async fn sign_up(app: &TestApp, full_name: &str, email: &str) -> String {
    let response = app
        .server
        .post("/api/auth/sign-up")
        .json(&json!({ "fullName": full_name, "email": email }))
        .await;
    response.assert_status_ok();
    assert!(
        response.headers().get(SET_COOKIE).is_none(),
        "sign-up must not start a session"
    );

    let body: Value = response.json();
    body["data"]["accountId"].as_str().unwrap().to_string()
}

/// Verify the last emailed OTP and return the session secret.
pub async fn verify(app: &TestApp, account_id: &str, email: &str) -> String {
    let otp = app.backend.last_otp(email).await.expect("No OTP was sent");
    let response = app
        .server
        .post("/api/auth/verify")
        .json(&json!({ "accountId": account_id, "password": otp }))
        .await;
    response.assert_status_ok();

    session_from_response(&response)
}

/// Sign up a new user and return the session secret.
pub async fn sign_up_and_verify(app: &TestApp, full_name: &str, email: &str) -> String {
    let account_id = sign_up(app, full_name, email).await;
    verify(app, &account_id, email).await
}
