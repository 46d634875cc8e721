//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    file_action, get_usage, list_files, me, sign_in, sign_out, sign_up, upload_files, verify_otp,
    AppState,
};
use super::middleware::create_cors_layer;
use crate::config::WebConfig;

/// Files accepted in a single upload request.
const MAX_FILES_PER_REQUEST: u64 = 10;

/// Headroom for multipart boundaries and form fields.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Request body limit for the upload route.
fn upload_body_limit(config: &WebConfig) -> usize {
    let bytes = config
        .max_upload_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
        .saturating_mul(MAX_FILES_PER_REQUEST);
    usize::try_from(bytes).unwrap_or(usize::MAX)
}

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, config: &WebConfig) -> Router {
    let auth_routes = Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/verify", post(verify_otp))
        .route("/sign-out", post(sign_out))
        .route("/me", get(me));

    let file_routes = Router::new()
        .route(
            "/",
            get(list_files)
                .post(upload_files)
                .layer(DefaultBodyLimit::max(upload_body_limit(config))),
        )
        .route("/:id/actions", post(file_action));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/files", file_routes)
        .route("/usage", get(get_usage));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                )),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
