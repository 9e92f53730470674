//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Health check
//!
//! # Auth
//! GET    /signup               - Sign-up page
//! POST   /signup               - Create account and sign in
//! GET    /signin               - Sign-in page
//! POST   /signin               - Sign in
//! POST   /signin/guest         - Enter as guest
//! POST   /signin/forgot        - Simulated password reset
//! POST   /logout               - End the session
//!
//! # Admin (requires admin)
//! GET    /admin                - Upload panel
//! GET    /admin/files          - Uploaded files (JSON)
//! POST   /admin/files          - Upload files (multipart)
//! DELETE /admin/files/{id}     - Remove an uploaded file
//!
//! # Chat (requires user or guest)
//! GET    /chat                 - Chat panel, starts a new conversation
//! GET    /chat/messages        - Conversation so far (JSON)
//! POST   /chat/messages        - Send a message (JSON)
//!
//! # Everything else
//! GET    /*                    - Static files from the public directory
//! ```

pub mod admin;
pub mod assets;
pub mod auth;
pub mod chat;

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Files allowed in a single upload request before the body limit applies.
const MAX_FILES_PER_REQUEST: u64 = 6;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/signin", get(auth::signin_page).post(auth::signin))
        .route("/signin/guest", post(auth::guest))
        .route("/signin/forgot", post(auth::forgot_password))
        .route("/logout", post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin::index))
        .route(
            "/admin/files",
            get(admin::list_files)
                .post(admin::upload_files)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/admin/files/{id}", delete(admin::delete_file))
}

/// Create the chat routes router.
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", get(chat::index))
        .route(
            "/chat/messages",
            get(chat::messages).post(chat::send_message),
        )
}

/// Create all routes, with the static host as fallback.
pub fn routes(state: &AppState) -> Router<AppState> {
    let body_limit = usize::try_from(
        state
            .config()
            .max_upload_bytes
            .saturating_mul(MAX_FILES_PER_REQUEST),
    )
    .unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(admin_routes(body_limit))
        .merge(chat_routes())
        .fallback(assets::serve)
}

/// Build the complete application: routes, sessions, tracing and Sentry.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes(&state)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
