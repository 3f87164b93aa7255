//! Nikola admin library.
//!
//! Back office for the Nikola shop: products, orders, categories, users,
//! support messages, promo codes and holiday mode. Every record lives in
//! the REST backend; admins sign in with a backend account holding the
//! admin role.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{Router, extract::State, http::StatusCode, middleware as axum_middleware, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionManagerLayer;
use tracing::Span;

use crate::middleware::{AdminSessionStore, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Build the admin application.
pub fn app(state: AppState, session_layer: SessionManagerLayer<AdminSessionStore>) -> Router {
    let static_dir = state.config().static_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
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
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend cannot be reached.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.backend().holiday_status().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Backend not reachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
