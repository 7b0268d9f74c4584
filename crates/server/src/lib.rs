//! Shopkart server library.
//!
//! The REST backend as a library, so the binary, the router tests and the
//! integration tests all build the same application.
//!
//! - [`services::auth`] - Password verifier, session issuer, login protocol
//! - [`middleware::auth`] - Authorization gate
//! - [`db`] - Credential store and wishlist persistence behind traits

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::db::Store;
use crate::error::AppError;
use crate::middleware::{RateLimiterLayer, request_id_middleware};
use crate::state::AppState;

/// Build the complete application.
///
/// `login_limiter` is `None` in tests, which drive the router without a
/// socket peer for the limiter to key on.
pub fn app<S: Store>(state: AppState<S>, login_limiter: Option<RateLimiterLayer>) -> Router {
    let cors = cors_layer(state.config().client_origin.as_deref());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness::<S>))
        .merge(routes::routes(login_limiter))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                        span.record("latency_ms", latency_ms);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS for the browser client. Without a configured origin nothing is allowed.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::new();
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring invalid client origin");
            CorsLayer::new()
        }
    }
}

/// Unknown paths get the same JSON error shape as every other failure.
async fn not_found() -> AppError {
    AppError::NotFound("Route")
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness<S: Store>(State(state): State<AppState<S>>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{LoginErrorDetail, ServerConfig};
    use crate::db::memory::MemoryStore;
    use crate::middleware::REQUEST_ID_HEADER;

    fn state(client_origin: Option<&str>) -> AppState<MemoryStore> {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            session_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"),
            client_origin: client_origin.map(str::to_string),
            login_errors: LoginErrorDetail::Detailed,
            log_json: false,
            trusted_proxy: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        AppState::new(config, MemoryStore::new()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for uri in ["/health", "/health/ready"] {
            let response = app(state(None), None)
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = app(state(None), None)
            .oneshot(Request::builder().uri("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: shopkart_core::ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error_type, shopkart_core::ErrorType::NotFound);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let response = app(state(Some("http://localhost:3000")), None)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
    }
}
