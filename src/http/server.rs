//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router (liveness endpoint + proxied `/api` subtree)
//! - Wire up middleware (CORS, request ID, tracing, body limits)
//! - Run the per-request forwarding pipeline
//! - Bind the server and drain gracefully on shutdown
//!
//! Pipeline order per request: authentication → rate limiting → rewriting →
//! one upstream call → relay. Auth and rate limiting are middleware on the
//! `/api` subtree only; the liveness endpoint is open.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::http::rewrite::build_upstream_request;
use crate::observability::metrics;
use crate::security::auth::{require_api_key, AuthState};
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::upstream::{relay, UpstreamClient, UpstreamResponse};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub client: UpstreamClient,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            client: UpstreamClient::new(),
        };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let auth = AuthState {
            proxy_api_key: config.auth.proxy_api_key.clone(),
        };

        // Layers added later wrap the earlier ones, so the rate limiter is
        // added first and auth second: auth runs first at request time and a
        // rejected caller never consumes the window.
        let mut api = Router::new()
            .route("/api", any(proxy_handler))
            .route("/api/{*path}", any(proxy_handler));
        if config.rate_limit.enabled {
            let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
            api = api.layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ));
        }
        let api = api
            .layer(middleware::from_fn_with_state(auth, require_api_key))
            .with_state(state);

        let mut router = Router::new()
            .route("/", get(health_handler))
            .merge(api)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .layer(DefaultBodyLimit::max(config.security.max_body_size)),
            );
        if let Some(secs) = config.timeouts.request_secs {
            router = router.layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(secs),
            ));
        }
        router
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Liveness probe. No auth, no rate limiting.
async fn health_handler() -> &'static str {
    "smartvend proxy is up"
}

/// Forwarding pipeline for authenticated, rate-limited requests.
async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.config.security.max_body_size).await {
        Ok(bytes) => bytes,
        Err(_) => {
            metrics::record_request(&method, 400, start);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Failed to read request body" })),
            )
                .into_response();
        }
    };

    match forward(&state, &parts, &body).await {
        Ok(upstream) => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %upstream.status,
                "Relaying upstream response"
            );
            metrics::record_request(&method, upstream.status.as_u16(), start);
            relay(upstream)
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %err,
                "Upstream call failed"
            );
            metrics::record_request(&method, err.status().as_u16(), start);
            err.into_response()
        }
    }
}

/// Issue exactly one upstream call for this request. No retries.
async fn forward(
    state: &AppState,
    parts: &Parts,
    body: &Bytes,
) -> Result<UpstreamResponse, ProxyError> {
    let outbound = build_upstream_request(&state.config.upstream, parts, body)?;
    tracing::debug!(method = %outbound.method(), path = %outbound.uri().path(), "Proxying to upstream");
    state.client.forward(outbound).await
}
