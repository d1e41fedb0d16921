//! Inbound API key authentication.
//!
//! Callers identify themselves with a shared secret carried in the
//! `proxy_key` query parameter or the `x-proxy-key` header; the first one
//! present wins. This stage runs before everything else in the pipeline, so
//! a rejected request never reaches the rate limiter or the upstream.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use url::form_urlencoded;

use crate::error::ProxyError;
use crate::observability::metrics;

/// Query parameter carrying the inbound credential.
pub const PROXY_KEY_PARAM: &str = "proxy_key";
/// Header carrying the inbound credential.
pub const PROXY_KEY_HEADER: &str = "x-proxy-key";

/// State required by the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// Configured inbound secret, compared for exact equality.
    pub proxy_api_key: String,
}

/// Pull the caller-supplied credential out of a request.
///
/// The query parameter takes precedence over the header, even when both are
/// present and the query value is wrong. An empty query value counts as
/// absent and falls through to the header.
pub fn extract_credential(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    if let Some(query) = uri.query() {
        if let Some((_, value)) = form_urlencoded::parse(query.as_bytes())
            .find(|(key, value)| key == PROXY_KEY_PARAM && !value.is_empty())
        {
            return Some(value.into_owned());
        }
    }
    headers
        .get(PROXY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Check the caller-supplied credential against the configured secret.
pub fn authenticate(uri: &Uri, headers: &HeaderMap, expected: &str) -> Result<(), ProxyError> {
    match extract_credential(uri, headers) {
        Some(supplied) if supplied == expected => Ok(()),
        _ => Err(ProxyError::Unauthorized),
    }
}

/// Middleware enforcing the inbound credential on the proxied subtree.
pub async fn require_api_key(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    match authenticate(request.uri(), request.headers(), &state.proxy_api_key) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            tracing::warn!(
                path = %request.uri().path(),
                "Rejected request with missing or invalid API key"
            );
            metrics::record_unauthorized();
            err.into_response()
        }
    }
}
