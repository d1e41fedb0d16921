//! Request-terminal error taxonomy.
//!
//! Every variant ends the current request; there are no retries anywhere in
//! the pipeline. Auth and rate-limit failures carry caller-facing JSON
//! envelopes; upstream connection failures map to an explicit 502 instead of
//! falling through to a framework default.

use axum::http::uri::InvalidUri;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors produced by the forwarding pipeline.
///
/// Non-2xx upstream statuses are not errors; they are relayed verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The caller supplied no inbound credential, or a wrong one.
    #[error("Unauthorized: Invalid API key")]
    Unauthorized,

    /// The process-wide request window is exhausted.
    #[error("Rate limit exceeded, try again later")]
    RateLimited,

    /// The rewritten target did not form a valid URI.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(#[source] InvalidUri),

    /// The outbound request could not be assembled.
    #[error("failed to assemble upstream request: {0}")]
    AssembleRequest(#[source] axum::http::Error),

    /// Connection-level failure talking to the upstream.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] hyper_util::client::legacy::Error),

    /// The upstream response body could not be read to completion.
    #[error("failed to read upstream response: {0}")]
    UpstreamBody(#[source] axum::Error),
}

impl ProxyError {
    /// Status code returned to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::InvalidTarget(_)
            | ProxyError::AssembleRequest(_)
            | ProxyError::Upstream(_)
            | ProxyError::UpstreamBody(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
