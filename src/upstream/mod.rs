//! Upstream dispatch and response relay.
//!
//! # Responsibilities
//! - Own the HTTP client for the single configured upstream
//! - Issue exactly one call per inbound request and buffer the full response
//! - Relay status and raw body bytes back unmodified
//!
//! # Design Decisions
//! - Non-2xx upstream statuses are relayed as-is, never wrapped
//! - Connection-level failures surface as explicit `ProxyError` values and
//!   never rely on a framework default error path
//! - Hop-by-hop response headers are stripped; everything else passes through

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request, StatusCode};
use bytes::Bytes;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::error::ProxyError;

/// HTTP client for the single configured upstream.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

/// Fully buffered upstream response.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamClient {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpsConnector::new());
        Self { client }
    }

    /// Issue one call upstream and wait for the complete response.
    pub async fn forward(&self, request: Request<Body>) -> Result<UpstreamResponse, ProxyError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(ProxyError::Upstream)?;
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), usize::MAX)
            .await
            .map_err(ProxyError::UpstreamBody)?;
        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    // content-length is recomputed from the buffered body.
    *name == header::CONNECTION
        || *name == header::TRANSFER_ENCODING
        || *name == header::CONTENT_LENGTH
}

/// Write the upstream response back to the caller unmodified.
pub fn relay(upstream: UpstreamResponse) -> axum::response::Response {
    let mut response = axum::response::Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    let headers = response.headers_mut();
    for (name, value) in upstream.headers.iter() {
        if is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    response
}
