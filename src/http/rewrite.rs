//! Outbound request rewriting.
//!
//! # Responsibilities
//! - Strip the public `/api` prefix from the path
//! - Swap the inbound credential for the upstream credential in the query
//! - Drop connection-specific and credential headers
//! - Re-encode JSON bodies per HTTP method semantics
//!
//! # Design Decisions
//! - Query parsing is best-effort: malformed pairs pass through as literals
//! - `content-length` is always dropped; the transport recomputes it from
//!   the re-encoded body
//! - Bodied requests forward the original `content-type`; bodiless requests
//!   carry neither `content-type` nor `content-length`

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Method, Request, Uri};
use bytes::Bytes;
use url::form_urlencoded;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;
use crate::security::auth::{PROXY_KEY_HEADER, PROXY_KEY_PARAM};

/// Public path prefix served by the proxy.
pub const API_PREFIX: &str = "/api";
/// Query parameter carrying the upstream credential.
pub const API_KEY_PARAM: &str = "api_key";

/// Compute the upstream path from the inbound one.
pub fn upstream_path(inbound: &str) -> &str {
    let stripped = inbound.strip_prefix(API_PREFIX).unwrap_or(inbound);
    if stripped.is_empty() {
        "/"
    } else {
        stripped
    }
}

/// Rebuild the query string for the upstream.
///
/// Every `proxy_key` pair is dropped, any caller-supplied `api_key` pair is
/// discarded, and the configured upstream credential is appended last. The
/// result is never empty.
pub fn upstream_query(inbound: Option<&str>, upstream_key: &str) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(raw) = inbound {
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if key == PROXY_KEY_PARAM || key == API_KEY_PARAM {
                continue;
            }
            query.append_pair(&key, &value);
        }
    }
    query.append_pair(API_KEY_PARAM, upstream_key);
    query.finish()
}

/// Copy inbound headers, dropping the ones that must never reach upstream.
///
/// `host` and `connection` are connection-specific; the credential headers
/// would leak the inbound secret. Without an effective body the content
/// headers go too.
pub fn sanitize_headers(inbound: &HeaderMap, has_body: bool) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);
    headers.remove(header::CONNECTION);
    headers.remove(PROXY_KEY_HEADER);
    headers.remove(PROXY_KEY_PARAM);
    // The body is re-encoded, so a stale length must never survive.
    headers.remove(header::CONTENT_LENGTH);
    if !has_body {
        headers.remove(header::CONTENT_TYPE);
    }
    headers
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Re-encode the inbound body for forwarding.
///
/// Returns `Some` only for POST/PUT/PATCH whose bytes parse as a JSON object
/// or array with at least one member; everything else (other methods, empty
/// or unparsable payloads, scalars, `{}`, `[]`) forwards an empty body.
pub fn upstream_body(method: &Method, inbound: &Bytes) -> Option<Bytes> {
    if !carries_body(method) || inbound.is_empty() {
        return None;
    }
    let value: serde_json::Value = serde_json::from_slice(inbound).ok()?;
    let non_empty = match &value {
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        _ => false,
    };
    if !non_empty {
        return None;
    }
    let encoded = serde_json::to_vec(&value).ok()?;
    Some(Bytes::from(encoded))
}

/// Assemble the complete outbound request for the configured upstream.
pub fn build_upstream_request(
    upstream: &UpstreamConfig,
    parts: &Parts,
    inbound_body: &Bytes,
) -> Result<Request<Body>, ProxyError> {
    let body = upstream_body(&parts.method, inbound_body);
    let path = upstream_path(parts.uri.path());
    let query = upstream_query(parts.uri.query(), &upstream.api_key);
    let target: Uri = format!("{}{}?{}", upstream.base_url, path, query)
        .parse()
        .map_err(ProxyError::InvalidTarget)?;

    let mut builder = Request::builder().method(parts.method.clone()).uri(target);
    if let Some(headers) = builder.headers_mut() {
        *headers = sanitize_headers(&parts.headers, body.is_some());
    }
    builder
        .body(match body {
            Some(bytes) => Body::from(bytes),
            None => Body::empty(),
        })
        .map_err(ProxyError::AssembleRequest)
}
