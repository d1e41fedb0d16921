//! Request identity for tracing.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for requests arriving without one
//! - Propagate the ID back to the caller via `x-request-id`
//!
//! # Design Decisions
//! - The ID is added as early as possible so every log line can carry it

use axum::http::Request;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID.
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}
