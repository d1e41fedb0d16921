//! Process-wide fixed-window rate limiting.
//!
//! One counter covers every authenticated caller; there is no per-caller
//! key. The counter and its window-start timestamp live behind a mutex so
//! concurrent requests never lose increments.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::RateLimitConfig;
use crate::error::ProxyError;
use crate::observability::metrics;

struct Window {
    count: u64,
    started: Instant,
}

/// Fixed-window request counter shared by the whole process.
pub struct RateLimiter {
    window: Duration,
    max_requests: u64,
    state: Mutex<Window>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_millis(config.window_ms),
            max_requests: config.max_requests,
            state: Mutex::new(Window {
                count: 0,
                started: Instant::now(),
            }),
        }
    }

    /// Count one request and decide whether it may proceed.
    ///
    /// The window resets lazily once it has fully elapsed; the request that
    /// pushes the count past `max_requests` is the first one rejected.
    pub fn check(&self) -> Result<(), ProxyError> {
        self.check_at(Instant::now())
    }

    fn check_at(&self, now: Instant) -> Result<(), ProxyError> {
        let mut window = self.state.lock().expect("rate limiter mutex poisoned");
        if now.duration_since(window.started) >= self.window {
            window.count = 0;
            window.started = now;
        }
        window.count += 1;
        if window.count > self.max_requests {
            Err(ProxyError::RateLimited)
        } else {
            Ok(())
        }
    }
}

/// Middleware enforcing the request window on the proxied subtree.
///
/// Runs only after successful authentication, so unauthenticated traffic
/// never consumes the window.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    match limiter.check() {
        Ok(()) => next.run(request).await,
        Err(err) => {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            metrics::record_rate_limited();
            err.into_response()
        }
    }
}
