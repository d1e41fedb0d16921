//! HTTP surface of the proxy.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → server.rs (router, middleware)
//!     → security (auth, rate limit)
//!     → rewrite.rs (path/query/header/body rewriting)
//!     → upstream (single forwarding call)
//!     → relayed response to the caller
//! ```

pub mod request;
pub mod rewrite;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
