//! Request identification.
//!
//! # Design Decisions
//! - Request ID (UUID v4) set by tower-http as early as possible for tracing
//! - The same ID is echoed on the response

use axum::http::{HeaderMap, HeaderName};

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Read the request ID set by the request-id layer.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}
