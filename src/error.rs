//! Error taxonomy shared by extraction, caching and dispatch.
//!
//! Every variant carries a numeric code so handlers and the relay front-end
//! can tell failure families apart without parsing messages:
//!
//! ```text
//! 1xx  shape / type mismatches
//! 2xx  session cache I/O and parsing
//! 3xx  request input handling
//! 4xx  outbound relay failures
//! 5xx  configuration / startup
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Errors produced by the demo pipeline.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Input had the wrong shape or type.
    #[error("[100] => {0}")]
    MismatchType(String),

    /// Creating or writing cache files failed.
    #[error("[200] => {0}")]
    FileHandling(String),

    /// No cache directory or cache file exists where one was expected.
    #[error("[201] => {0}")]
    InvalidCachePath(String),

    /// Cache content could not be parsed back.
    #[error("[202] => {0}")]
    MalformedCache(String),

    /// The request body or a requested mode could not be handled.
    #[error("[300] => {0}")]
    InputHandler(String),

    /// Required indexed fields are missing from the request.
    #[error("[301] => {0}")]
    InvalidRequestParameter(String),

    /// Uploaded bytes could not be decoded as an image.
    #[error("[302] => {0}")]
    ImageDecode(String),

    /// Relay failed with a transport error or an unmapped status.
    #[error("[400] => {0}")]
    Requester(String),

    /// Relay answered 400.
    #[error("[401] => {0}")]
    BadRequest(String),

    /// Relay answered 404.
    #[error("[402] => {0}")]
    NotFound(String),

    /// Relay answered 500.
    #[error("[403] => {0}")]
    InternalServerError(String),

    /// Deployment token is malformed.
    #[error("[500] => {0}")]
    InvalidToken(String),

    /// Server could not start.
    #[error("[501] => {0}")]
    Server(String),
}

/// Result type for demo pipeline operations.
pub type DemoResult<T> = Result<T, DemoError>;

impl DemoError {
    /// Numeric code for this error family.
    pub fn code(&self) -> u16 {
        match self {
            DemoError::MismatchType(_) => 100,
            DemoError::FileHandling(_) => 200,
            DemoError::InvalidCachePath(_) => 201,
            DemoError::MalformedCache(_) => 202,
            DemoError::InputHandler(_) => 300,
            DemoError::InvalidRequestParameter(_) => 301,
            DemoError::ImageDecode(_) => 302,
            DemoError::Requester(_) => 400,
            DemoError::BadRequest(_) => 401,
            DemoError::NotFound(_) => 402,
            DemoError::InternalServerError(_) => 403,
            DemoError::InvalidToken(_) => 500,
            DemoError::Server(_) => 501,
        }
    }

    /// HTTP status used when the error escapes a handler.
    pub fn status(&self) -> StatusCode {
        match self.code() {
            100..=199 | 300..=399 => StatusCode::BAD_REQUEST,
            400..=499 => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures of the outbound relay call.
    pub fn is_relay_error(&self) -> bool {
        (400..500).contains(&self.code())
    }
}

impl IntoResponse for DemoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "Request rejected");
        }
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DemoError::NotFound("socket gone".into());
        assert_eq!(err.to_string(), "[402] => socket gone");
        assert_eq!(err.code(), 402);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(DemoError::MismatchType("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            DemoError::InvalidRequestParameter("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(DemoError::Requester("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            DemoError::MalformedCache("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(DemoError::InternalServerError("x".into()).is_relay_error());
        assert!(!DemoError::InvalidToken("x".into()).is_relay_error());
    }
}
