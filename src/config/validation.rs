//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, parseable addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DemoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::DemoConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be > 0"));
    }

    if config.relay.server_base.trim().is_empty() {
        errors.push(ValidationError::new("relay.server_base", "must not be empty"));
    }
    if !config.relay.injection_path.starts_with('/') {
        errors.push(ValidationError::new(
            "relay.injection_path",
            "must start with '/'",
        ));
    }
    if config.relay.timeout_secs == 0 {
        errors.push(ValidationError::new("relay.timeout_secs", "must be > 0"));
    }

    if config.cache.root.trim().is_empty() {
        errors.push(ValidationError::new("cache.root", "must not be empty"));
    }

    if config.extraction.max_indexed_fields == 0 {
        errors.push(ValidationError::new(
            "extraction.max_indexed_fields",
            "must be > 0",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DemoConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DemoConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.relay.injection_path = "event".into();
        config.extraction.max_indexed_fields = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "relay.injection_path",
                "extraction.max_indexed_fields"
            ]
        );
    }
}
