//! Relay target resolution.
//!
//! The scheme is inferred from the server base alone: loopback and
//! wildcard hosts get `http://`, everything else `https://`.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::{DemoError, DemoResult};

const LOCAL_TARGET_PATTERN: &str = r"^(?:localhost|127\.0\.0\.\d{1,3}|0\.0\.0\.0)(?::|/|$)";

fn local_target() -> &'static Regex {
    static LOCAL: OnceLock<Regex> = OnceLock::new();
    LOCAL.get_or_init(|| Regex::new(LOCAL_TARGET_PATTERN).expect("local target pattern is valid"))
}

/// True when `server_base` names a loopback or wildcard host.
pub fn is_local_target(server_base: &str) -> bool {
    local_target().is_match(server_base)
}

/// Build the absolute relay URL for `server_base` + `injection_path`.
pub fn resolve_target_url(server_base: &str, injection_path: &str) -> DemoResult<Url> {
    let base = server_base.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(DemoError::MismatchType(
            "relay server base must be a non-empty host[:port] string".to_string(),
        ));
    }

    if base.contains("://") {
        return Err(DemoError::MismatchType(format!(
            "relay server base '{}' must not carry a scheme; it is inferred from the host",
            base
        )));
    }

    let scheme = if is_local_target(base) { "http" } else { "https" };
    let raw = format!("{}://{}{}", scheme, base, injection_path);
    Url::parse(&raw).map_err(|e| {
        DemoError::MismatchType(format!("relay target '{}' is not a valid URL: {}", raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_targets_use_http() {
        for base in ["localhost:8000", "127.0.0.1:5000", "127.0.0.42", "0.0.0.0:80", "localhost"] {
            let url = resolve_target_url(base, "/event").unwrap();
            assert_eq!(url.scheme(), "http", "{base}");
            assert_eq!(url.path(), "/event");
        }
    }

    #[test]
    fn test_remote_targets_use_https() {
        let url = resolve_target_url("demo.example.org", "/event").unwrap();
        assert_eq!(url.as_str(), "https://demo.example.org/event");

        // Hostnames that merely start like a local one are remote.
        let url = resolve_target_url("localhost.example.org", "/event").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_full_url() {
        let url = resolve_target_url("localhost:8000", "/event").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/event");
    }

    #[test]
    fn test_invalid_bases() {
        assert!(matches!(
            resolve_target_url("  ", "/event"),
            Err(DemoError::MismatchType(_))
        ));
        assert!(matches!(
            resolve_target_url("bad host:port", "/event"),
            Err(DemoError::MismatchType(_))
        ));
    }

    #[test]
    fn test_base_with_scheme_is_rejected() {
        for base in ["http://localhost:8000", "https://demo.example.org"] {
            assert!(
                matches!(resolve_target_url(base, "/event"), Err(DemoError::MismatchType(_))),
                "{base}"
            );
        }
    }
}
