//! Indexed field scanning.
//!
//! Ordered lists travel in flat form bodies as `{prefix}-0`, `{prefix}-1`, ...
//! The scan walks indices upward and stops at the first key whose lookup
//! yields nothing, so a gap truncates the list. It is also bounded by a
//! configured maximum: a list longer than that is rejected, never cut short.

use crate::error::{DemoError, DemoResult};

/// Field prefix for text inputs.
pub const TEXT_FIELD_PREFIX: &str = "input-text";

/// Field prefix for image uploads.
pub const IMAGE_FIELD_PREFIX: &str = "input-image";

/// Field carrying the optional relay socket identifier.
pub const SOCKET_ID_FIELD: &str = "socket-id";

/// Format the key for `index` under `prefix`.
pub fn indexed_key(prefix: &str, index: usize) -> String {
    format!("{}-{}", prefix, index)
}

/// Walks contiguous indexed keys.
#[derive(Debug, Clone, Copy)]
pub struct FieldScanner {
    max_fields: usize,
}

impl FieldScanner {
    pub fn new(max_fields: usize) -> Self {
        Self { max_fields }
    }

    pub fn max_fields(&self) -> usize {
        self.max_fields
    }

    /// Collect values for `{prefix}-0..` until `lookup` returns `None`.
    ///
    /// `lookup` decides what counts as absent (missing, empty, unusable).
    /// An empty result is left for the caller to judge. Fails with
    /// `InvalidRequestParameter` when the list runs past `max_fields`.
    pub fn scan<T, F>(&self, prefix: &str, mut lookup: F) -> DemoResult<Vec<T>>
    where
        F: FnMut(&str) -> Option<T>,
    {
        let mut values = Vec::new();
        for index in 0..self.max_fields {
            match lookup(&indexed_key(prefix, index)) {
                Some(value) => values.push(value),
                None => return Ok(values),
            }
        }

        let next = indexed_key(prefix, self.max_fields);
        if lookup(&next).is_some() {
            tracing::warn!(
                prefix = %prefix,
                limit = self.max_fields,
                "Indexed field scan exceeded its limit"
            );
            return Err(DemoError::InvalidRequestParameter(format!(
                "Too many '{}-{{i}}' fields: at most {} are accepted",
                prefix, self.max_fields
            )));
        }
        Ok(values)
    }
}

impl Default for FieldScanner {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_scan_contiguous() {
        let map = source(&[("f-0", "a"), ("f-1", "b"), ("f-2", "c")]);
        let values = FieldScanner::default().scan("f", |k| map.get(k).cloned()).unwrap();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_gap_truncates() {
        let map = source(&[("f-0", "a"), ("f-2", "c"), ("f-3", "d")]);
        let values = FieldScanner::default().scan("f", |k| map.get(k).cloned()).unwrap();
        assert_eq!(values, vec!["a"]);
    }

    #[test]
    fn test_missing_first_index_is_empty() {
        let map = source(&[("f-1", "b")]);
        let values = FieldScanner::default().scan("f", |k| map.get(k).cloned()).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_scan_fills_limit_exactly() {
        let map = source(&[("f-0", "a"), ("f-1", "b")]);
        let values = FieldScanner::new(2).scan("f", |k| map.get(k).cloned()).unwrap();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_scan_past_limit_is_rejected() {
        let err = FieldScanner::new(4)
            .scan("f", |k| Some(k.to_string()))
            .unwrap_err();
        assert!(matches!(err, DemoError::InvalidRequestParameter(_)));
    }
}
