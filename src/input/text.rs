//! Text array extraction from `input-text-{i}` fields.

use crate::error::{DemoError, DemoResult};
use crate::input::fields::RequestFields;
use crate::input::scanner::{FieldScanner, TEXT_FIELD_PREFIX};
use crate::observability::metrics;

/// Builds ordered text arrays from a request.
#[derive(Debug, Clone, Copy)]
pub struct TextExtractor {
    scanner: FieldScanner,
}

impl TextExtractor {
    pub fn new(scanner: FieldScanner) -> Self {
        Self { scanner }
    }

    /// Strings from `input-text-0..` in index order.
    ///
    /// Fails with `InvalidRequestParameter` when `input-text-0` is missing or empty.
    pub fn text_array(&self, fields: &RequestFields) -> DemoResult<Vec<String>> {
        let texts = self
            .scanner
            .scan(TEXT_FIELD_PREFIX, |key| fields.text(key).map(str::to_owned))?;

        if texts.is_empty() {
            return Err(DemoError::InvalidRequestParameter(format!(
                "No text fields found: expected '{}-0'",
                TEXT_FIELD_PREFIX
            )));
        }

        tracing::debug!(count = texts.len(), "Extracted text array");
        metrics::record_extracted("text", texts.len());
        Ok(texts)
    }
}
