//! Request field collection.
//!
//! # Responsibilities
//! - Read a urlencoded or multipart body into a flat key → value map
//! - Keep file parts apart from text parts
//! - Answer "absent" for missing *and* empty values so scans stop uniformly
//!
//! # Design Decisions
//! - The body is read once, up front; scanners then work on plain maps
//! - A malformed multipart body is an `InputHandler` error, never a silently
//!   shortened list
//! - Repeated keys keep their first value

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header, Method},
    Form,
};

use crate::error::{DemoError, DemoResult};

/// A file part from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            content_type: None,
            data: data.into(),
        }
    }
}

/// Text fields and file parts of one request.
#[derive(Debug, Clone, Default)]
pub struct RequestFields {
    text: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl RequestFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field (first value for a key wins).
    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_text(key.into(), value.into());
        self
    }

    /// Add a file part (first value for a key wins).
    pub fn with_file(mut self, key: impl Into<String>, file: UploadedFile) -> Self {
        self.insert_file(key.into(), file);
        self
    }

    fn insert_text(&mut self, key: String, value: String) {
        self.text.entry(key).or_insert(value);
    }

    fn insert_file(&mut self, key: String, file: UploadedFile) {
        self.files.entry(key).or_insert(file);
    }

    /// Non-empty text value for `key`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.text
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Non-empty file part for `key`.
    pub fn file(&self, key: &str) -> Option<&UploadedFile> {
        self.files.get(key).filter(|f| !f.data.is_empty())
    }

    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    pub fn file_len(&self) -> usize {
        self.files.len()
    }

    /// Collect a multipart body.
    pub async fn from_multipart(mut multipart: Multipart) -> DemoResult<Self> {
        let mut fields = Self::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| DemoError::InputHandler(format!("Malformed multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let data = field.bytes().await.map_err(|e| {
                DemoError::InputHandler(format!("Failed to read multipart field '{}': {}", name, e))
            })?;

            let is_text_part = file_name.is_none()
                && content_type
                    .as_deref()
                    .map_or(true, |ct| ct.starts_with("text/"));

            if is_text_part {
                match String::from_utf8(data.to_vec()) {
                    Ok(text) => fields.insert_text(name, text),
                    Err(e) => fields.insert_file(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            data: Bytes::from(e.into_bytes()),
                        },
                    ),
                }
            } else {
                fields.insert_file(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        data,
                    },
                );
            }
        }

        tracing::debug!(
            text_fields = fields.text_len(),
            file_fields = fields.file_len(),
            "Multipart body collected"
        );
        Ok(fields)
    }

    /// Collect urlencoded pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut fields = Self::new();
        for (key, value) in pairs {
            fields.insert_text(key, value);
        }
        fields
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

fn is_urlencoded(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

impl<S> FromRequest<S> for RequestFields
where
    S: Send + Sync,
{
    type Rejection = DemoError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| DemoError::InputHandler(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        // GET carries its fields in the query string, which `Form` reads.
        if is_urlencoded(&req) || req.method() == Method::GET {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| DemoError::InputHandler(e.body_text()))?;
            return Ok(Self::from_pairs(pairs));
        }

        Ok(Self::new())
    }
}
