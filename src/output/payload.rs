//! Dispatch payloads and the per-request response buffer.

use serde::Serialize;
use serde_json::{json, Value};

/// Which key a dispatched value travels under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Regular results, key `data`.
    Data,
    /// Terminal/console output, key `terminalData`.
    Terminal,
}

impl DataType {
    pub fn key(&self) -> &'static str {
        match self {
            DataType::Data => "data",
            DataType::Terminal => "terminalData",
        }
    }
}

/// Body of a relay request: `{"socketId": ..., "data" | "terminalData": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchPayload {
    #[serde(rename = "socketId")]
    pub socket_id: String,
    #[serde(flatten)]
    pub body: PayloadBody,
}

/// The single data entry of a payload.
#[derive(Debug, Clone, Serialize)]
pub enum PayloadBody {
    #[serde(rename = "data")]
    Data(Value),
    #[serde(rename = "terminalData")]
    Terminal(Value),
}

impl DispatchPayload {
    pub fn new(socket_id: impl Into<String>, data: Value, data_type: DataType) -> Self {
        let body = match data_type {
            DataType::Data => PayloadBody::Data(data),
            DataType::Terminal => PayloadBody::Terminal(data),
        };
        Self {
            socket_id: socket_id.into(),
            body,
        }
    }
}

/// Entry every fresh response starts with.
pub fn default_template() -> Vec<Value> {
    vec![json!({ "generator": concat!("vision-relay ", env!("CARGO_PKG_VERSION")) })]
}

/// Results accumulated for the local response of one request.
///
/// Never empty: it starts from the template and returns to it on every flush.
#[derive(Debug, Clone)]
pub struct ResponseBuffer {
    template: Vec<Value>,
    entries: Vec<Value>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::with_template(default_template())
    }

    pub fn with_template(template: Vec<Value>) -> Self {
        Self {
            entries: template.clone(),
            template,
        }
    }

    /// Append `{key: data}`.
    pub fn push(&mut self, data: Value, data_type: DataType) {
        let mut entry = serde_json::Map::new();
        entry.insert(data_type.key().to_string(), data);
        self.entries.push(Value::Object(entry));
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// Drain the accumulated entries and reset to the template.
    pub fn flush(&mut self) -> Vec<Value> {
        std::mem::replace(&mut self.entries, self.template.clone())
    }
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self::new()
    }
}
