//! Result dispatch: local response buffer or relay.
//!
//! A [`DispatchContext`] belongs to exactly one inbound request. When it
//! carries a socket id, results go to the relay server; otherwise they are
//! appended to the context's [`ResponseBuffer`] and returned with the
//! response. The [`Dispatcher`] itself is stateless and shared.

use std::fs;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::codec::{self, ImageCodec};
use crate::error::{DemoError, DemoResult};
use crate::input::ImageHandle;
use crate::observability::metrics;
use crate::output::payload::{DataType, DispatchPayload, ResponseBuffer};
use crate::output::relay::RelayClient;
use crate::shape;

/// Per-request dispatch state.
#[derive(Debug, Clone, Default)]
pub struct DispatchContext {
    socket_id: Option<String>,
    buffer: ResponseBuffer,
}

impl DispatchContext {
    /// Empty socket ids count as absent.
    pub fn new(socket_id: Option<String>) -> Self {
        Self {
            socket_id: socket_id.filter(|s| !s.is_empty()),
            buffer: ResponseBuffer::new(),
        }
    }

    pub fn socket_id(&self) -> Option<&str> {
        self.socket_id.as_deref()
    }

    pub fn buffer(&self) -> &ResponseBuffer {
        &self.buffer
    }

    /// Drain the local response; the buffer returns to its template.
    pub fn flush(&mut self) -> Vec<Value> {
        self.buffer.flush()
    }
}

/// What happened to a dispatched value.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Sent to the relay; carries its response body verbatim.
    Relayed(String),
    /// Appended locally; carries the buffer contents after the append.
    Buffered(Vec<Value>),
}

/// Routes results to the relay or the local buffer.
#[derive(Clone)]
pub struct Dispatcher {
    relay: RelayClient,
    codec: Arc<dyn ImageCodec>,
}

impl Dispatcher {
    pub fn new(relay: RelayClient, codec: Arc<dyn ImageCodec>) -> Self {
        Self { relay, codec }
    }

    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }

    /// Dispatch `data` under `data_type`.
    pub async fn send(
        &self,
        ctx: &mut DispatchContext,
        data: Value,
        data_type: DataType,
    ) -> DemoResult<DispatchOutcome> {
        match ctx.socket_id.as_deref() {
            Some(socket_id) => {
                let payload = DispatchPayload::new(socket_id, data, data_type);
                metrics::record_dispatch("relay");
                let body = self.relay.post(&payload).await?;
                Ok(DispatchOutcome::Relayed(body))
            }
            None => {
                ctx.buffer.push(data, data_type);
                metrics::record_dispatch("local");
                Ok(DispatchOutcome::Buffered(ctx.buffer.entries().to_vec()))
            }
        }
    }

    /// Dispatch an array of strings.
    pub async fn send_text_array<T: Serialize + ?Sized>(
        &self,
        ctx: &mut DispatchContext,
        texts: &T,
    ) -> DemoResult<DispatchOutcome> {
        let texts = shape::string_array(texts)?;
        self.send(ctx, Value::from(texts), DataType::Data).await
    }

    /// Dispatch an array of arrays (plot series, tables, ...).
    pub async fn send_graph_array<T: Serialize + ?Sized>(
        &self,
        ctx: &mut DispatchContext,
        graphs: &T,
    ) -> DemoResult<DispatchOutcome> {
        let graphs = shape::nested_array(graphs)?;
        self.send(ctx, graphs, DataType::Data).await
    }

    /// Dispatch images as base64 data URIs.
    ///
    /// Path handles are read from disk as-is; pixel handles are PNG-encoded.
    pub async fn send_image_array(
        &self,
        ctx: &mut DispatchContext,
        images: &[ImageHandle],
    ) -> DemoResult<DispatchOutcome> {
        let encoded = images
            .iter()
            .map(|image| self.encode_image(image))
            .collect::<DemoResult<Vec<String>>>()?;
        self.send(ctx, Value::from(encoded), DataType::Data).await
    }

    /// Dispatch console-style output.
    pub async fn send_terminal(
        &self,
        ctx: &mut DispatchContext,
        text: impl Into<String>,
    ) -> DemoResult<DispatchOutcome> {
        self.send(ctx, Value::String(text.into()), DataType::Terminal)
            .await
    }

    fn encode_image(&self, image: &ImageHandle) -> DemoResult<String> {
        let bytes = match image {
            ImageHandle::Path(path) => fs::read(path).map_err(|e| {
                DemoError::FileHandling(format!("Failed to read image {}: {}", path.display(), e))
            })?,
            ImageHandle::Pixels(pixels) => self.codec.encode_png(pixels)?,
        };
        Ok(codec::to_data_uri(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::sample_png;
    use crate::codec::StandardCodec;
    use crate::config::RelayConfig;
    use crate::output::payload::default_template;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        // Nothing listens here; local-path tests must never reach it.
        let config = RelayConfig {
            server_base: "127.0.0.1:9".to_string(),
            ..RelayConfig::default()
        };
        Dispatcher::new(
            RelayClient::from_config(&config).unwrap(),
            Arc::new(StandardCodec),
        )
    }

    #[tokio::test]
    async fn test_local_send_appends_to_buffer() {
        let mut ctx = DispatchContext::new(None);
        let outcome = dispatcher()
            .send_text_array(&mut ctx, &["hello", "world"])
            .await
            .unwrap();

        let mut expected = default_template();
        expected.push(json!({"data": ["hello", "world"]}));
        assert_eq!(outcome, DispatchOutcome::Buffered(expected.clone()));
        assert_eq!(ctx.flush(), expected);
        assert_eq!(ctx.buffer().entries(), default_template().as_slice());
    }

    #[tokio::test]
    async fn test_empty_socket_id_is_local() {
        let mut ctx = DispatchContext::new(Some(String::new()));
        assert!(ctx.socket_id().is_none());
        let outcome = dispatcher()
            .send_terminal(&mut ctx, "done")
            .await
            .unwrap();
        assert!(matches!(outcome, DispatchOutcome::Buffered(_)));
    }

    #[tokio::test]
    async fn test_shape_checked_before_relay() {
        // A relay attempt here would fail with Requester, not MismatchType.
        let mut ctx = DispatchContext::new(Some("sock".into()));
        let d = dispatcher();

        let err = d.send_text_array(&mut ctx, &json!(["a", 1])).await.unwrap_err();
        assert!(matches!(err, DemoError::MismatchType(_)));

        let err = d.send_graph_array(&mut ctx, &json!([[1, 2], 3])).await.unwrap_err();
        assert!(matches!(err, DemoError::MismatchType(_)));

        let err = d.send_text_array(&mut ctx, "not an array").await.unwrap_err();
        assert!(matches!(err, DemoError::MismatchType(_)));
    }

    #[tokio::test]
    async fn test_relay_unreachable_is_requester_error() {
        let mut ctx = DispatchContext::new(Some("sock".into()));
        let err = dispatcher()
            .send_text_array(&mut ctx, &["x"])
            .await
            .unwrap_err();
        assert!(matches!(err, DemoError::Requester(_)));
    }

    #[tokio::test]
    async fn test_image_array_from_path_and_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let png = sample_png(2, 2, 5);
        let path = dir.path().join("a.png");
        std::fs::write(&path, &png).unwrap();
        let pixels = StandardCodec.decode(&png).unwrap();

        let mut ctx = DispatchContext::new(None);
        let images = vec![ImageHandle::Path(path), ImageHandle::Pixels(pixels.clone())];
        dispatcher().send_image_array(&mut ctx, &images).await.unwrap();

        let entries = ctx.flush();
        let uris = entries[1]["data"].as_array().unwrap();
        assert_eq!(uris.len(), 2);

        let from_path = uris[0].as_str().unwrap();
        assert_eq!(
            from_path,
            format!("data:image/png;base64,{}", STANDARD.encode(&png))
        );

        let from_pixels = uris[1].as_str().unwrap();
        let encoded = from_pixels.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = StandardCodec.decode(&STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(decoded, pixels);
    }

    #[tokio::test]
    async fn test_missing_image_file_fails_before_dispatch() {
        let mut ctx = DispatchContext::new(None);
        let images = vec![ImageHandle::Path("/no/such/image.png".into())];
        let err = dispatcher().send_image_array(&mut ctx, &images).await.unwrap_err();
        assert!(matches!(err, DemoError::FileHandling(_)));
        assert_eq!(ctx.buffer().entries(), default_template().as_slice());
    }
}
