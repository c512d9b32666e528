//! Per-request handler context.
//!
//! [`DemoRequest`] is the extractor demo handlers take. It owns the request's
//! fields and its [`DispatchContext`], so buffered results can never leak
//! into another request. Handlers end with [`DemoRequest::finish`], which
//! drains the buffer into the JSON response.

use axum::{
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::MutexGuard;

use crate::cache::SessionCache;
use crate::error::{DemoError, DemoResult};
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::input::{
    ExtractionMode, ImageExtractor, ImageHandle, RequestFields, TextExtractor, SOCKET_ID_FIELD,
};
use crate::output::{DataType, DispatchContext, DispatchOutcome};

/// Inputs and dispatch state of one inbound request.
pub struct DemoRequest {
    state: AppState,
    fields: RequestFields,
    ctx: DispatchContext,
    request_id: String,
}

impl FromRequest<AppState> for DemoRequest {
    type Rejection = DemoError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let request_id = req.headers().request_id().to_string();
        let fields = RequestFields::from_request(req, state).await?;
        Ok(Self::new(state.clone(), fields, request_id))
    }
}

impl DemoRequest {
    pub fn new(state: AppState, fields: RequestFields, request_id: impl Into<String>) -> Self {
        let socket_id = fields.text(SOCKET_ID_FIELD).map(str::to_owned);
        let request_id = request_id.into();
        tracing::debug!(
            request_id = %request_id,
            socket_id = ?socket_id,
            "Demo request received"
        );
        Self {
            state,
            ctx: DispatchContext::new(socket_id),
            fields,
            request_id,
        }
    }

    pub fn fields(&self) -> &RequestFields {
        &self.fields
    }

    pub fn socket_id(&self) -> Option<&str> {
        self.ctx.socket_id()
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The shared session cache. Do not hold the guard across an `.await`.
    pub fn cache(&self) -> MutexGuard<'_, SessionCache> {
        self.state.cache()
    }

    /// Texts from `input-text-0..`.
    pub fn text_array(&self) -> DemoResult<Vec<String>> {
        TextExtractor::new(self.state.services().scanner).text_array(&self.fields)
    }

    fn image_extractor(&self) -> ImageExtractor<'_> {
        let services = self.state.services();
        ImageExtractor::new(services.scanner, services.codec.as_ref())
    }

    /// Number of contiguous `input-image-{i}` uploads.
    pub fn image_count(&self) -> DemoResult<usize> {
        Ok(self.image_extractor().raw_images(&self.fields)?.len())
    }

    /// Images from `input-image-0..` in the requested representation.
    pub fn image_array(&self, mode: ExtractionMode) -> DemoResult<Vec<ImageHandle>> {
        let cache = self.state.cache();
        self.image_extractor().image_array(&self.fields, mode, &cache)
    }

    /// Every image previously written to the session cache.
    pub fn cached_image_array(&self, mode: ExtractionMode) -> DemoResult<Vec<ImageHandle>> {
        let paths = self.state.cache().cached_image_paths()?;
        match mode {
            ExtractionMode::FilePath => Ok(paths.into_iter().map(ImageHandle::Path).collect()),
            ExtractionMode::PixelArray => {
                let bytes = paths
                    .iter()
                    .map(|p| read_cached(p))
                    .collect::<DemoResult<Vec<_>>>()?;
                self.image_extractor().decode_all(&bytes)
            }
        }
    }

    pub async fn send(&mut self, data: Value, data_type: DataType) -> DemoResult<DispatchOutcome> {
        let dispatcher = &self.state.services().dispatcher;
        dispatcher.send(&mut self.ctx, data, data_type).await
    }

    pub async fn send_text_array<T: Serialize + ?Sized>(
        &mut self,
        texts: &T,
    ) -> DemoResult<DispatchOutcome> {
        let dispatcher = &self.state.services().dispatcher;
        dispatcher.send_text_array(&mut self.ctx, texts).await
    }

    pub async fn send_graph_array<T: Serialize + ?Sized>(
        &mut self,
        graphs: &T,
    ) -> DemoResult<DispatchOutcome> {
        let dispatcher = &self.state.services().dispatcher;
        dispatcher.send_graph_array(&mut self.ctx, graphs).await
    }

    pub async fn send_image_array(
        &mut self,
        images: &[ImageHandle],
    ) -> DemoResult<DispatchOutcome> {
        let dispatcher = &self.state.services().dispatcher;
        dispatcher.send_image_array(&mut self.ctx, images).await
    }

    pub async fn send_terminal(&mut self, text: impl Into<String>) -> DemoResult<DispatchOutcome> {
        let dispatcher = &self.state.services().dispatcher;
        dispatcher.send_terminal(&mut self.ctx, text).await
    }

    /// Close the request, draining its buffered results.
    pub fn finish(mut self) -> Finished {
        Finished(self.ctx.flush())
    }
}

fn read_cached(path: &Path) -> DemoResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        DemoError::InvalidCachePath(format!("Cannot read cached image {}: {}", path.display(), e))
    })
}

/// The drained local response of a finished request.
#[derive(Debug, Clone, PartialEq)]
pub struct Finished(pub Vec<Value>);

impl IntoResponse for Finished {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}
