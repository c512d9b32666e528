//! Image codec capability.
//!
//! Decoding and encoding are delegated to the `image` crate behind the
//! [`ImageCodec`] trait so handlers (and tests) can swap the implementation.
//! Decoded images are `(height, width, 3)` RGB arrays.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbImage};
use ndarray::Array3;

use crate::error::{DemoError, DemoResult};

/// Decoded pixel data, indexed `[row, column, channel]` in RGB order.
pub type PixelArray = Array3<u8>;

/// Byte stream ↔ pixel array conversion.
pub trait ImageCodec: Send + Sync {
    /// Decode an encoded image (PNG, JPEG, ...) into pixels.
    fn decode(&self, bytes: &[u8]) -> DemoResult<PixelArray>;

    /// Encode pixels as PNG.
    fn encode_png(&self, pixels: &PixelArray) -> DemoResult<Vec<u8>>;
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl ImageCodec for StandardCodec {
    fn decode(&self, bytes: &[u8]) -> DemoResult<PixelArray> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| DemoError::ImageDecode(format!("Failed to decode image: {}", e)))?
            .to_rgb8();

        let (width, height) = img.dimensions();
        Array3::from_shape_vec((height as usize, width as usize, 3), img.into_raw())
            .map_err(|e| DemoError::ImageDecode(format!("Unexpected pixel layout: {}", e)))
    }

    fn encode_png(&self, pixels: &PixelArray) -> DemoResult<Vec<u8>> {
        let (height, width, channels) = pixels.dim();
        if channels != 3 {
            return Err(DemoError::MismatchType(format!(
                "expected 3 channels per pixel, got {}",
                channels
            )));
        }

        // Logical iteration order is row-major regardless of memory layout.
        let raw: Vec<u8> = pixels.iter().copied().collect();
        let img = RgbImage::from_raw(width as u32, height as u32, raw).ok_or_else(|| {
            DemoError::MismatchType(format!("pixel buffer does not fit {}x{}", width, height))
        })?;

        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| DemoError::FileHandling(format!("Failed to encode image: {}", e)))?;
        Ok(png)
    }
}

/// Sniff the image format of `bytes`, if recognizable.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// File extension for cached bytes ("bin" when unrecognized).
pub fn file_extension(bytes: &[u8]) -> &'static str {
    sniff_format(bytes)
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("bin")
}

/// MIME type for `bytes` ("application/octet-stream" when unrecognized).
pub fn mime_type(bytes: &[u8]) -> &'static str {
    sniff_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Wrap encoded image bytes as a base64 data URI.
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type(bytes), STANDARD.encode(bytes))
}
