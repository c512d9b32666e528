//! Image array extraction from `input-image-{i}` file parts.
//!
//! Images are materialized in exactly one representation per call, chosen by
//! [`ExtractionMode`]: cached file paths or decoded pixel arrays.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cache::SessionCache;
use crate::codec::{ImageCodec, PixelArray};
use crate::error::{DemoError, DemoResult};
use crate::input::fields::RequestFields;
use crate::input::scanner::{FieldScanner, IMAGE_FIELD_PREFIX};
use crate::observability::metrics;

/// Which representation extracted images take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Persist to the session cache, return paths. Wire name `file_path`.
    FilePath,
    /// Decode in memory. Wire name `numpy_array`.
    PixelArray,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::FilePath => "file_path",
            ExtractionMode::PixelArray => "numpy_array",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file_path" => Ok(ExtractionMode::FilePath),
            "numpy_array" => Ok(ExtractionMode::PixelArray),
            other => Err(DemoError::InputHandler(format!(
                "no valid mode '{}': expected 'file_path' or 'numpy_array'",
                other
            ))),
        }
    }
}

/// One extracted image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageHandle {
    Path(PathBuf),
    Pixels(PixelArray),
}

impl ImageHandle {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ImageHandle::Path(p) => Some(p.as_path()),
            ImageHandle::Pixels(_) => None,
        }
    }

    pub fn as_pixels(&self) -> Option<&PixelArray> {
        match self {
            ImageHandle::Pixels(p) => Some(p),
            ImageHandle::Path(_) => None,
        }
    }
}

/// Builds ordered image arrays from a request.
pub struct ImageExtractor<'a> {
    scanner: FieldScanner,
    codec: &'a dyn ImageCodec,
}

impl<'a> ImageExtractor<'a> {
    pub fn new(scanner: FieldScanner, codec: &'a dyn ImageCodec) -> Self {
        Self { scanner, codec }
    }

    /// Raw upload bytes from `input-image-0..` in index order.
    pub fn raw_images<'f>(&self, fields: &'f RequestFields) -> DemoResult<Vec<&'f [u8]>> {
        self.scanner
            .scan(IMAGE_FIELD_PREFIX, |key| fields.file(key).map(|f| &f.data[..]))
    }

    /// Images from `input-image-0..`, materialized per `mode`.
    ///
    /// `FilePath` writes into `cache`; `PixelArray` leaves it untouched.
    pub fn image_array(
        &self,
        fields: &RequestFields,
        mode: ExtractionMode,
        cache: &SessionCache,
    ) -> DemoResult<Vec<ImageHandle>> {
        let raw = self.raw_images(fields)?;
        if raw.is_empty() {
            return Err(DemoError::InvalidRequestParameter(format!(
                "No image files found: expected '{}-0'",
                IMAGE_FIELD_PREFIX
            )));
        }

        let handles = match mode {
            ExtractionMode::FilePath => cache
                .cache_image_file_array(&raw)?
                .into_iter()
                .map(ImageHandle::Path)
                .collect(),
            ExtractionMode::PixelArray => self.decode_all(&raw)?,
        };

        tracing::debug!(count = handles.len(), mode = %mode, "Extracted image array");
        metrics::record_extracted("image", handles.len());
        Ok(handles)
    }

    /// Decode every entry; the first failure aborts the whole array.
    pub fn decode_all<B: AsRef<[u8]>>(&self, images: &[B]) -> DemoResult<Vec<ImageHandle>> {
        images
            .iter()
            .enumerate()
            .map(|(index, bytes)| {
                self.codec
                    .decode(bytes.as_ref())
                    .map(ImageHandle::Pixels)
                    .map_err(|e| match e {
                        DemoError::ImageDecode(msg) => {
                            DemoError::ImageDecode(format!("image {}: {}", index, msg))
                        }
                        other => other,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::sample_png;
    use crate::codec::StandardCodec;
    use crate::input::fields::UploadedFile;

    fn setup() -> (tempfile::TempDir, SessionCache) {
        let root = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(root.path()).unwrap();
        (root, cache)
    }

    fn two_images() -> (Vec<Vec<u8>>, RequestFields) {
        let images = vec![sample_png(4, 4, 1), sample_png(6, 2, 2)];
        let fields = RequestFields::new()
            .with_file("input-image-0", UploadedFile::new(images[0].clone()))
            .with_file("input-image-1", UploadedFile::new(images[1].clone()))
            .with_file("input-image-3", UploadedFile::new(sample_png(1, 1, 3)));
        (images, fields)
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("file_path".parse::<ExtractionMode>().unwrap(), ExtractionMode::FilePath);
        assert_eq!(
            "numpy_array".parse::<ExtractionMode>().unwrap(),
            ExtractionMode::PixelArray
        );
        let err = "base64".parse::<ExtractionMode>().unwrap_err();
        assert!(matches!(err, DemoError::InputHandler(_)));
        assert!(err.to_string().contains("no valid mode"));
    }

    #[test]
    fn test_file_path_mode_reproduces_uploads() {
        let (_root, cache) = setup();
        let (images, fields) = two_images();
        let extractor = ImageExtractor::new(FieldScanner::default(), &StandardCodec);

        let handles = extractor
            .image_array(&fields, ExtractionMode::FilePath, &cache)
            .unwrap();
        assert_eq!(handles.len(), 2);
        for (handle, original) in handles.iter().zip(&images) {
            let path = handle.as_path().unwrap();
            assert!(path.starts_with(cache.cache_dir().unwrap()));
            assert_eq!(&std::fs::read(path).unwrap(), original);
        }
    }

    #[test]
    fn test_pixel_mode_matches_reference_decode() {
        let (_root, cache) = setup();
        let (images, fields) = two_images();
        let extractor = ImageExtractor::new(FieldScanner::default(), &StandardCodec);

        let handles = extractor
            .image_array(&fields, ExtractionMode::PixelArray, &cache)
            .unwrap();
        assert_eq!(handles.len(), 2);
        for (handle, original) in handles.iter().zip(&images) {
            let expected = StandardCodec.decode(original).unwrap();
            assert_eq!(handle.as_pixels().unwrap(), &expected);
        }
        assert!(cache.cached_image_paths().unwrap().is_empty());
    }

    #[test]
    fn test_no_images_is_an_error() {
        let (_root, cache) = setup();
        let fields = RequestFields::new().with_text("input-image-0", "not a file");
        let extractor = ImageExtractor::new(FieldScanner::default(), &StandardCodec);

        let err = extractor
            .image_array(&fields, ExtractionMode::FilePath, &cache)
            .unwrap_err();
        assert!(matches!(err, DemoError::InvalidRequestParameter(_)));
    }

    #[test]
    fn test_decode_failure_propagates() {
        let (_root, cache) = setup();
        let fields = RequestFields::new()
            .with_file("input-image-0", UploadedFile::new(sample_png(2, 2, 0)))
            .with_file("input-image-1", UploadedFile::new(b"corrupt".to_vec()));
        let extractor = ImageExtractor::new(FieldScanner::default(), &StandardCodec);

        let err = extractor
            .image_array(&fields, ExtractionMode::PixelArray, &cache)
            .unwrap_err();
        assert!(matches!(err, DemoError::ImageDecode(ref m) if m.starts_with("image 1")));
    }

    #[test]
    fn test_images_over_limit_are_rejected() {
        let (_root, cache) = setup();
        let (_images, fields) = two_images();
        let fields = fields.with_file("input-image-2", UploadedFile::new(sample_png(1, 1, 4)));
        let extractor = ImageExtractor::new(FieldScanner::new(2), &StandardCodec);

        let err = extractor
            .image_array(&fields, ExtractionMode::FilePath, &cache)
            .unwrap_err();
        assert!(matches!(err, DemoError::InvalidRequestParameter(_)));
        assert!(cache.cached_image_paths().unwrap().is_empty());
    }
}
