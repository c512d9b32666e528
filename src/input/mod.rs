//! Request input extraction.
//!
//! # Data Flow
//! ```text
//! urlencoded / multipart body
//!     → fields.rs (flat text + file maps)
//!     → scanner.rs (contiguous `{prefix}-{i}` walk)
//!     → text.rs  → Vec<String>
//!     → image.rs → Vec<ImageHandle> (cached paths or decoded pixels)
//! ```

pub mod fields;
pub mod image;
pub mod scanner;
pub mod text;

pub use fields::{RequestFields, UploadedFile};
pub use image::{ExtractionMode, ImageExtractor, ImageHandle};
pub use scanner::{FieldScanner, IMAGE_FIELD_PREFIX, SOCKET_ID_FIELD, TEXT_FIELD_PREFIX};
pub use text::TextExtractor;
