//! Input extraction and result relay for computer-vision demo servers.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod input;
pub mod observability;
pub mod output;
pub mod shape;

pub use config::schema::DemoConfig;
pub use error::{DemoError, DemoResult};
pub use http::{DemoRequest, DemoServer, Finished};
pub use input::{ExtractionMode, ImageHandle};
