//! Session-scoped disk cache.

pub mod session;

pub use session::{SessionCache, TEXT_CACHE_FILE};
