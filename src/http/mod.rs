//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route registration)
//!     → request.rs (request ID)
//!     → exchange.rs (DemoRequest: fields + per-request dispatch context)
//!     → user handler
//!     → exchange.rs (Finished: drained buffer as JSON)
//!     → Send to client
//! ```

pub mod exchange;
pub mod request;
pub mod server;

pub use exchange::{DemoRequest, Finished};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{bind, AppState, DemoServer};
