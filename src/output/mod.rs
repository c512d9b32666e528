//! Output dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! handler result
//!     → dispatcher.rs (shape check, pick path)
//!         ├─ no socket id → payload.rs ResponseBuffer (returned with the response)
//!         └─ socket id    → target.rs URL → relay.rs POST → typed status mapping
//! ```

pub mod dispatcher;
pub mod payload;
pub mod relay;
pub mod target;

pub use dispatcher::{DispatchContext, DispatchOutcome, Dispatcher};
pub use payload::{DataType, DispatchPayload, ResponseBuffer};
pub use relay::RelayClient;
pub use target::resolve_target_url;
