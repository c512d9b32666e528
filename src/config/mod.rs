//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DemoConfig (validated, immutable)
//!     → token.rs may override the listener from a deployment token
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod token;
pub mod validation;

pub use schema::DemoConfig;
pub use schema::{CacheConfig, ExtractionConfig, ListenerConfig, ObservabilityConfig, RelayConfig};
pub use token::{DeploymentTarget, DeploymentToken};
