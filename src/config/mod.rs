//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CollectorConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Only the collector is configured from a file; an emitter takes exactly
//!   one value, the collector address
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{CollectorConfig, ListenerConfig, ObservabilityConfig};
