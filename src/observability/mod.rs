//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! emitter / collector
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, collector only)
//! ```
//!
//! # Design Decisions
//! - The emit path logs at trace level only; it must stay quiet by default
//! - Metrics are cheap (atomic increments) and no-ops without a recorder

pub mod logging;
pub mod metrics;
