//! Flow record subsystem.
//!
//! # Data Flow
//! ```text
//! Instrumented application:
//!     http::Request
//!     → record.rs (capture FlowRecord)
//!     → codec.rs (encode to one JSON datagram)
//!     → emitter (UDP send)
//!
//! Collector:
//!     UDP datagram
//!     → codec.rs (decode, all-or-nothing)
//!     → FlowRecord
//! ```

pub mod codec;
pub mod record;

pub use codec::{decode, encode, DecodeError};
pub use record::{FlowHeaders, FlowRecord, FlowSource, UNKNOWN_CONTENT_LENGTH};
