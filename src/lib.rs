//! HTTP application flow export.
//!
//! Captures per-request metadata inside an HTTP server and sends it, one
//! JSON datagram per request, to a UDP flow collector. Delivery is best
//! effort: emitting never fails, never blocks and never changes the response.
//!
//! - [`Emitter`] owns the UDP channel and sends [`FlowRecord`]s
//! - [`FlowLayer`] plugs the emitter into any tower/axum stack
//! - [`decode`] turns a received datagram back into a [`FlowRecord`]
//! - [`collector::Collector`] is a reference receive loop built on `decode`

pub mod collector;
pub mod config;
pub mod emitter;
pub mod flow;
pub mod lifecycle;
pub mod observability;

pub use emitter::{DropObserver, EmitError, Emitter, EmitterError, FlowLayer};
pub use flow::{decode, DecodeError, FlowRecord, FlowSource};
pub use lifecycle::Shutdown;
