//! Flow emitter: one UDP socket per collector destination.
//!
//! # Responsibilities
//! - Resolve the collector address and open a connected UDP socket
//! - Capture, encode and send one datagram per request
//! - Swallow every emit-time failure
//!
//! # Design Decisions
//! - Emitting is best effort. `emit` returns `()`: serialization and send
//!   failures are dropped silently unless a `DropObserver` is installed.
//! - The socket is non-blocking, so a full send buffer is a drop, not a wait.
//! - `UdpSocket::send` on a connected socket is a single syscall per datagram,
//!   so concurrent emits share the socket without a lock and never interleave.
//! - Records are encoded inside `emit`; callers may mutate the request once it returns.

pub mod layer;

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;

use thiserror::Error;

use crate::flow::{codec, FlowRecord, FlowSource};
use crate::observability::metrics;

pub use layer::{FlowLayer, FlowService};

/// Errors creating an `Emitter`.
#[derive(Debug, Error)]
pub enum EmitterError {
    /// The collector address is not a resolvable `host:port`.
    #[error("cannot resolve collector address {address:?}: {source}")]
    AddressResolution {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The local UDP socket could not be created or pointed at the collector.
    #[error("cannot open UDP channel to {destination}: {source}")]
    ChannelOpen {
        destination: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// A failure on the emit path. Never returned to callers of `emit`.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to serialize flow record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to send flow datagram: {0}")]
    Send(#[from] io::Error),
}

impl EmitError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            EmitError::Serialize(_) => "serialize",
            EmitError::Send(e) if e.kind() == io::ErrorKind::WouldBlock => "would_block",
            EmitError::Send(_) => "send",
        }
    }
}

/// Receives records the emitter had to drop.
///
/// Called synchronously on the request path, so implementations must be cheap.
pub trait DropObserver: Send + Sync {
    fn on_drop(&self, record: &FlowRecord, error: &EmitError);
}

impl<F> DropObserver for F
where
    F: Fn(&FlowRecord, &EmitError) + Send + Sync,
{
    fn on_drop(&self, record: &FlowRecord, error: &EmitError) {
        self(record, error)
    }
}

/// Sends flow records to a collector.
///
/// Cloning is cheap and clones share the same socket.
#[derive(Clone)]
pub struct Emitter {
    socket: Arc<UdpSocket>,
    destination: SocketAddr,
    observer: Option<Arc<dyn DropObserver>>,
}

impl Emitter {
    /// Open a UDP channel to the collector at `address` (`host:port`).
    ///
    /// No packets are exchanged; connecting only fixes the destination.
    pub fn create(address: &str) -> Result<Self, EmitterError> {
        let destination = resolve(address)?;
        let socket = open_channel(destination)
            .map_err(|source| EmitterError::ChannelOpen { destination, source })?;

        tracing::debug!(
            destination = %destination,
            local_addr = ?socket.local_addr().ok(),
            "Flow emitter ready"
        );

        Ok(Self {
            socket: Arc::new(socket),
            destination,
            observer: None,
        })
    }

    /// Report dropped records to `observer`. The default is to drop silently.
    pub fn with_drop_observer(mut self, observer: impl DropObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// The resolved collector endpoint.
    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Capture `request` and send it as one datagram.
    ///
    /// Never fails and never blocks.
    pub fn emit<S>(&self, request: &S)
    where
        S: FlowSource + ?Sized,
    {
        self.emit_record(&request.to_flow_record());
    }

    /// Send an already captured record as one datagram.
    pub fn emit_record(&self, record: &FlowRecord) {
        // Best effort: the result is intentionally not propagated.
        if let Err(error) = self.send(record) {
            self.drop_record(record, &error);
        }
    }

    fn send(&self, record: &FlowRecord) -> Result<(), EmitError> {
        let payload = codec::encode(record)?;
        self.socket.send(&payload)?;
        metrics::record_emitted();
        Ok(())
    }

    fn drop_record(&self, record: &FlowRecord, error: &EmitError) {
        metrics::record_emit_dropped(error.reason());
        tracing::trace!(
            destination = %self.destination,
            method = %record.method,
            url = %record.url,
            error = %error,
            "Flow record dropped"
        );
        if let Some(observer) = &self.observer {
            observer.on_drop(record, error);
        }
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("destination", &self.destination)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Resolve `address`, preferring IPv4 endpoints.
fn resolve(address: &str) -> Result<SocketAddr, EmitterError> {
    let resolution_error = |source: io::Error| EmitterError::AddressResolution {
        address: address.to_string(),
        source,
    };

    let candidates: Vec<SocketAddr> = address
        .to_socket_addrs()
        .map_err(resolution_error)?
        .collect();

    candidates
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| candidates.first())
        .copied()
        .ok_or_else(|| {
            resolution_error(io::Error::new(
                io::ErrorKind::NotFound,
                "address resolved to no endpoints",
            ))
        })
}

fn open_channel(destination: SocketAddr) -> io::Result<UdpSocket> {
    let local: SocketAddr = if destination.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };

    let socket = UdpSocket::bind(local)?;
    socket.connect(destination)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}
