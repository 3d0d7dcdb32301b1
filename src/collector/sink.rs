//! Destinations for decoded flow records.

use std::net::SocketAddr;

use tokio::sync::mpsc;

use crate::flow::FlowRecord;

/// Consumes records decoded by the collector.
///
/// Called inline by the receive loop; slow sinks delay the next `recv`.
pub trait FlowSink: Send + Sync {
    fn accept(&self, record: FlowRecord, peer: SocketAddr);
}

/// Writes one structured log event per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl FlowSink for LogSink {
    fn accept(&self, record: FlowRecord, peer: SocketAddr) {
        tracing::info!(
            peer = %peer,
            method = %record.method,
            url = %record.url,
            proto = %record.proto,
            host = %record.host,
            remote_addr = %record.remote_addr,
            content_length = record.content_length,
            headers = ?record.header,
            "Flow record"
        );
    }
}

/// Forwards records over an unbounded channel.
///
/// Records are dropped once the receiving half is closed.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<FlowRecord>,
}

impl ChannelSink {
    /// Create a sink and the receiver its records arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FlowRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FlowSink for ChannelSink {
    fn accept(&self, record: FlowRecord, _peer: SocketAddr) {
        let _ = self.tx.send(record);
    }
}
