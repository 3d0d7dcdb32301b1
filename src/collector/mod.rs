//! Reference flow collector.
//!
//! # Responsibilities
//! - Bind a UDP socket for incoming flow datagrams
//! - Decode each datagram independently
//! - Hand valid records to a `FlowSink`
//!
//! # Design Decisions
//! - Malformed datagrams are counted and logged at debug, never fatal
//! - Receive errors are logged and the loop continues after an exponential
//!   backoff, reset by the next successful receive
//! - Datagrams larger than `max_datagram_size` are truncated by the OS and
//!   therefore fail to decode

pub mod sink;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;

use crate::config::ListenerConfig;
use crate::flow::decode;
use crate::observability::metrics;

pub use sink::{ChannelSink, FlowSink, LogSink};

const RECV_BACKOFF_BASE_MS: u64 = 10;
const RECV_BACKOFF_MAX_MS: u64 = 1_000;

/// Delay before the next receive after `failures` consecutive receive errors.
fn receive_backoff(failures: u32) -> Duration {
    if failures == 0 {
        return Duration::ZERO;
    }
    let delay_ms = RECV_BACKOFF_BASE_MS.saturating_mul(2u64.saturating_pow(failures - 1));
    Duration::from_millis(delay_ms.min(RECV_BACKOFF_MAX_MS))
}

/// Errors starting the collector.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("invalid bind address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Receives flow datagrams and decodes them.
pub struct Collector<K> {
    socket: UdpSocket,
    max_datagram_size: usize,
    sink: K,
}

impl<K: FlowSink> Collector<K> {
    /// Bind the configured UDP address.
    pub async fn bind(config: &ListenerConfig, sink: K) -> Result<Self, CollectorError> {
        let address: SocketAddr =
            config
                .bind_address
                .parse()
                .map_err(|source| CollectorError::InvalidAddress {
                    address: config.bind_address.clone(),
                    source,
                })?;

        let socket = UdpSocket::bind(address)
            .await
            .map_err(|source| CollectorError::Bind { address, source })?;

        tracing::info!(
            address = ?socket.local_addr().ok(),
            max_datagram_size = config.max_datagram_size,
            "Collector bound"
        );

        Ok(Self {
            socket,
            max_datagram_size: config.max_datagram_size,
            sink,
        })
    }

    /// Get the local address the collector is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut buf = vec![0u8; self.max_datagram_size];
        let mut failures: u32 = 0;

        loop {
            tokio::select! {
                received = self.socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, peer)) => {
                            failures = 0;
                            self.handle(&buf[..len], peer);
                        }
                        Err(e) => {
                            failures = failures.saturating_add(1);
                            let delay = receive_backoff(failures);
                            tracing::warn!(error = %e, failures, delay = ?delay, "Receive failed");
                            tokio::select! {
                                _ = tokio::time::sleep(delay) => {}
                                _ = shutdown.recv() => {
                                    tracing::info!("Collector received shutdown signal, exiting loop");
                                    break;
                                }
                            }
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Collector received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn handle(&self, payload: &[u8], peer: SocketAddr) {
        match decode(payload) {
            Ok(record) => {
                metrics::record_received();
                self.sink.accept(record, peer);
            }
            Err(e) => {
                metrics::record_decode_error();
                tracing::debug!(peer = %peer, len = payload.len(), error = %e, "Dropping malformed datagram");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_rejects_bad_address() {
        let config = ListenerConfig {
            bind_address: "nowhere".into(),
            ..ListenerConfig::default()
        };
        let err = Collector::bind(&config, LogSink).await.err().unwrap();
        assert!(matches!(err, CollectorError::InvalidAddress { .. }));
    }

    #[test]
    fn test_receive_backoff_grows_and_caps() {
        assert_eq!(receive_backoff(0), Duration::ZERO);
        assert_eq!(receive_backoff(1), Duration::from_millis(10));
        assert_eq!(receive_backoff(2), Duration::from_millis(20));
        assert_eq!(receive_backoff(5), Duration::from_millis(160));
        assert_eq!(receive_backoff(8), Duration::from_millis(1_000));
        assert_eq!(receive_backoff(u32::MAX), Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
            ..ListenerConfig::default()
        };
        let collector = Collector::bind(&config, LogSink).await.unwrap();
        assert_ne!(collector.local_addr().unwrap().port(), 0);
    }
}
