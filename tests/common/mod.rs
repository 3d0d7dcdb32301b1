//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use appflow::collector::{ChannelSink, Collector};
use appflow::config::ListenerConfig;
use appflow::lifecycle::Shutdown;
use appflow::FlowRecord;
use tokio::sync::mpsc;

/// Start a collector on an ephemeral localhost port that forwards decoded records.
pub async fn start_collector(
    shutdown: &Shutdown,
) -> (SocketAddr, mpsc::UnboundedReceiver<FlowRecord>) {
    let config = ListenerConfig {
        bind_address: "127.0.0.1:0".into(),
        ..ListenerConfig::default()
    };
    let (sink, records) = ChannelSink::new();
    let collector = Collector::bind(&config, sink).await.unwrap();
    let addr = collector.local_addr().unwrap();

    tokio::spawn(collector.run(shutdown.subscribe()));
    (addr, records)
}

/// Receive the next record, failing the test after two seconds.
pub async fn next_record(records: &mut mpsc::UnboundedReceiver<FlowRecord>) -> FlowRecord {
    tokio::time::timeout(Duration::from_secs(2), records.recv())
        .await
        .expect("no flow record within 2s")
        .expect("collector stopped")
}

/// An address nothing is listening on.
pub fn closed_udp_port() -> SocketAddr {
    std::net::UdpSocket::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
}
