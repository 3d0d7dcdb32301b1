//! Demo HTTP server instrumented with a flow emitter.
//!
//! Every request is echoed back and emitted to the collector.

use std::net::SocketAddr;

use axum::{
    extract::ConnectInfo,
    http::{Method, Uri},
    routing::any,
    Router,
};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use appflow::emitter::{EmitError, Emitter, FlowLayer};
use appflow::flow::FlowRecord;
use appflow::lifecycle::{trigger_on_ctrl_c, Shutdown};
use appflow::observability::logging;

#[derive(Parser)]
#[command(name = "appflow-echo")]
#[command(about = "Echo server that exports HTTP flow records", long_about = None)]
struct Cli {
    /// HTTP listen address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Collector UDP address
    #[arg(short, long, default_value = "127.0.0.1:9995")]
    collector: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let emitter = Emitter::create(&cli.collector)?.with_drop_observer(
        |record: &FlowRecord, error: &EmitError| {
            tracing::debug!(url = %record.url, error = %error, "Flow record not delivered");
        },
    );

    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo))
        .layer(FlowLayer::new(emitter.clone()))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&cli.listen).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        collector = %emitter.destination(),
        "Echo server listening"
    );

    let shutdown = Shutdown::new();
    let mut stop = shutdown.subscribe();
    tokio::spawn(trigger_on_ctrl_c(shutdown.clone()));

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = stop.recv().await;
        })
        .await?;

    tracing::info!("Echo server stopped");
    Ok(())
}

async fn echo(ConnectInfo(peer): ConnectInfo<SocketAddr>, method: Method, uri: Uri) -> String {
    format!("{} {} from {}\n", method, uri, peer)
}
