//! End-to-end: axum server with `FlowLayer` → collector.

use std::net::SocketAddr;

use appflow::lifecycle::Shutdown;
use appflow::{Emitter, FlowLayer};
use axum::{routing::post, Router};
use tokio::net::TcpListener;

mod common;

async fn start_app(emitter: Emitter, shutdown: &Shutdown) -> SocketAddr {
    let app = Router::new()
        .route("/api/v1/items", post(|body: String| async move { body }))
        .layer(FlowLayer::new(emitter));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut stop = shutdown.subscribe();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await
            .unwrap();
    });
    addr
}

#[tokio::test]
async fn test_served_request_is_exported() {
    let shutdown = Shutdown::new();
    let (collector_addr, mut records) = common::start_collector(&shutdown).await;
    let emitter = Emitter::create(&collector_addr.to_string()).unwrap();
    let app_addr = start_app(emitter, &shutdown).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let body = r#"{"name":"widget","qty":3}"#;
    let res = client
        .post(format!("http://{}/api/v1/items?x=1", app_addr))
        .header("content-type", "application/json")
        .header("x-tag", "a")
        .body(body)
        .send()
        .await
        .expect("app unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), body);

    let record = common::next_record(&mut records).await;
    assert_eq!(record.method, "POST");
    assert_eq!(record.url, "/api/v1/items?x=1");
    assert_eq!(record.proto, "HTTP/1.1");
    assert_eq!(record.host, app_addr.to_string());
    assert_eq!(record.content_length, body.len() as i64);
    assert_eq!(record.header["Content-Type"], vec!["application/json"]);
    assert_eq!(record.header["X-Tag"], vec!["a"]);
    assert!(!record.header.contains_key("Host"));

    let remote: SocketAddr = record.remote_addr.parse().unwrap();
    assert!(remote.ip().is_loopback());

    shutdown.trigger();
}

#[tokio::test]
async fn test_requests_succeed_without_collector() {
    let shutdown = Shutdown::new();
    let emitter = Emitter::create(&common::closed_udp_port().to_string()).unwrap();
    let app_addr = start_app(emitter, &shutdown).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    for i in 0..10 {
        let res = client
            .post(format!("http://{}/api/v1/items", app_addr))
            .body(i.to_string())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.text().await.unwrap(), i.to_string());
    }

    shutdown.trigger();
}
