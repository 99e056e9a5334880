//! Event sink: receive CloudEvents over HTTP and log them.
//!
//! - `POST /events` accepts binary, structured and batch requests
//! - `POST /binary` accepts binary-mode requests only
//!
//! Run with: cargo run --bin event-sink
//! Listen address: `EVENT_SINK_ADDR` (default `0.0.0.0:3000`)
//! Log filter: `RUST_LOG` (default `info,cloudevents_axum=debug`)

use axum::{Json, Router, routing::post};
use cloudevents_axum::prelude::*;
use serde_json::{Value, json};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

fn log_event(event: &CloudEvent) {
    tracing::info!(
        id = event.id(),
        source = event.source(),
        ty = event.ty(),
        specversion = event.spec_version(),
        subject = event.subject(),
        datacontenttype = event.data_content_type(),
        time = event.time().map(|t| t.to_rfc3339()),
        data_len = event.data().map(|d| d.len()),
        "received CloudEvent"
    );
}

async fn receive_events(CloudEvents(events): CloudEvents) -> Json<Value> {
    events.iter().for_each(log_event);
    let ids: Vec<&str> = events.iter().map(CloudEvent::id).collect();
    Json(json!({ "received": ids }))
}

async fn receive_binary(BinaryCloudEvent(event): BinaryCloudEvent) -> Json<Value> {
    log_event(&event);
    Json(json!({ "received": [event.id()] }))
}

/// Address a local client can reach when the sink binds a wildcard address.
fn connect_addr(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => (Ipv4Addr::LOCALHOST, addr.port()).into(),
        IpAddr::V6(ip) if ip.is_unspecified() => (Ipv6Addr::LOCALHOST, addr.port()).into(),
        _ => addr,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cloudevents_axum=debug")),
        )
        .init();

    let addr: SocketAddr = std::env::var("EVENT_SINK_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    let app = Router::new()
        .route("/events", post(receive_events))
        .route("/binary", post(receive_binary))
        .layer(
            CloudEventLayer::new()
                .receive_max_bytes(4 * 1024 * 1024)
                .max_batch_size(1000),
        );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "event sink listening");
    tracing::info!(
        "try: curl -X POST http://{}/events \
         -H 'ce-id: 1' -H 'ce-source: /curl' -H 'ce-type: com.example.test' \
         -H 'content-type: text/plain' -d 'Hello World'",
        connect_addr(addr)
    );

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_addr() {
        let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        assert_eq!(connect_addr(addr).to_string(), "127.0.0.1:8080");

        let addr: SocketAddr = "[::]:9000".parse().unwrap();
        assert_eq!(connect_addr(addr).to_string(), "[::1]:9000");

        let addr: SocketAddr = "192.168.1.5:3000".parse().unwrap();
        assert_eq!(connect_addr(addr), addr);
    }
}
