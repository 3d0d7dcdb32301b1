//! Flow record data model and request capture.
//!
//! # Responsibilities
//! - Define the `FlowRecord` value carried on the wire
//! - Capture a record from an inbound `http::Request`
//!
//! # Design Decisions
//! - A record owns its data; nothing borrows from the live request
//! - Every field is always present (empty values are valid, not absence markers)
//! - Content length is an opaque signed integer: -1 means unknown

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request, Uri, Version};
use serde::{Deserialize, Serialize};

/// Header name to every value received for it, in arrival order.
pub type FlowHeaders = BTreeMap<String, Vec<String>>;

/// Content length reported when the body size is not declared up front.
pub const UNKNOWN_CONTENT_LENGTH: i64 = -1;

/// Metadata of one observed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowRecord {
    /// HTTP method token, e.g. `GET`.
    pub method: String,

    /// Request target (path and query).
    pub url: String,

    /// Protocol version string, e.g. `HTTP/1.1`.
    pub proto: String,

    /// All header values keyed by header name.
    pub header: FlowHeaders,

    /// Declared body length (-1 when unknown).
    #[serde(rename = "contentLength")]
    pub content_length: i64,

    /// Host the request was addressed to.
    pub host: String,

    /// Client address in `host:port` form. Advisory only, may be a proxy.
    #[serde(rename = "remoteAddr")]
    pub remote_addr: String,
}

/// Anything that can describe an inbound request as a flow record.
///
/// Implemented for `http::Request<B>`; other request types can implement it
/// to be emitted through the same `Emitter`.
pub trait FlowSource {
    /// Capture the request metadata as a `FlowRecord`.
    fn to_flow_record(&self) -> FlowRecord;
}

impl FlowSource for FlowRecord {
    fn to_flow_record(&self) -> FlowRecord {
        self.clone()
    }
}

impl<B> FlowSource for Request<B> {
    fn to_flow_record(&self) -> FlowRecord {
        FlowRecord::from_request(self)
    }
}

impl FlowRecord {
    /// Capture a record from an `http::Request`.
    ///
    /// The remote address comes from axum's `ConnectInfo<SocketAddr>` extension
    /// and is left empty when the server was not built with connect info.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let headers = request.headers();
        let remote_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_default();

        Self {
            method: request.method().as_str().to_string(),
            url: request_target(request.uri()),
            proto: proto_string(request.version()),
            header: capture_headers(headers),
            content_length: declared_content_length(headers),
            host: request_host(headers, request.uri()),
            remote_addr,
        }
    }
}

/// Path and query of the URI, or the whole URI when it has no path (authority form).
fn request_target(uri: &Uri) -> String {
    match uri.path_and_query() {
        Some(pq) => pq.as_str().to_string(),
        None => uri.to_string(),
    }
}

fn proto_string(version: Version) -> String {
    // `Version`'s Debug output is the canonical "HTTP/x.y" token.
    format!("{:?}", version)
}

/// Every header except `Host`, which is carried in `FlowRecord::host` instead.
fn capture_headers(headers: &HeaderMap) -> FlowHeaders {
    let mut captured = FlowHeaders::new();
    for name in headers.keys() {
        if *name == header::HOST {
            continue;
        }
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        captured.insert(canonical_header_name(name.as_str()), values);
    }
    captured
}

/// `content-type` → `Content-Type`: upper-case the first letter and every
/// letter following a hyphen, lower-case the rest.
fn canonical_header_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            canonical.push(c.to_ascii_uppercase());
        } else {
            canonical.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    canonical
}

/// `Content-Length` if declared, -1 for bodies of undeclared size, 0 when there is no body.
fn declared_content_length(headers: &HeaderMap) -> i64 {
    match headers.get(header::CONTENT_LENGTH) {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(UNKNOWN_CONTENT_LENGTH),
        None if headers.contains_key(header::TRANSFER_ENCODING) => UNKNOWN_CONTENT_LENGTH,
        None => 0,
    }
}

/// Host header first (HTTP/1.1), then the URI authority (HTTP/2 `:authority`).
fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .map(|h| String::from_utf8_lossy(h.as_bytes()).into_owned())
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default()
}
