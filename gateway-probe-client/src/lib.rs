//! HTTP transports for gateway conformance probes.
//!
//! This crate sends one request at a time to a gateway over either
//! HTTP/1.1 or cleartext HTTP/2 (h2c, prior knowledge) and hands back a fully
//! buffered [`ConnectionResponse`]: status, headers, body and trailers.
//!
//! ## Features
//!
//! - h2c with a fresh connection per call, closed on every exit path
//! - HTTP/1.1 with connection pooling and redirect following
//! - A single per-call deadline (30 seconds by default)
//! - Optional `tracing` feature for debug logs of dispatch and redirects
//!
//! ## Example
//!
//! ```ignore
//! use gateway_probe_client::{Http1Client, ProbeRequest};
//!
//! let client = Http1Client::new();
//! let response = client
//!     .request(&"localhost:8888".parse()?, ProbeRequest::get("/admin/v1/healthz"))
//!     .await?;
//! assert_eq!(response.status(), 200);
//! ```

mod error;
mod request;
mod response;
pub mod transport;

pub use error::TransportError;
pub use request::ProbeRequest;
pub use response::{ConnectionResponse, Metadata};
pub use transport::{
    DEFAULT_TIMEOUT, H2cClient, H2cClientBuilder, Http1Client, Http1ClientBuilder,
};

// Re-export the request vocabulary callers build with.
pub use http::uri::Authority;
pub use http::{Method, StatusCode, header};
