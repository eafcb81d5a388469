//! Cleartext HTTP/2 client.
//!
//! Each call dials a fresh TCP connection, performs the HTTP/2 handshake with
//! prior knowledge, sends one request and reads the response to completion,
//! trailers included. The connection is torn down on every exit path.

use std::future::Future;
use std::time::Duration;

use http::uri::Authority;
use http_body_util::BodyExt;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use super::{DEFAULT_TIMEOUT, absolute_uri};
use crate::{ConnectionResponse, ProbeRequest, TransportError};

/// One-shot h2c client.
///
/// Holds configuration only; no connection outlives a call.
///
/// # Example
///
/// ```ignore
/// use gateway_probe_client::{H2cClient, ProbeRequest};
///
/// let client = H2cClient::new();
/// let response = client
///     .request(
///         &"localhost:8888".parse()?,
///         ProbeRequest::post("/zitadel.admin.v1.AdminService/Healthz")
///             .header("content-type", "application/grpc+proto")
///             .header("te", "trailers")
///             .body(vec![0u8; 5]),
///     )
///     .await?;
/// println!("grpc-status: {:?}", response.trailers().get("grpc-status"));
/// ```
#[derive(Clone, Debug)]
pub struct H2cClient {
    timeout: Duration,
}

impl Default for H2cClient {
    fn default() -> Self {
        Self::new()
    }
}

impl H2cClient {
    /// Create a client with the default 30 second deadline.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> H2cClientBuilder {
        H2cClientBuilder::new()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `request` to `authority` over a dedicated h2c connection.
    ///
    /// # Errors
    /// - [`TransportError::Connect`] / [`TransportError::Handshake`] if the
    ///   connection cannot be established.
    /// - [`TransportError::Timeout`] if the exchange exceeds the deadline.
    /// - [`TransportError::Request`] / [`TransportError::Body`] if the peer
    ///   resets the stream or the connection drops mid-call.
    pub async fn request(
        &self,
        authority: &Authority,
        request: ProbeRequest,
    ) -> Result<ConnectionResponse, TransportError> {
        match tokio::time::timeout(self.timeout, self.exchange(authority, &request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                method: request.method().clone(),
                path: request.path().to_string(),
                after: self.timeout,
            }),
        }
    }

    async fn exchange(
        &self,
        authority: &Authority,
        request: &ProbeRequest,
    ) -> Result<ConnectionResponse, TransportError> {
        let uri = absolute_uri(authority, request.path())?;
        let http_request = request.to_http(uri.clone())?;

        let host = authority.host().trim_start_matches('[').trim_end_matches(']');
        let stream = TcpStream::connect((host, authority.port_u16().unwrap_or(80)))
            .await
            .map_err(|e| TransportError::Connect {
                authority: authority.to_string(),
                message: e.to_string(),
            })?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) =
            hyper::client::conn::http2::handshake(TokioExecutor::new(), io)
                .await
                .map_err(|e| TransportError::Handshake {
                    authority: authority.to_string(),
                    message: e.to_string(),
                })?;

        // Dropped on every return below, closing the socket.
        let _conn = ConnectionGuard::spawn(conn);

        #[cfg(feature = "tracing")]
        tracing::debug!(method = %request.method(), %uri, "h2c request");

        let response = sender
            .send_request(http_request)
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let (parts, body) = response.into_parts();
        let collected = body
            .collect()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        let trailers = collected.trailers().cloned().unwrap_or_default();

        Ok(ConnectionResponse::new(
            parts.status,
            parts.headers,
            collected.to_bytes(),
            trailers,
            uri,
        ))
    }
}

/// Owns the task driving an HTTP/2 connection and aborts it on drop.
struct ConnectionGuard {
    handle: JoinHandle<()>,
}

impl ConnectionGuard {
    fn spawn<F>(conn: F) -> Self
    where
        F: Future<Output = Result<(), hyper::Error>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if let Err(_e) = conn.await {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_e, "h2c connection closed with error");
            }
        });
        Self { handle }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Builder for [`H2cClient`].
#[derive(Debug)]
pub struct H2cClientBuilder {
    timeout: Duration,
}

impl Default for H2cClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl H2cClientBuilder {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    ///
    /// Default: 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> H2cClient {
        H2cClient {
            timeout: self.timeout,
        }
    }
}
