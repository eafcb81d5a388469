//! Transport error types.
//!
//! This module provides [`TransportError`], the error type for every way a
//! probe call can fail before a complete response is in hand.

use std::time::Duration;

use http::Method;

/// Transport-level failure of a single call.
///
/// None of these are retried: a failed call is reported as-is.
#[derive(Clone, Debug, thiserror::Error)]
pub enum TransportError {
    /// TCP connection could not be established.
    #[error("connect to {authority} failed: {message}")]
    Connect { authority: String, message: String },

    /// HTTP/2 connection preface or settings exchange failed.
    #[error("h2c handshake with {authority} failed: {message}")]
    Handshake { authority: String, message: String },

    /// The call did not complete within the deadline.
    #[error("{method} {path} timed out after {after:?}")]
    Timeout {
        method: Method,
        path: String,
        after: Duration,
    },

    /// Sending the request or receiving response headers failed
    /// (includes stream resets and refused streams).
    #[error("request failed: {0}")]
    Request(String),

    /// Reading the response body or trailers failed.
    #[error("response body failed: {0}")]
    Body(String),

    /// The request could not be built (bad path, header, or URI).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A redirect could not be followed.
    #[error("redirect failed: {0}")]
    Redirect(String),
}

impl From<http::Error> for TransportError {
    fn from(err: http::Error) -> Self {
        TransportError::InvalidRequest(err.to_string())
    }
}
