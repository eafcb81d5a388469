//! Uniform response shape for both transports.
//!
//! This module provides [`ConnectionResponse`], which carries everything a
//! verifier can look at: status, headers, the complete body, and trailers.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Uri};

/// A fully received response.
///
/// Produced once per call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ConnectionResponse {
    status: StatusCode,
    headers: Metadata,
    body: Bytes,
    trailers: Metadata,
    uri: Uri,
}

impl ConnectionResponse {
    /// Assemble a response. Repeated header or trailer names keep the last value.
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        trailers: HeaderMap,
        uri: Uri,
    ) -> Self {
        Self {
            status,
            headers: Metadata::last_write_wins(headers),
            body,
            trailers: Metadata::last_write_wins(trailers),
            uri,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers, excluding HTTP/2 pseudo-headers.
    pub fn headers(&self) -> &Metadata {
        &self.headers
    }

    /// Body frames concatenated in arrival order.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// HTTP trailers. Always empty for HTTP/1.1.
    pub fn trailers(&self) -> &Metadata {
        &self.trailers
    }

    /// The URI that produced this response, after any redirects.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Body as text, for assertion messages.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Case-insensitive name to value mapping with one value per name.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    headers: HeaderMap,
}

impl Metadata {
    /// Collapse repeated names, keeping the value seen last.
    pub fn last_write_wins(source: HeaderMap) -> Self {
        let mut headers = HeaderMap::with_capacity(source.keys_len());
        for (name, value) in &source {
            headers.insert(name.clone(), value.clone());
        }
        Self { headers }
    }

    /// Get a value by name.
    ///
    /// Returns `None` if the name is absent or the value is not visible ASCII.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.headers.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }
}
