//! Transport-neutral request description.

use bytes::Bytes;
use http::header::{HeaderValue, IntoHeaderName};
use http::{HeaderMap, Method, Uri};
use http_body_util::Full;

use crate::TransportError;

/// A single probe request, independent of the transport that will carry it.
///
/// The path is sent verbatim; the scheme and authority come from the target
/// the transport is pointed at.
///
/// # Example
///
/// ```
/// use gateway_probe_client::ProbeRequest;
///
/// let request = ProbeRequest::post("/v2/sessions")
///     .header("content-type", "application/json")
///     .body("{}");
/// assert_eq!(request.path(), "/v2/sessions");
/// ```
#[derive(Clone, Debug)]
pub struct ProbeRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl ProbeRequest {
    /// Create a request with no headers and no body.
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a `GET` request.
    pub fn get<P: Into<String>>(path: P) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a `POST` request.
    pub fn post<P: Into<String>>(path: P) -> Self {
        Self::new(Method::POST, path)
    }

    /// Set a header, replacing any previous value.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    /// Attach a body. It is written as a single chunk.
    pub fn body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Build the `http::Request` for an absolute URI.
    pub(crate) fn to_http(&self, uri: Uri) -> Result<http::Request<Full<Bytes>>, TransportError> {
        let mut builder = http::Request::builder()
            .method(self.method.clone())
            .uri(uri);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers.clone());
        }
        Ok(builder.body(Full::new(self.body.clone().unwrap_or_default()))?)
    }
}
