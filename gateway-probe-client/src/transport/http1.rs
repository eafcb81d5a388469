//! HTTP/1.1 client with redirect following.
//!
//! This wraps hyper_util's legacy client in tower-http's `FollowRedirect`.
//! Unlike the h2c path it pools connections: HTTP/1.1 is delegated to an
//! ordinary client.

use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use http::header::LOCATION;
use http::uri::Authority;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tower::ServiceExt;
use tower_http::follow_redirect::policy::{Action, Attempt, Policy};
use tower_http::follow_redirect::{FollowRedirect, RequestUri};

use super::{DEFAULT_TIMEOUT, absolute_uri};
use crate::{ConnectionResponse, ProbeRequest, TransportError};

/// Pooled hyper client behind the redirect layer.
type RedirectingClient = FollowRedirect<Client<HttpConnector, Full<Bytes>>, RedirectLimit>;

/// HTTP/1.1 client that follows redirects like a browser would.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct Http1Client {
    client: RedirectingClient,
    timeout: Duration,
    max_redirects: usize,
}

impl std::fmt::Debug for Http1Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Http1Client")
            .field("timeout", &self.timeout)
            .field("max_redirects", &self.max_redirects)
            .finish_non_exhaustive()
    }
}

impl Default for Http1Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Http1Client {
    /// Create a client with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> Http1ClientBuilder {
        Http1ClientBuilder::new()
    }

    /// Send `request` to `authority`, following redirects.
    ///
    /// The deadline covers the whole redirect chain. A redirect still
    /// pending once the limit is spent is a [`TransportError::Redirect`].
    pub async fn request(
        &self,
        authority: &Authority,
        request: ProbeRequest,
    ) -> Result<ConnectionResponse, TransportError> {
        match tokio::time::timeout(self.timeout, self.follow(authority, &request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                method: request.method().clone(),
                path: request.path().to_string(),
                after: self.timeout,
            }),
        }
    }

    async fn follow(
        &self,
        authority: &Authority,
        request: &ProbeRequest,
    ) -> Result<ConnectionResponse, TransportError> {
        let uri = absolute_uri(authority, request.path())?;
        let response = self
            .client
            .clone()
            .oneshot(request.to_http(uri.clone())?)
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let (parts, incoming) = response.into_parts();
        let final_uri = parts
            .extensions
            .get::<RequestUri>()
            .map(|RequestUri(uri)| uri.clone())
            .unwrap_or(uri);

        if is_redirect(parts.status) && parts.headers.contains_key(LOCATION) {
            return Err(TransportError::Redirect(format!(
                "redirect from {final_uri} not followed after {} hops",
                self.max_redirects
            )));
        }

        let body = incoming
            .collect()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?
            .to_bytes();
        Ok(ConnectionResponse::new(
            parts.status,
            parts.headers,
            body,
            Default::default(),
            final_uri,
        ))
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Follows at most `remaining` redirects per call.
///
/// The body is replayed on 307 and 308; `FollowRedirect` itself switches
/// 303 (and 301/302 after a POST) to a bodiless GET.
#[derive(Clone, Copy, Debug)]
struct RedirectLimit {
    remaining: usize,
}

impl<E> Policy<Full<Bytes>, E> for RedirectLimit {
    fn redirect(&mut self, attempt: &Attempt<'_>) -> Result<Action, E> {
        if self.remaining == 0 {
            return Ok(Action::Stop);
        }
        self.remaining -= 1;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            status = %attempt.status(),
            from = %attempt.previous(),
            to = %attempt.location(),
            "following redirect"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = attempt;

        Ok(Action::Follow)
    }

    fn clone_body(&self, body: &Full<Bytes>) -> Option<Full<Bytes>> {
        Some(body.clone())
    }
}

/// Builder for [`Http1Client`].
#[derive(Debug)]
pub struct Http1ClientBuilder {
    timeout: Duration,
    max_redirects: usize,
    pool_idle_timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
}

impl Default for Http1ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Http1ClientBuilder {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: 10,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }

    /// Override the per-call deadline.
    ///
    /// Default: 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum number of redirects followed before giving up.
    ///
    /// Default: 10. With zero, any redirect is an error.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the connection pool idle timeout.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set the maximum number of idle connections per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    pub fn build(self) -> Http1Client {
        let mut builder = Client::builder(TokioExecutor::new());

        // Required for pool_idle_timeout to take effect
        builder.pool_timer(TokioTimer::new());
        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);

        let policy = RedirectLimit {
            remaining: self.max_redirects,
        };
        Http1Client {
            client: FollowRedirect::with_policy(builder.build(HttpConnector::new()), policy),
            timeout: self.timeout,
            max_redirects: self.max_redirects,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = Http1ClientBuilder::new();
        assert_eq!(builder.timeout, DEFAULT_TIMEOUT);
        assert_eq!(builder.max_redirects, 10);
        assert_eq!(builder.pool_max_idle_per_host, 32);
    }

    #[test]
    fn test_builder_overrides() {
        let client = Http1ClientBuilder::new()
            .timeout(Duration::from_secs(2))
            .max_redirects(0)
            .build();
        assert_eq!(client.timeout, Duration::from_secs(2));
        assert_eq!(client.max_redirects, 0);
    }

    #[tokio::test]
    async fn test_redirect_limit_replays_body() {
        let policy = RedirectLimit { remaining: 1 };
        let body = Full::new(Bytes::from_static(b"{}"));
        let replayed =
            <RedirectLimit as Policy<Full<Bytes>, Infallible>>::clone_body(&policy, &body)
                .unwrap();
        let bytes = replayed.collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), b"{}");
    }

    #[test]
    fn test_redirect_detection() {
        assert!(is_redirect(StatusCode::FOUND));
        assert!(is_redirect(StatusCode::PERMANENT_REDIRECT));
        assert!(!is_redirect(StatusCode::NOT_MODIFIED));
        assert!(!is_redirect(StatusCode::OK));
    }
}
