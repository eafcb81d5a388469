//! HTTP transports for probe calls.
//!
//! - [`H2cClient`]: cleartext HTTP/2 with prior knowledge, one connection per
//!   call, trailers collected.
//! - [`Http1Client`]: pooled HTTP/1.1 via hyper_util's legacy client, with
//!   redirect following.
//!
//! Both resolve to a [`ConnectionResponse`](crate::ConnectionResponse) and
//! enforce the same per-call deadline.

mod h2c;
mod http1;

use std::time::Duration;

use http::uri::{Authority, Scheme};
use http::Uri;

use crate::TransportError;

pub use h2c::{H2cClient, H2cClientBuilder};
pub use http1::{Http1Client, Http1ClientBuilder};

/// Deadline applied to every call unless a builder overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build `http://{authority}{path}`.
pub(crate) fn absolute_uri(authority: &Authority, path: &str) -> Result<Uri, TransportError> {
    Ok(Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(authority.clone())
        .path_and_query(path)
        .build()?)
}
