//! Run configuration.
//!
//! The target gateway comes from the environment:
//!
//! - `PROBE_BASE_URL`: full base URL, e.g. `http://gateway.local:8080`
//! - `PROXY_HTTP_PUBLISHED_PORT`: port on `localhost` when no base URL is
//!   given (default `8888`)
//! - `PROBE_SKIP_SERVICES`: `1` or `true` skips the service checks

use gateway_probe_client::Authority;
use http::Uri;
use http::uri::Scheme;

pub const BASE_URL_ENV: &str = "PROBE_BASE_URL";
pub const PORT_ENV: &str = "PROXY_HTTP_PUBLISHED_PORT";
pub const SKIP_SERVICES_ENV: &str = "PROBE_SKIP_SERVICES";

/// Published port of the local gateway.
pub const DEFAULT_PORT: u16 = 8888;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("base URL {0:?} must use the http scheme")]
    UnsupportedScheme(String),

    #[error("base URL {0:?} has no host")]
    MissingAuthority(String),

    #[error("invalid PROXY_HTTP_PUBLISHED_PORT {0:?}")]
    InvalidPort(String),
}

/// Where and what to probe.
#[derive(Clone, Debug)]
pub struct ProbeConfig {
    base_url: Uri,
    authority: Authority,
    skip_services: bool,
}

impl ProbeConfig {
    /// Probe `base_url`. Only its authority is used; any path is ignored.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let uri: Uri = base_url.parse().map_err(|e: http::uri::InvalidUri| {
            ConfigError::InvalidUrl {
                url: base_url.to_string(),
                message: e.to_string(),
            }
        })?;
        if uri.scheme() != Some(&Scheme::HTTP) {
            return Err(ConfigError::UnsupportedScheme(base_url.to_string()));
        }
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| ConfigError::MissingAuthority(base_url.to_string()))?;
        Ok(Self {
            base_url: uri,
            authority,
            skip_services: false,
        })
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = match lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            Some(url) => Self::new(&url)?,
            None => {
                let port = match lookup(PORT_ENV).filter(|v| !v.is_empty()) {
                    Some(port) => port
                        .parse::<u16>()
                        .map_err(|_| ConfigError::InvalidPort(port))?,
                    None => DEFAULT_PORT,
                };
                Self::new(&format!("http://localhost:{port}"))?
            }
        };
        let skip = lookup(SKIP_SERVICES_ENV)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        Ok(config.with_skip_services(skip))
    }

    pub fn with_skip_services(mut self, skip: bool) -> Self {
        self.skip_services = skip;
        self
    }

    /// Replace the target.
    pub fn with_base_url(self, base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(base_url)?.with_skip_services(self.skip_services))
    }

    pub fn base_url(&self) -> &Uri {
        &self.base_url
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn skip_services(&self) -> bool {
        self.skip_services
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: Uri::from_static("http://localhost:8888"),
            authority: Authority::from_static("localhost:8888"),
            skip_services: false,
        }
    }
}
