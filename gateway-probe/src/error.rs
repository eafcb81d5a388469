//! Check failure types.
//!
//! A check fails with a [`CheckError`]. Each variant can only arise in one
//! stage of a check, so [`CheckError::stage`] tells where it stopped.

use std::fmt;

use gateway_probe_client::TransportError;
use gateway_probe_core::{FrameError, MessageError};

/// Longest body excerpt quoted in a mismatch.
const BODY_EXCERPT_LEN: usize = 200;

/// Lifecycle stage of a single check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Headers and body assembled.
    Built,
    /// Call in flight.
    Dispatched,
    /// Assertion evaluated.
    Verified,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Built => "build",
            Stage::Dispatched => "dispatch",
            Stage::Verified => "verify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The expected and actual status, trailer or body differ.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: expected {expected}, got {actual}")]
pub struct Mismatch {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

impl Mismatch {
    pub fn new(
        field: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Append a body excerpt to `actual` so the report shows what came back.
    pub fn with_body(mut self, body: &[u8]) -> Self {
        if body.is_empty() {
            return self;
        }
        let text = String::from_utf8_lossy(body);
        let excerpt: String = text.chars().take(BODY_EXCERPT_LEN).collect();
        let ellipsis = if excerpt.len() < text.len() { "..." } else { "" };
        self.actual = format!("{} (body: {excerpt}{ellipsis})", self.actual);
        self
    }
}

/// Why a check failed.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The request payload could not be encoded.
    #[error("encoding request failed: {0}")]
    Encode(#[from] MessageError),

    /// Connection refused, reset or timed out.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed gRPC or gRPC-Web framing in the response.
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Mismatch(#[from] Mismatch),
}

impl CheckError {
    /// The stage the check was in when this error surfaced.
    pub fn stage(&self) -> Stage {
        match self {
            CheckError::Encode(_) => Stage::Built,
            CheckError::Transport(_) => Stage::Dispatched,
            CheckError::Frame(_) | CheckError::Mismatch(_) => Stage::Verified,
        }
    }
}
