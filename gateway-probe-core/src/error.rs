//! Status codes and wire-level errors.
//!
//! - [`Code`]: the gRPC / Connect status codes probes assert on
//! - [`FrameError`]: malformed gRPC and gRPC-Web frames

/// The status codes a probe asserts on.
///
/// gRPC carries the numeric value in `grpc-status` and gRPC-gateway in its
/// JSON error body; Connect puts the snake_case name in its JSON error body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    /// The call reached the backend and succeeded.
    Ok = 0,
    /// The gateway or backend rejected the call for missing credentials.
    Unauthenticated = 16,
}

impl Code {
    /// Connect wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "ok",
            Code::Unauthenticated => "unauthenticated",
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// The `grpc-status` value for this code.
    pub fn grpc_status(&self) -> String {
        self.as_i32().to_string()
    }
}

/// Malformed frame errors.
///
/// These indicate a real protocol defect on the peer and are never retried.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Buffer too short to hold a frame header.
    #[error("gRPC response frame too short ({actual} bytes)")]
    TooShort { actual: usize },

    /// Declared payload length exceeds the buffer.
    #[error("gRPC response frame truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// A gRPC-Web frame header was cut off while walking the body.
    #[error(
        "truncated gRPC-Web frame at offset {offset}: need 5 header bytes but only {remaining} remain"
    )]
    TruncatedHeader { offset: usize, remaining: usize },
}

/// Message payload encoding and decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protobuf decoding failed: {0}")]
    Proto(#[from] prost::DecodeError),
}
