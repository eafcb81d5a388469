//! Wire codecs for the gateway conformance prober.
//!
//! This crate has no I/O. It provides the byte-level pieces the prober needs
//! to speak gRPC and gRPC-Web without a gRPC library:
//!
//! ## Modules
//!
//! - [`envelope`]: gRPC length-prefixed frame encoding and decoding
//! - [`trailers`]: gRPC-Web inline trailer frame extraction
//! - [`message`]: empty request payloads in proto or JSON encoding
//! - [`error`]: Status codes and frame errors

mod envelope;
mod error;
mod message;
mod trailers;

pub use envelope::*;
pub use error::*;
pub use message::*;
pub use trailers::*;
