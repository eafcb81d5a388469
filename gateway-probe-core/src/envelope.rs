//! gRPC length-prefixed message framing.
//!
//! Native gRPC and gRPC-Web both carry messages in the same frame shape:
//!
//! ```text
//! [flags:1][length:4][payload:length]
//! ```
//!
//! The length is a big-endian `u32`. gRPC-Web reuses the header for its inline
//! trailer frame, distinguished by the [`frame_flags::TRAILERS`] bit.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;

/// gRPC frame flag values.
pub mod frame_flags {
    /// Uncompressed message.
    pub const MESSAGE: u8 = 0x00;
    /// Compressed message.
    pub const COMPRESSED: u8 = 0x01;
    /// gRPC-Web inline trailers.
    pub const TRAILERS: u8 = 0x80;
}

/// Frame header size (flags + length).
pub const FRAME_HEADER_SIZE: usize = 5;

/// Wrap a payload in an uncompressed gRPC frame.
///
/// An empty payload produces a bare 5-byte header, which is the valid encoding
/// of an empty message.
pub fn encode_frame(payload: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.put_u8(frame_flags::MESSAGE);
    frame.put_u32(payload.len() as u32);
    frame.put_slice(payload);
    frame.freeze()
}

/// Read the `(flags, length)` header at the start of `data`.
///
/// # Errors
/// Returns [`FrameError::TooShort`] if fewer than 5 bytes are available.
pub fn parse_frame_header(data: &[u8]) -> Result<(u8, u32), FrameError> {
    if data.len() < FRAME_HEADER_SIZE {
        return Err(FrameError::TooShort { actual: data.len() });
    }

    let flags = data[0];
    let length = u32::from_be_bytes([data[1], data[2], data[3], data[4]]);

    Ok((flags, length))
}

/// Decode the first frame of a gRPC response body and return its payload.
///
/// Any bytes after the first frame are ignored.
///
/// # Errors
/// - [`FrameError::TooShort`] if the buffer cannot hold a header.
/// - [`FrameError::Truncated`] if the declared length exceeds the bytes present.
pub fn decode_frame(buffer: &Bytes) -> Result<Bytes, FrameError> {
    let (_, length) = parse_frame_header(buffer)?;
    let end = FRAME_HEADER_SIZE + length as usize;
    if buffer.len() < end {
        return Err(FrameError::Truncated {
            expected: end,
            actual: buffer.len(),
        });
    }
    Ok(buffer.slice(FRAME_HEADER_SIZE..end))
}
