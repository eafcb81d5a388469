//! gRPC-Web inline trailer extraction.
//!
//! gRPC-Web cannot rely on HTTP trailers, so servers append a final frame to
//! the response body whose flag byte is `0x80`. Its payload is an HTTP/1-style
//! header block:
//!
//! ```text
//! grpc-status: 0\r\n
//! grpc-message: \r\n
//! ```

use std::collections::BTreeMap;

use crate::envelope::{FRAME_HEADER_SIZE, frame_flags, parse_frame_header};
use crate::error::FrameError;

/// Trailer name to value, as found in a gRPC-Web trailer frame.
pub type TrailerMap = BTreeMap<String, String>;

/// Walk a gRPC-Web response body and parse its trailer frame.
///
/// Data frames are skipped by their declared length. The first frame flagged
/// [`frame_flags::TRAILERS`] is parsed and returned. A body that ends without
/// a trailer frame yields an empty map: the caller decides whether absent
/// trailers matter.
///
/// # Errors
/// Returns [`FrameError::TruncatedHeader`] when a frame header is expected but
/// fewer than 5 bytes remain.
pub fn extract_trailers(buffer: &[u8]) -> Result<TrailerMap, FrameError> {
    let mut offset = 0;
    while offset < buffer.len() {
        let (flags, length) =
            parse_frame_header(&buffer[offset..]).map_err(|_| FrameError::TruncatedHeader {
                offset,
                remaining: buffer.len() - offset,
            })?;
        let start = offset + FRAME_HEADER_SIZE;
        let end = start.saturating_add(length as usize);

        if flags == frame_flags::TRAILERS {
            let block = &buffer[start..end.min(buffer.len())];
            return Ok(parse_trailer_block(&String::from_utf8_lossy(block)));
        }
        offset = end;
    }
    Ok(TrailerMap::new())
}

/// Parse `key: value` lines separated by CRLF.
///
/// Lines without a colon, or with an empty key, are skipped.
fn parse_trailer_block(text: &str) -> TrailerMap {
    let mut trailers = TrailerMap::new();
    for line in text.split("\r\n") {
        match line.find(':') {
            Some(colon) if colon > 0 => {
                trailers.insert(
                    line[..colon].trim().to_string(),
                    line[colon + 1..].trim().to_string(),
                );
            }
            _ => {}
        }
    }
    trailers
}
