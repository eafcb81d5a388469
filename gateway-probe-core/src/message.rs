//! Request payloads for parameterless probe calls.

use bytes::Bytes;
use prost::Message;
use serde::Serialize;

use crate::error::MessageError;

/// Payload encoding, as selected by the request content type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    Proto,
    Json,
}

impl Encoding {
    /// Content-type suffix and display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Proto => "proto",
            Encoding::Json => "json",
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message with no fields set.
///
/// Every probed procedure accepts its request message with all fields left at
/// their defaults, so this is the only request the prober ever sends. It also
/// serves as a permissive decode target: unknown fields are skipped, which
/// checks only that a response payload is well-formed protobuf.
#[derive(Clone, PartialEq, Message, Serialize)]
pub struct EmptyMessage {}

/// Encode a message for the wire.
///
/// `Proto` yields the protobuf encoding (zero bytes for [`EmptyMessage`]);
/// `Json` yields the JSON object (`{}` for [`EmptyMessage`]).
pub fn encode_message<M>(message: &M, encoding: Encoding) -> Result<Bytes, MessageError>
where
    M: Message + Serialize,
{
    match encoding {
        Encoding::Proto => Ok(Bytes::from(message.encode_to_vec())),
        Encoding::Json => Ok(Bytes::from(serde_json::to_vec(message)?)),
    }
}

/// Decode a protobuf payload.
pub fn decode_proto<M>(payload: &[u8]) -> Result<M, MessageError>
where
    M: Message + Default,
{
    Ok(M::decode(payload)?)
}
