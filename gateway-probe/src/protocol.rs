//! Per-protocol request building and response verification.
//!
//! Each [`Protocol`] has a [`ProtocolDriver`] that knows how to shape a
//! request for an [`Endpoint`] and what signal proves the call was routed
//! correctly. The executor only talks to this trait.

mod connect;
mod grpc;
mod grpc_web;
mod rest;

use gateway_probe_client::{ConnectionResponse, Metadata, ProbeRequest, StatusCode};
use gateway_probe_core::{Code, Encoding};
use serde::Deserialize;

use crate::error::{CheckError, Mismatch};
use crate::matrix::{Endpoint, EndpointClass, Protocol};

pub use connect::Connect;
pub use grpc::Grpc;
pub use grpc_web::GrpcWeb;
pub use rest::Rest;

/// Capability set of one wire protocol.
pub trait ProtocolDriver: Send + Sync {
    /// Assemble headers and body for a call to `endpoint`.
    fn build_request(
        &self,
        endpoint: &Endpoint,
        encoding: Encoding,
    ) -> Result<ProbeRequest, CheckError>;

    /// Assert the protocol's success or authentication-failure signal.
    fn verify_response(
        &self,
        class: EndpointClass,
        encoding: Encoding,
        response: &ConnectionResponse,
    ) -> Result<(), CheckError>;
}

impl Protocol {
    /// The driver for this protocol.
    pub fn driver(&self) -> &'static dyn ProtocolDriver {
        match self {
            Protocol::Rest => &Rest,
            Protocol::GrpcWeb => &GrpcWeb,
            Protocol::Grpc => &Grpc,
            Protocol::Connect => &Connect,
        }
    }
}

/// Shape of the JSON error body returned by both gRPC-gateway (numeric
/// code) and Connect (string code).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
}

pub(crate) fn expect_status(
    response: &ConnectionResponse,
    expected: StatusCode,
) -> Result<(), Mismatch> {
    if response.status() == expected {
        return Ok(());
    }
    Err(Mismatch::new("HTTP status", expected.as_u16(), response.status().as_u16())
        .with_body(response.body()))
}

/// Assert the JSON body carries `"code": expected`.
pub(crate) fn expect_json_code(
    response: &ConnectionResponse,
    expected: serde_json::Value,
) -> Result<(), Mismatch> {
    let body: ErrorBody = serde_json::from_slice(response.body()).map_err(|e| {
        Mismatch::new("error body", "JSON object", format!("unparseable ({e})"))
            .with_body(response.body())
    })?;
    match body.code {
        Some(code) if code == expected => Ok(()),
        Some(code) => Err(Mismatch::new("error code", expected, code)),
        None => Err(Mismatch::new("error code", expected, "<absent>").with_body(response.body())),
    }
}

/// Read `grpc-status`, preferring trailers over headers.
///
/// A "Trailers-Only" response carries the status in the header block.
pub(crate) fn grpc_status<'a>(trailers: &'a Metadata, headers: &'a Metadata) -> Option<&'a str> {
    trailers
        .get("grpc-status")
        .or_else(|| headers.get("grpc-status"))
}

pub(crate) fn expect_grpc_status(actual: Option<&str>, expected: Code) -> Result<(), Mismatch> {
    match actual {
        Some(status) if status == expected.grpc_status() => Ok(()),
        Some(status) => Err(Mismatch::new("grpc-status", expected.grpc_status(), status)),
        None => Err(Mismatch::new("grpc-status", expected.grpc_status(), "<absent>")),
    }
}

/// `application/grpc+{encoding}` style content type.
pub(crate) fn framed_content_type(prefix: Prefix, encoding: Encoding) -> &'static str {
    match (prefix, encoding) {
        (Prefix::Grpc, Encoding::Proto) => "application/grpc+proto",
        (Prefix::Grpc, Encoding::Json) => "application/grpc+json",
        (Prefix::GrpcWeb, Encoding::Proto) => "application/grpc-web+proto",
        (Prefix::GrpcWeb, Encoding::Json) => "application/grpc-web+json",
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Prefix {
    Grpc,
    GrpcWeb,
}


#[cfg(test)]
mod tests {
    use super::test_util::{response, response_with};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expect_status() {
        assert!(expect_status(&response(200, ""), StatusCode::OK).is_ok());

        let err = expect_status(&response(404, "page not found"), StatusCode::OK).unwrap_err();
        assert_eq!(err.expected, "200");
        assert_eq!(err.actual, "404 (body: page not found)");
    }

    #[test]
    fn test_expect_json_code() {
        let rest = response(401, r#"{"code":16,"message":"unauthenticated"}"#);
        assert!(expect_json_code(&rest, json!(16)).is_ok());
        assert!(expect_json_code(&rest, json!("unauthenticated")).is_err());

        let connect = response(401, r#"{"code":"unauthenticated"}"#);
        assert!(expect_json_code(&connect, json!("unauthenticated")).is_ok());

        let err = expect_json_code(&response(401, "<html>"), json!(16)).unwrap_err();
        assert_eq!(err.field, "error body");

        let err = expect_json_code(&response(401, "{}"), json!(16)).unwrap_err();
        assert!(err.actual.starts_with("<absent>"));
    }

    #[test]
    fn test_grpc_status_prefers_trailers() {
        let both = response_with(200, &[("grpc-status", "16")], "", &[("grpc-status", "0")]);
        assert_eq!(grpc_status(both.trailers(), both.headers()), Some("0"));

        let trailers_only = response_with(200, &[("grpc-status", "16")], "", &[]);
        assert_eq!(
            grpc_status(trailers_only.trailers(), trailers_only.headers()),
            Some("16")
        );

        let neither = response(200, "");
        assert_eq!(grpc_status(neither.trailers(), neither.headers()), None);
    }

    #[test]
    fn test_expect_grpc_status() {
        assert!(expect_grpc_status(Some("0"), Code::Ok).is_ok());
        assert!(expect_grpc_status(Some("16"), Code::Unauthenticated).is_ok());

        let err = expect_grpc_status(Some("13"), Code::Ok).unwrap_err();
        assert_eq!(err.to_string(), "grpc-status: expected 0, got 13");

        let err = expect_grpc_status(None, Code::Unauthenticated).unwrap_err();
        assert_eq!(err.actual, "<absent>");
    }
}
