//! gRPC-Web over HTTP/1.1.

use gateway_probe_client::{ConnectionResponse, ProbeRequest, StatusCode, header};
use gateway_probe_core::{Code, EmptyMessage, Encoding, encode_frame, encode_message, extract_trailers};

use super::{Prefix, ProtocolDriver, expect_grpc_status, expect_status, framed_content_type};
use crate::error::CheckError;
use crate::matrix::{Endpoint, EndpointClass};

#[derive(Clone, Copy, Debug, Default)]
pub struct GrpcWeb;

impl ProtocolDriver for GrpcWeb {
    fn build_request(
        &self,
        endpoint: &Endpoint,
        encoding: Encoding,
    ) -> Result<ProbeRequest, CheckError> {
        let payload = encode_message(&EmptyMessage {}, encoding)?;
        Ok(ProbeRequest::post(endpoint.rpc_path)
            .header(header::CONTENT_TYPE, framed_content_type(Prefix::GrpcWeb, encoding))
            .header("x-grpc-web", "1")
            .body(encode_frame(&payload)))
    }

    /// Always HTTP 200. For proto the inline trailer frame must carry the
    /// expected `grpc-status`; json peers may answer without a well-formed
    /// trailer frame, so only the status line is checked.
    fn verify_response(
        &self,
        class: EndpointClass,
        encoding: Encoding,
        response: &ConnectionResponse,
    ) -> Result<(), CheckError> {
        expect_status(response, StatusCode::OK)?;
        if encoding == Encoding::Json {
            return Ok(());
        }

        let inline = extract_trailers(response.body())?;
        let status = inline
            .get("grpc-status")
            .map(String::as_str)
            .or_else(|| super::grpc_status(response.trailers(), response.headers()));
        let expected = match class {
            EndpointClass::Unauthenticated => Code::Ok,
            EndpointClass::Authenticated => Code::Unauthenticated,
        };
        expect_grpc_status(status, expected)?;
        Ok(())
    }
}
