//! Native gRPC over h2c.

use gateway_probe_client::{ConnectionResponse, ProbeRequest, StatusCode, header};
use gateway_probe_core::{
    Code, EmptyMessage, Encoding, decode_frame, decode_proto, encode_frame, encode_message,
};

use super::{
    Prefix, ProtocolDriver, expect_grpc_status, expect_status, framed_content_type, grpc_status,
};
use crate::error::{CheckError, Mismatch};
use crate::matrix::{Endpoint, EndpointClass};

#[derive(Clone, Copy, Debug, Default)]
pub struct Grpc;

impl ProtocolDriver for Grpc {
    fn build_request(
        &self,
        endpoint: &Endpoint,
        encoding: Encoding,
    ) -> Result<ProbeRequest, CheckError> {
        let payload = encode_message(&EmptyMessage {}, encoding)?;
        Ok(ProbeRequest::post(endpoint.rpc_path)
            .header(header::CONTENT_TYPE, framed_content_type(Prefix::Grpc, encoding))
            .header(header::TE, "trailers")
            .body(encode_frame(&payload)))
    }

    fn verify_response(
        &self,
        class: EndpointClass,
        encoding: Encoding,
        response: &ConnectionResponse,
    ) -> Result<(), CheckError> {
        expect_status(response, StatusCode::OK)?;
        let status = grpc_status(response.trailers(), response.headers());

        match (class, encoding) {
            (EndpointClass::Unauthenticated, Encoding::Proto) => {
                expect_grpc_status(status, Code::Ok)?;
                if !response.body().is_empty() {
                    let payload = decode_frame(response.body())?;
                    decode_proto::<EmptyMessage>(&payload).map_err(|e| {
                        Mismatch::new("response payload", "well-formed protobuf", e)
                    })?;
                }
            }
            // Peers without a JSON codec answer with a non-zero status; its
            // presence still proves the call reached the backend.
            (EndpointClass::Unauthenticated, Encoding::Json) => {
                if status.is_none() {
                    return Err(Mismatch::new("grpc-status", "present", "<absent>").into());
                }
            }
            (EndpointClass::Authenticated, _) => {
                expect_grpc_status(status, Code::Unauthenticated)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{V1, V2};
    use crate::protocol::test_util::{response, response_with};

    #[test]
    fn test_build_request() {
        let request = Grpc.build_request(&V2, Encoding::Json).unwrap();
        assert_eq!(
            request.path(),
            "/zitadel.session.v2.SessionService/ListSessions"
        );
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/grpc+json");
        assert_eq!(request.headers()[header::TE], "trailers");
        assert_eq!(request.body_bytes().unwrap().as_ref(), b"\x00\x00\x00\x00\x02{}");

        let request = Grpc.build_request(&V1, Encoding::Proto).unwrap();
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/grpc+proto");
        assert_eq!(request.body_bytes().unwrap().len(), 5);
    }

    #[test]
    fn test_verify_proto_ok() {
        let ok = response_with(200, &[], vec![0u8, 0, 0, 0, 0], &[("grpc-status", "0")]);
        assert!(Grpc.verify_response(EndpointClass::Unauthenticated, Encoding::Proto, &ok).is_ok());

        let empty_body = response_with(200, &[], "", &[("grpc-status", "0")]);
        assert!(
            Grpc.verify_response(EndpointClass::Unauthenticated, Encoding::Proto, &empty_body)
                .is_ok()
        );
    }

    #[test]
    fn test_verify_proto_truncated_frame() {
        let truncated = response_with(200, &[], vec![0u8, 0, 0, 0, 9, 1], &[("grpc-status", "0")]);
        assert!(matches!(
            Grpc.verify_response(EndpointClass::Unauthenticated, Encoding::Proto, &truncated),
            Err(CheckError::Frame(_))
        ));
    }

    #[test]
    fn test_verify_proto_malformed_payload() {
        // Field 1, length-delimited, declares 5 bytes but carries none.
        let malformed = response_with(
            200,
            &[],
            vec![0u8, 0, 0, 0, 2, 0x0a, 0x05],
            &[("grpc-status", "0")],
        );
        assert!(matches!(
            Grpc.verify_response(EndpointClass::Unauthenticated, Encoding::Proto, &malformed),
            Err(CheckError::Mismatch(_))
        ));
    }

    #[test]
    fn test_verify_json_accepts_any_status() {
        let internal = response_with(200, &[], "", &[("grpc-status", "13")]);
        assert!(
            Grpc.verify_response(EndpointClass::Unauthenticated, Encoding::Json, &internal)
                .is_ok()
        );

        let missing = response(200, "");
        assert!(
            Grpc.verify_response(EndpointClass::Unauthenticated, Encoding::Json, &missing)
                .is_err()
        );
    }

    #[test]
    fn test_verify_authenticated() {
        for encoding in [Encoding::Proto, Encoding::Json] {
            let denied = response_with(200, &[], "", &[("grpc-status", "16")]);
            assert!(Grpc.verify_response(EndpointClass::Authenticated, encoding, &denied).is_ok());

            let trailers_only = response_with(200, &[("grpc-status", "16")], "", &[]);
            assert!(
                Grpc.verify_response(EndpointClass::Authenticated, encoding, &trailers_only)
                    .is_ok()
            );

            let allowed = response_with(200, &[], "", &[("grpc-status", "0")]);
            assert!(Grpc.verify_response(EndpointClass::Authenticated, encoding, &allowed).is_err());
        }
    }
}
