//! Unary Connect: unframed body, status and error code in the HTTP response.

use gateway_probe_client::{ConnectionResponse, ProbeRequest, StatusCode, header};
use gateway_probe_core::{Code, EmptyMessage, Encoding, encode_message};
use serde_json::json;

use super::{ProtocolDriver, expect_json_code, expect_status};
use crate::error::CheckError;
use crate::matrix::{Endpoint, EndpointClass};

#[derive(Clone, Copy, Debug, Default)]
pub struct Connect;

impl Connect {
    /// Unary content type. `application/connect+*` is streaming-only.
    fn content_type(encoding: Encoding) -> &'static str {
        match encoding {
            Encoding::Proto => "application/proto",
            Encoding::Json => "application/json",
        }
    }
}

impl ProtocolDriver for Connect {
    fn build_request(
        &self,
        endpoint: &Endpoint,
        encoding: Encoding,
    ) -> Result<ProbeRequest, CheckError> {
        Ok(ProbeRequest::post(endpoint.rpc_path)
            .header(header::CONTENT_TYPE, Self::content_type(encoding))
            .body(encode_message(&EmptyMessage {}, encoding)?))
    }

    fn verify_response(
        &self,
        class: EndpointClass,
        _encoding: Encoding,
        response: &ConnectionResponse,
    ) -> Result<(), CheckError> {
        match class {
            EndpointClass::Unauthenticated => expect_status(response, StatusCode::OK)?,
            EndpointClass::Authenticated => {
                expect_status(response, StatusCode::UNAUTHORIZED)?;
                expect_json_code(response, json!(Code::Unauthenticated.as_str()))?;
            }
        }
        Ok(())
    }
}
