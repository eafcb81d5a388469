//! REST+JSON as exposed by gRPC-gateway.

use gateway_probe_client::{ConnectionResponse, Method, ProbeRequest, StatusCode, header};
use gateway_probe_core::{Code, EmptyMessage, Encoding, encode_message};
use serde_json::json;

use super::{ProtocolDriver, expect_json_code, expect_status};
use crate::error::CheckError;
use crate::matrix::{Endpoint, EndpointClass};

/// Calls the endpoint's REST mapping with its declared method.
///
/// The body is always JSON; the permutation's encoding only affects labelling.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rest;

impl ProtocolDriver for Rest {
    fn build_request(
        &self,
        endpoint: &Endpoint,
        _encoding: Encoding,
    ) -> Result<ProbeRequest, CheckError> {
        let method = endpoint.rest_method.method();
        let request = ProbeRequest::new(method.clone(), endpoint.rest_path);
        if method == Method::GET {
            return Ok(request);
        }
        Ok(request
            .header(header::CONTENT_TYPE, "application/json")
            .body(encode_message(&EmptyMessage {}, Encoding::Json)?))
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
                expect_json_code(response, json!(Code::Unauthenticated.as_i32()))?;
            }
        }
        Ok(())
    }
}
