//! Reachability checks for the non-RPC services behind the gateway.
//!
//! Every entry is a plain HTTP/1.1 `GET` with redirects followed. The
//! response must be `200 OK` plus whatever the entry's [`Expectation`] adds.

use gateway_probe_client::{ConnectionResponse, ProbeRequest, StatusCode};
use serde_json::Value;

use crate::error::{CheckError, Mismatch};
use crate::matrix::Maturity;
use crate::protocol::expect_status;

/// What a service response must contain beyond status 200.
#[derive(Clone, Copy, Debug)]
pub enum Expectation {
    /// Status only.
    Ok,
    /// The final URI after redirects contains this path.
    RedirectsTo(&'static str),
    /// The body contains this text.
    BodyContains(&'static str),
    /// The body is a JSON object with all of these keys.
    JsonKeys(&'static [&'static str]),
    /// The body is a JSON object whose key holds an array.
    JsonArray(&'static str),
}

#[derive(Debug)]
pub struct ServiceCheck {
    pub label: &'static str,
    pub path: &'static str,
    pub expect: Expectation,
    pub maturity: Maturity,
}

impl ServiceCheck {
    const fn stable(label: &'static str, path: &'static str, expect: Expectation) -> Self {
        Self {
            label,
            path,
            expect,
            maturity: Maturity::Stable,
        }
    }

    pub fn request(&self) -> ProbeRequest {
        ProbeRequest::get(self.path)
    }

    pub fn verify(&self, response: &ConnectionResponse) -> Result<(), CheckError> {
        expect_status(response, StatusCode::OK)?;

        match self.expect {
            Expectation::Ok => {}
            Expectation::RedirectsTo(path) => {
                let uri = response.uri().to_string();
                if !uri.contains(path) {
                    return Err(Mismatch::new("final URI", format!("containing {path}"), uri).into());
                }
            }
            Expectation::BodyContains(needle) => {
                if !response.body_text().contains(needle) {
                    return Err(Mismatch::new("body", format!("containing {needle:?}"), "no match")
                        .with_body(response.body())
                        .into());
                }
            }
            Expectation::JsonKeys(keys) => {
                let document = json_object(response)?;
                if let Some(missing) = keys.iter().find(|k| document.get(**k).is_none()) {
                    return Err(Mismatch::new(
                        "JSON document",
                        format!("key {missing:?}"),
                        "missing",
                    )
                    .into());
                }
            }
            Expectation::JsonArray(key) => {
                let document = json_object(response)?;
                match document.get(key) {
                    Some(Value::Array(_)) => {}
                    Some(other) => {
                        return Err(Mismatch::new(
                            format!("JSON key {key:?}"),
                            "array",
                            json_type(other),
                        )
                        .into());
                    }
                    None => {
                        return Err(
                            Mismatch::new(format!("JSON key {key:?}"), "array", "missing").into()
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

fn json_object(response: &ConnectionResponse) -> Result<serde_json::Map<String, Value>, Mismatch> {
    match serde_json::from_slice(response.body()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Mismatch::new("body", "JSON object", json_type(&other))),
        Err(e) => Err(Mismatch::new("body", "JSON object", format!("unparseable ({e})"))
            .with_body(response.body())),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

const HTML: Expectation = Expectation::BodyContains("<html");

/// Service checks, in report order.
pub static SERVICE_CHECKS: &[ServiceCheck] = &[
    ServiceCheck::stable(
        "GET / -> redirects to /ui/v2/login/",
        "/",
        Expectation::RedirectsTo("/ui/v2/login"),
    ),
    ServiceCheck::stable(
        "GET /ui/v2/login/healthy -> 200",
        "/ui/v2/login/healthy",
        Expectation::Ok,
    ),
    ServiceCheck::stable("GET /ui/v2/login/ -> 200 HTML", "/ui/v2/login/", HTML),
    ServiceCheck::stable(
        "GET /ui/console/ -> 200 HTML (Angular SPA shell)",
        "/ui/console/",
        HTML,
    ),
    ServiceCheck::stable(
        "GET /.well-known/openid-configuration -> valid discovery document",
        "/.well-known/openid-configuration",
        Expectation::JsonKeys(&["issuer", "authorization_endpoint", "token_endpoint", "jwks_uri"]),
    ),
    ServiceCheck::stable(
        "GET /oauth/v2/keys -> JWKS with keys array",
        "/oauth/v2/keys",
        Expectation::JsonArray("keys"),
    ),
    ServiceCheck::stable(
        "GET /saml/v2/metadata -> EntityDescriptor XML",
        "/saml/v2/metadata",
        Expectation::BodyContains("EntityDescriptor"),
    ),
    ServiceCheck::stable(
        "GET /management/v1/healthz -> 200",
        "/management/v1/healthz",
        Expectation::Ok,
    ),
    ServiceCheck::stable(
        "GET /admin/v1/healthz -> 200",
        "/admin/v1/healthz",
        Expectation::Ok,
    ),
    ServiceCheck::stable(
        "GET /auth/v1/healthz -> 200",
        "/auth/v1/healthz",
        Expectation::Ok,
    ),
    ServiceCheck::stable(
        "GET /api/admin/v1/healthz via /api alias -> 200",
        "/api/admin/v1/healthz",
        Expectation::Ok,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_util::response;

    fn check(label_prefix: &str) -> &'static ServiceCheck {
        SERVICE_CHECKS
            .iter()
            .find(|c| c.label.starts_with(label_prefix))
            .unwrap()
    }

    #[test]
    fn test_table() {
        assert_eq!(SERVICE_CHECKS.len(), 11);
        assert!(SERVICE_CHECKS.iter().all(|c| c.maturity == Maturity::Stable));
        assert!(SERVICE_CHECKS.iter().all(|c| c.path.starts_with('/')));
        assert_eq!(check("GET /oauth").request().path(), "/oauth/v2/keys");
    }

    #[test]
    fn test_redirect_expectation() {
        let check = check("GET / ->");
        let landed = ConnectionResponse::new(
            StatusCode::OK,
            Default::default(),
            "<html>".into(),
            Default::default(),
            "http://localhost:8888/ui/v2/login/loginname".parse().unwrap(),
        );
        assert!(check.verify(&landed).is_ok());

        // test_util responses land on "/"
        assert!(check.verify(&response(200, "<html>")).is_err());
    }

    #[test]
    fn test_html_expectation() {
        let check = check("GET /ui/console/");
        assert!(check.verify(&response(200, "<!doctype html><html lang=en>")).is_ok());
        assert!(check.verify(&response(200, "{}")).is_err());
        assert!(check.verify(&response(404, "<html>")).is_err());
    }

    #[test]
    fn test_discovery_expectation() {
        let check = check("GET /.well-known");
        let full = r#"{"issuer":"http://localhost:8888","authorization_endpoint":"a","token_endpoint":"t","jwks_uri":"j"}"#;
        assert!(check.verify(&response(200, full)).is_ok());

        let partial = r#"{"issuer":"http://localhost:8888"}"#;
        let err = check.verify(&response(200, partial)).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"JSON document: expected key "authorization_endpoint", got missing"#
        );

        assert!(check.verify(&response(200, "[]")).is_err());
    }

    #[test]
    fn test_jwks_expectation() {
        let check = check("GET /oauth");
        assert!(check.verify(&response(200, r#"{"keys":[]}"#)).is_ok());

        let err = check.verify(&response(200, r#"{"keys":{}}"#)).unwrap_err();
        assert_eq!(err.to_string(), r#"JSON key "keys": expected array, got object"#);
        assert!(check.verify(&response(200, "not json")).is_err());
    }

    #[test]
    fn test_saml_expectation() {
        let check = check("GET /saml");
        let metadata = r#"<?xml version="1.0"?><md:EntityDescriptor entityID="x"/>"#;
        assert!(check.verify(&response(200, metadata)).is_ok());
        assert!(check.verify(&response(200, "<html>")).is_err());
    }
}
