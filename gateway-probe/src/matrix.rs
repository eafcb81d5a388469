//! Declarative permutation tables.
//!
//! Each [`Endpoint`] lists the {protocol, encoding, transport} combinations
//! it is probed with. The tables are plain data: adding a combination is an
//! append to a `permutations` slice and needs no executor change.

use std::fmt;

use gateway_probe_core::Encoding;
use gateway_probe_core::Encoding::{Json, Proto};
use http::Method;

use Protocol::{Connect, Grpc, GrpcWeb, Rest};
use Transport::{H2c, Http1};

/// RPC wire protocol a permutation speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// gRPC-gateway style REST+JSON.
    Rest,
    /// gRPC-Web, framed body with an inline trailer frame.
    GrpcWeb,
    /// Native gRPC over HTTP/2.
    Grpc,
    /// Unary Connect, unframed body.
    Connect,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Rest => "rest",
            Protocol::GrpcWeb => "grpc-web",
            Protocol::Grpc => "grpc",
            Protocol::Connect => "connectrpc",
        }
    }

    /// Whether this protocol can be carried by `transport`.
    pub fn supports(&self, transport: Transport) -> bool {
        match self {
            Protocol::GrpcWeb => transport == Transport::Http1,
            Protocol::Grpc => transport == Transport::H2c,
            Protocol::Rest | Protocol::Connect => true,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transport {
    Http1,
    /// Cleartext HTTP/2 with prior knowledge.
    H2c,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Http1 => "http1",
            Transport::H2c => "h2c",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a failing check fails the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Maturity {
    /// Failures fail the run.
    Stable,
    /// Failures are downgraded to warnings.
    Experimental,
}

/// Expected outcome class of an endpoint when called without credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    /// Expected to succeed.
    Unauthenticated,
    /// Expected to fail with the protocol's authentication error.
    Authenticated,
}

/// HTTP method of an endpoint's REST mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RestMethod {
    Get,
    Post,
}

impl RestMethod {
    pub fn method(&self) -> Method {
        match self {
            RestMethod::Get => Method::GET,
            RestMethod::Post => Method::POST,
        }
    }
}

/// One {protocol, encoding, transport} combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Permutation {
    pub protocol: Protocol,
    pub encoding: Encoding,
    pub transport: Transport,
    pub maturity: Maturity,
}

impl Permutation {
    pub const fn stable(protocol: Protocol, encoding: Encoding, transport: Transport) -> Self {
        Self {
            protocol,
            encoding,
            transport,
            maturity: Maturity::Stable,
        }
    }

    pub const fn experimental(
        protocol: Protocol,
        encoding: Encoding,
        transport: Transport,
    ) -> Self {
        Self {
            protocol,
            encoding,
            transport,
            maturity: Maturity::Experimental,
        }
    }

    /// Report label, e.g. `v1 grpc proto h2c`.
    pub fn label(&self, endpoint: &Endpoint) -> String {
        format!(
            "{} {} {} {}",
            endpoint.name, self.protocol, self.encoding, self.transport
        )
    }
}

/// A remote procedure and the permutations it is probed with.
#[derive(Debug)]
pub struct Endpoint {
    /// Short name used as the label prefix.
    pub name: &'static str,
    pub class: EndpointClass,
    /// `/{package}.{Service}/{Method}` path for gRPC, gRPC-Web and Connect.
    pub rpc_path: &'static str,
    pub rest_method: RestMethod,
    pub rest_path: &'static str,
    /// Probed in this order; order only affects reporting.
    pub permutations: &'static [Permutation],
}

/// Admin health check. Needs no credentials.
pub static V1: Endpoint = Endpoint {
    name: "v1",
    class: EndpointClass::Unauthenticated,
    rpc_path: "/zitadel.admin.v1.AdminService/Healthz",
    rest_method: RestMethod::Get,
    rest_path: "/admin/v1/healthz",
    permutations: &[
        Permutation::stable(Rest, Json, Http1),
        Permutation::stable(Rest, Json, H2c),
        Permutation::stable(GrpcWeb, Proto, Http1),
        Permutation::stable(GrpcWeb, Json, Http1),
        Permutation::stable(Grpc, Proto, H2c),
        Permutation::stable(Grpc, Json, H2c),
    ],
};

/// Session listing. Rejects calls without credentials.
pub static V2: Endpoint = Endpoint {
    name: "v2",
    class: EndpointClass::Authenticated,
    rpc_path: "/zitadel.session.v2.SessionService/ListSessions",
    rest_method: RestMethod::Post,
    rest_path: "/v2/sessions",
    permutations: &[
        Permutation::stable(Rest, Json, Http1),
        Permutation::stable(Rest, Json, H2c),
        Permutation::stable(Connect, Proto, Http1),
        Permutation::stable(Connect, Json, Http1),
        Permutation::stable(Connect, Proto, H2c),
        Permutation::stable(Connect, Json, H2c),
        Permutation::stable(Grpc, Proto, H2c),
        Permutation::stable(Grpc, Json, H2c),
    ],
};

/// Every probed endpoint, in report order.
pub static ENDPOINTS: [&Endpoint; 2] = [&V1, &V2];
