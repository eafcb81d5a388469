//! Runs checks against the target gateway.
//!
//! A permutation moves through three stages: [`Built`] (request assembled),
//! [`Dispatched`] (response in hand) and verified. A [`CheckError`] at any
//! stage ends the check; its [`stage`](CheckError::stage) records where.
//! Nothing is retried.

use std::future::Future;

use futures::future::join_all;
use gateway_probe_client::{
    Authority, ConnectionResponse, H2cClient, Http1Client, ProbeRequest, TransportError,
};
use gateway_probe_core::Encoding;
use tracing::Instrument;

use crate::error::CheckError;
use crate::matrix::{Endpoint, EndpointClass, Maturity, Permutation, Transport};
use crate::protocol::ProtocolDriver;
use crate::report::CheckResult;
use crate::services::ServiceCheck;
use crate::soft_fail;

/// Dispatches checks over HTTP/1.1 or h2c to one gateway.
///
/// Holds no per-check state; clones share the HTTP/1.1 connection pool.
#[derive(Clone, Debug)]
pub struct Executor {
    authority: Authority,
    http1: Http1Client,
    h2c: H2cClient,
}

impl Executor {
    /// Executor with default clients (30 second deadline, 10 redirects).
    pub fn new(authority: Authority) -> Self {
        Self::with_clients(authority, Http1Client::new(), H2cClient::new())
    }

    pub fn with_clients(authority: Authority, http1: Http1Client, h2c: H2cClient) -> Self {
        Self {
            authority,
            http1,
            h2c,
        }
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Send one request over `transport`.
    pub async fn send(
        &self,
        transport: Transport,
        request: ProbeRequest,
    ) -> Result<ConnectionResponse, TransportError> {
        match transport {
            Transport::Http1 => self.http1.request(&self.authority, request).await,
            Transport::H2c => self.h2c.request(&self.authority, request).await,
        }
    }

    /// Run a single permutation of `endpoint`.
    pub async fn run_permutation(
        &self,
        endpoint: &Endpoint,
        permutation: &Permutation,
    ) -> Result<(), CheckError> {
        Built::new(endpoint, permutation)?
            .dispatch(self)
            .await?
            .verify()
    }

    /// Run a single service check over HTTP/1.1.
    pub async fn run_service(&self, check: &ServiceCheck) -> Result<(), CheckError> {
        let response = self.send(Transport::Http1, check.request()).await?;
        tracing::debug!(status = %response.status(), uri = %response.uri(), "response received");
        check.verify(&response)
    }

    /// Run every permutation of `endpoints` concurrently.
    ///
    /// Results come back in declaration order regardless of completion order.
    pub async fn run_matrix(&self, endpoints: &[&Endpoint]) -> Vec<CheckResult> {
        let checks = endpoints.iter().flat_map(|endpoint| {
            endpoint.permutations.iter().map(move |permutation| {
                let label = permutation.label(endpoint);
                labelled(
                    label,
                    permutation.maturity,
                    self.run_permutation(endpoint, permutation),
                )
            })
        });
        join_all(checks).await
    }

    /// Run every service check concurrently.
    pub async fn run_services(&self, checks: &[ServiceCheck]) -> Vec<CheckResult> {
        join_all(checks.iter().map(|check| {
            labelled(check.label.to_string(), check.maturity, self.run_service(check))
        }))
        .await
    }
}

/// Run `check` inside a span named after it and classify the result.
async fn labelled<F>(label: String, maturity: Maturity, check: F) -> CheckResult
where
    F: Future<Output = Result<(), CheckError>>,
{
    let span = tracing::info_span!("check", label = %label);
    let outcome = soft_fail::guard(&label, maturity, check)
        .instrument(span)
        .await;
    CheckResult { label, outcome }
}

/// A request assembled for one permutation, not yet sent.
pub struct Built {
    driver: &'static dyn ProtocolDriver,
    class: EndpointClass,
    encoding: Encoding,
    transport: Transport,
    request: ProbeRequest,
}

impl Built {
    pub fn new(endpoint: &Endpoint, permutation: &Permutation) -> Result<Self, CheckError> {
        let driver = permutation.protocol.driver();
        let request = driver.build_request(endpoint, permutation.encoding)?;
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            transport = %permutation.transport,
            "request built"
        );
        Ok(Self {
            driver,
            class: endpoint.class,
            encoding: permutation.encoding,
            transport: permutation.transport,
            request,
        })
    }

    pub fn request(&self) -> &ProbeRequest {
        &self.request
    }

    pub async fn dispatch(self, executor: &Executor) -> Result<Dispatched, CheckError> {
        let response = executor.send(self.transport, self.request).await?;
        tracing::debug!(
            status = %response.status(),
            trailers = response.trailers().len(),
            "response received"
        );
        Ok(Dispatched {
            driver: self.driver,
            class: self.class,
            encoding: self.encoding,
            response,
        })
    }
}

/// A complete response awaiting verification.
pub struct Dispatched {
    driver: &'static dyn ProtocolDriver,
    class: EndpointClass,
    encoding: Encoding,
    response: ConnectionResponse,
}

impl Dispatched {
    pub fn response(&self) -> &ConnectionResponse {
        &self.response
    }

    pub fn verify(self) -> Result<(), CheckError> {
        self.driver
            .verify_response(self.class, self.encoding, &self.response)
    }
}
