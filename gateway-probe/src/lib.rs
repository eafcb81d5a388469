//! Multi-protocol conformance prober for an RPC gateway.
//!
//! Runs a declarative matrix of {protocol, encoding, transport} permutations
//! against an unauthenticated and an authenticated procedure, plus a table of
//! service reachability checks, and asserts each protocol's success or
//! authentication-failure signal end to end.
//!
//! ## Modules
//!
//! - [`matrix`]: permutation tables
//! - [`protocol`]: per-protocol request building and verification
//! - [`executor`]: dispatch over HTTP/1.1 or h2c
//! - [`services`]: service reachability table
//! - [`soft_fail`]: downgrading experimental failures to warnings
//! - [`report`]: outcomes and summary
//! - [`config`]: environment configuration
//!
//! ## Example
//!
//! ```ignore
//! use gateway_probe::{ProbeConfig, run};
//!
//! let report = run(&ProbeConfig::from_env()?).await;
//! report.print();
//! assert!(report.is_success());
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod matrix;
pub mod protocol;
pub mod report;
pub mod services;
pub mod soft_fail;

pub use config::{ConfigError, ProbeConfig};
pub use error::{CheckError, Mismatch, Stage};
pub use executor::Executor;
pub use report::{CheckOutcome, CheckResult, Report};

/// Probe the gateway named by `config` with default clients.
pub async fn run(config: &ProbeConfig) -> Report {
    run_with(&Executor::new(config.authority().clone()), config).await
}

/// Probe with a caller-supplied executor.
///
/// Service checks come first in the report, then the matrix in declaration
/// order. Both run concurrently.
pub async fn run_with(executor: &Executor, config: &ProbeConfig) -> Report {
    tracing::info!(base_url = %config.base_url(), "probing gateway");

    let service_checks = async {
        if config.skip_services() {
            tracing::info!("service checks skipped");
            Vec::new()
        } else {
            executor.run_services(services::SERVICE_CHECKS).await
        }
    };
    let permutations = executor.run_matrix(&matrix::ENDPOINTS);
    let (service_results, matrix_results) = futures::join!(service_checks, permutations);

    let mut report = Report::new();
    report.extend(service_results);
    report.extend(matrix_results);
    report
}
