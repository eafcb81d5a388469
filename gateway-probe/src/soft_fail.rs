//! Downgrading failures of not-yet-guaranteed checks.

use std::future::Future;

use serde::Serialize;

use crate::error::CheckError;
use crate::matrix::Maturity;
use crate::report::CheckOutcome;

/// Annotation kind attached to a soft failure.
pub const SOFT_FAIL_KIND: &str = "fixme";

/// Structured record of a caught failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub kind: &'static str,
    pub label: String,
    /// `[soft-fail] {message}`.
    pub description: String,
}

impl Annotation {
    pub fn soft_fail(label: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            kind: SOFT_FAIL_KIND,
            label: label.into(),
            description: format!("[soft-fail] {message}"),
        }
    }
}

/// Turn a check result into an outcome according to its maturity.
///
/// A failure of a [`Maturity::Experimental`] check is logged as a warning
/// and reported as [`CheckOutcome::Warned`]; it does not fail the run.
pub fn classify(label: &str, maturity: Maturity, result: Result<(), CheckError>) -> CheckOutcome {
    match (result, maturity) {
        (Ok(()), _) => CheckOutcome::Passed,
        (Err(error), Maturity::Stable) => CheckOutcome::Failed(error),
        (Err(error), Maturity::Experimental) => {
            let annotation = Annotation::soft_fail(label, &error);
            tracing::warn!(
                label = %annotation.label,
                kind = annotation.kind,
                stage = %error.stage(),
                "{}",
                annotation.description
            );
            CheckOutcome::Warned(annotation)
        }
    }
}

/// Run `check` and classify its result.
pub async fn guard<F>(label: &str, maturity: Maturity, check: F) -> CheckOutcome
where
    F: Future<Output = Result<(), CheckError>>,
{
    classify(label, maturity, check.await)
}
