//! Per-check outcomes and the run summary.

use std::fmt;

use crate::error::CheckError;
use crate::soft_fail::Annotation;

#[derive(Debug)]
pub enum CheckOutcome {
    Passed,
    /// Failed, but the check is experimental.
    Warned(Annotation),
    Failed(CheckError),
}

/// Outcome of one labelled check.
#[derive(Debug)]
pub struct CheckResult {
    pub label: String,
    pub outcome: CheckOutcome,
}

/// Outcomes of a run, in declaration order.
#[derive(Debug, Default)]
pub struct Report {
    results: Vec<CheckResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Look up a result by label.
    pub fn get(&self, label: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.label == label)
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Passed))
    }

    pub fn warned(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Warned(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Failed(_)))
    }

    /// False when any check failed. Warnings do not count.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        print!("{self}");
    }

    fn count(&self, predicate: impl Fn(&CheckOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

impl Extend<CheckResult> for Report {
    fn extend<I: IntoIterator<Item = CheckResult>>(&mut self, iter: I) {
        self.results.extend(iter);
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            let label = &result.label;
            match &result.outcome {
                CheckOutcome::Passed => writeln!(f, "  PASS  {label}")?,
                CheckOutcome::Warned(annotation) => {
                    writeln!(f, "  WARN  {label}: {}", annotation.description)?
                }
                CheckOutcome::Failed(error) => {
                    writeln!(f, "  FAIL  {label}: [{}] {error}", error.stage())?
                }
            }
        }
        writeln!(f)?;
        write!(f, "{}/{} passed", self.passed(), self.total())?;
        match self.warned() {
            0 => writeln!(f),
            warned => writeln!(f, ", {warned} warned"),
        }
    }
}
