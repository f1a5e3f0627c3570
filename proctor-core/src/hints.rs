//! Remediation hints for failed submissions.

use async_trait::async_trait;
use tracing::warn;

use crate::error::HintError;
use crate::outcome::SubmissionOutcome;
use crate::problem::{CodingProblem, TestCase};

/// Shown whenever the advisor fails or has nothing to say.
pub const FALLBACK_HINT: &str =
    "No hint is available right now. Re-read the constraints and trace your code by hand on the failing input.";

/// Explains why code fails a case. Best-effort: callers never depend on it.
#[async_trait]
pub trait HintAdvisor: Send + Sync {
    async fn explain(
        &self,
        problem: &CodingProblem,
        code: &str,
        failing_case: &TestCase,
    ) -> Result<String, HintError>;
}

/// The hidden case behind a failed outcome, if the outcome names one.
#[must_use]
pub fn failing_case(problem: &CodingProblem, outcome: &SubmissionOutcome) -> Option<TestCase> {
    let failed = outcome.failed_case.as_ref()?;
    problem.test_cases.get(failed.index).cloned()
}

/// Ask the advisor once. Any failure, or blank advice, yields [`FALLBACK_HINT`].
pub async fn escalate(
    advisor: &dyn HintAdvisor,
    problem: &CodingProblem,
    code: &str,
    failing_case: &TestCase,
) -> String {
    match advisor.explain(problem, code, failing_case).await {
        Ok(hint) if !hint.trim().is_empty() => hint,
        Ok(_) => FALLBACK_HINT.to_string(),
        Err(e) => {
            warn!(problem_id = %problem.id, error = %e, "hint advisor failed, using fallback");
            FALLBACK_HINT.to_string()
        }
    }
}
