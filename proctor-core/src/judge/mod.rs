//! Judge abstraction
//!
//! A [`Judge`] classifies one `(language, source, stdin, expected)` tuple into
//! a [`SubmissionOutcome`]. Callers depend only on the trait; backends can be a
//! language-model simulation ([`SimulatedJudge`] over a [`Simulator`]), a
//! scripted test double ([`MockJudge`]), or a real sandbox.
//!
//! Classification precedence, evaluated once per call:
//!
//! 1. compilation failure → `CompilationError`
//! 2. runtime fault on `stdin` → `RuntimeError`
//! 3. no termination within budget → `TimeLimitExceeded`
//! 4. `stdout.trim() == expected.trim()` → `Accepted`, else `WrongAnswer`

pub mod analysis;
pub mod mock;
pub mod simulated;

use async_trait::async_trait;

use crate::outcome::{SubmissionOutcome, Verdict};
use crate::types::Language;

pub use analysis::{Fault, precheck};
pub use mock::MockJudge;
pub use simulated::{Simulation, SimulatedJudge, Simulator};

/// One evaluation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgeRequest<'a> {
    pub language: Language,
    pub source: &'a str,
    pub stdin: &'a str,
    pub expected_output: &'a str,
}

impl<'a> JudgeRequest<'a> {
    pub fn new(
        language: Language,
        source: &'a str,
        stdin: &'a str,
        expected_output: &'a str,
    ) -> Self {
        Self {
            language,
            source,
            stdin,
            expected_output,
        }
    }
}

/// Trait for submission judges
///
/// Implementations must be deterministic in the verdict for a fixed request
/// and must never fail: backend problems are reported as a RuntimeError
/// outcome (see [`SubmissionOutcome::backend_failure`]).
#[async_trait]
pub trait Judge: Send + Sync {
    /// Evaluate one submission against one case.
    async fn evaluate(&self, request: JudgeRequest<'_>) -> SubmissionOutcome;
}

/// Final rung of the precedence chain: compare trimmed output.
#[must_use]
pub fn compare_output(request: &JudgeRequest<'_>, stdout: &str) -> Verdict {
    if stdout.trim() == request.expected_output.trim() {
        Verdict::Accepted
    } else {
        Verdict::WrongAnswer {
            failed_input: request.stdin.to_string(),
            expected_output: request.expected_output.to_string(),
        }
    }
}
