//! Judging outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of one submission against one case.
///
/// Exactly one tag is active. The failing input and expected output travel
/// only with `WrongAnswer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Pending,
    Running,
    Accepted,
    #[serde(rename_all = "camelCase")]
    WrongAnswer {
        failed_input: String,
        expected_output: String,
    },
    RuntimeError,
    TimeLimitExceeded,
    CompilationError,
}

impl Verdict {
    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Accepted => "Accepted",
            Self::WrongAnswer { .. } => "Wrong Answer",
            Self::RuntimeError => "Runtime Error",
            Self::TimeLimitExceeded => "Time Limit Exceeded",
            Self::CompilationError => "Compilation Error",
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Whether judging has finished (anything but Pending/Running).
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The hidden case a submission stopped on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCase {
    /// 0-based position in the problem's hidden test list
    pub index: usize,
    pub input: String,
}

/// Result of judging a submission.
///
/// `elapsed_ms` and `memory_kb` are cosmetic telemetry; nothing classifies on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    #[serde(flatten)]
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_kb: Option<u64>,
    /// Set by the submit evaluator on the case that stopped evaluation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_case: Option<FailedCase>,
}

impl SubmissionOutcome {
    /// Create an outcome with only a verdict.
    #[must_use]
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            stdout: None,
            stderr: None,
            compile_output: None,
            elapsed_ms: None,
            memory_kb: None,
            failed_case: None,
        }
    }

    #[must_use]
    pub fn accepted() -> Self {
        Self::new(Verdict::Accepted)
    }

    #[must_use]
    pub fn compilation_error(output: impl Into<String>) -> Self {
        Self {
            compile_output: Some(output.into()),
            ..Self::new(Verdict::CompilationError)
        }
    }

    #[must_use]
    pub fn runtime_error(stderr: impl Into<String>) -> Self {
        Self {
            stderr: Some(stderr.into()),
            ..Self::new(Verdict::RuntimeError)
        }
    }

    #[must_use]
    pub fn time_limit_exceeded(stderr: impl Into<String>) -> Self {
        Self {
            stderr: Some(stderr.into()),
            ..Self::new(Verdict::TimeLimitExceeded)
        }
    }

    /// Safe default for a judge whose backend failed.
    #[must_use]
    pub fn backend_failure(diagnostic: impl fmt::Display) -> Self {
        Self::runtime_error(format!("judge backend failure: {diagnostic}"))
    }

    #[must_use]
    pub fn with_telemetry(mut self, elapsed_ms: Option<u64>, memory_kb: Option<u64>) -> Self {
        self.elapsed_ms = elapsed_ms;
        self.memory_kb = memory_kb;
        self
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.verdict.is_accepted()
    }

    /// The most useful error text for this outcome, if any.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        self.compile_output
            .as_deref()
            .or(self.stderr.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

/// UI-facing projection of running one visible example. Never used for scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
