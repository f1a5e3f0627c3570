//! Judge over a simulation backend
//!
//! Backends implementing [`Simulator`] only report what the program would do.
//! [`SimulatedJudge`] owns the classification: static prechecks, the
//! precedence chain and output comparison all happen here, so every backend is
//! judged by the same rules.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::analysis::precheck;
use super::{Judge, JudgeRequest, compare_output};
use crate::error::JudgeError;
use crate::outcome::{SubmissionOutcome, Verdict};
use crate::types::Language;

/// Raw facts about one (simulated or real) run of a program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    /// Compiler diagnostics, if the source does not compile
    #[serde(default)]
    pub compile_error: Option<String>,
    /// Fault description, if the run raised or crashed
    #[serde(default)]
    pub runtime_error: Option<String>,
    /// Whether the run would exceed the step/time budget
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub elapsed_ms: Option<u64>,
    #[serde(default)]
    pub memory_kb: Option<u64>,
}

/// Backend that runs, or pretends to run, a program on one input.
///
/// Implementations must disable any sampling randomness so that a fixed
/// input always yields the same simulation.
#[async_trait]
pub trait Simulator: Send + Sync {
    async fn simulate(
        &self,
        language: Language,
        source: &str,
        stdin: &str,
    ) -> Result<Simulation, JudgeError>;
}

/// [`Judge`] that classifies [`Simulation`]s.
pub struct SimulatedJudge<S> {
    simulator: S,
}

impl<S: Simulator> SimulatedJudge<S> {
    pub fn new(simulator: S) -> Self {
        Self { simulator }
    }

    /// Get the underlying simulator
    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Apply the precedence chain to a backend report.
    pub fn classify(request: &JudgeRequest<'_>, simulation: Simulation) -> SubmissionOutcome {
        let stderr = Some(simulation.stderr).filter(|s| !s.is_empty());
        let outcome = if let Some(compile_error) = simulation.compile_error {
            SubmissionOutcome::compilation_error(compile_error)
        } else if let Some(runtime_error) = simulation.runtime_error {
            SubmissionOutcome {
                stdout: Some(simulation.stdout),
                ..SubmissionOutcome::runtime_error(stderr.unwrap_or(runtime_error))
            }
        } else if simulation.timed_out {
            SubmissionOutcome {
                stdout: Some(simulation.stdout),
                stderr,
                ..SubmissionOutcome::new(Verdict::TimeLimitExceeded)
            }
        } else {
            SubmissionOutcome {
                verdict: compare_output(request, &simulation.stdout),
                stdout: Some(simulation.stdout),
                stderr,
                ..SubmissionOutcome::accepted()
            }
        };
        outcome.with_telemetry(simulation.elapsed_ms, simulation.memory_kb)
    }
}

#[async_trait]
impl<S: Simulator> Judge for SimulatedJudge<S> {
    async fn evaluate(&self, request: JudgeRequest<'_>) -> SubmissionOutcome {
        if let Some(fault) = precheck(request.language, request.source) {
            debug!(language = %request.language, ?fault, "precheck decided verdict");
            return fault.into_outcome();
        }

        match self
            .simulator
            .simulate(request.language, request.source, request.stdin)
            .await
        {
            Ok(simulation) => Self::classify(&request, simulation),
            Err(e) => {
                warn!(language = %request.language, error = %e, "judge backend failed");
                SubmissionOutcome::backend_failure(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Simulator returning a fixed reply and counting calls.
    struct FixedSimulator {
        reply: Mutex<Option<Result<Simulation, JudgeError>>>,
        calls: Mutex<usize>,
    }

    impl FixedSimulator {
        fn new(reply: Result<Simulation, JudgeError>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Simulator for FixedSimulator {
        async fn simulate(
            &self,
            _language: Language,
            _source: &str,
            _stdin: &str,
        ) -> Result<Simulation, JudgeError> {
            *self.calls.lock().unwrap() += 1;
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(JudgeError::Backend("reply consumed".to_string())))
        }
    }

    fn stdout(text: &str) -> Simulation {
        Simulation {
            stdout: text.to_string(),
            ..Simulation::default()
        }
    }

    const SOURCE: &str = "a, b = map(int, input().split())\nprint(a + b)\n";

    #[tokio::test]
    async fn matching_output_is_accepted() {
        let judge = SimulatedJudge::new(FixedSimulator::new(Ok(stdout("5\n"))));
        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, SOURCE, "2 3", "5"))
            .await;
        assert_eq!(outcome.verdict, Verdict::Accepted);
        assert_eq!(outcome.stdout.as_deref(), Some("5\n"));
    }

    #[tokio::test]
    async fn different_output_is_wrong_answer_with_case_details() {
        let judge = SimulatedJudge::new(FixedSimulator::new(Ok(stdout("14"))));
        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, SOURCE, "10 -4", "6"))
            .await;
        assert_eq!(
            outcome.verdict,
            Verdict::WrongAnswer {
                failed_input: "10 -4".to_string(),
                expected_output: "6".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn compile_error_takes_precedence_over_everything() {
        let simulation = Simulation {
            compile_error: Some("SyntaxError".to_string()),
            runtime_error: Some("boom".to_string()),
            timed_out: true,
            stdout: "5".to_string(),
            ..Simulation::default()
        };
        let judge = SimulatedJudge::new(FixedSimulator::new(Ok(simulation)));
        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, SOURCE, "2 3", "5"))
            .await;
        assert_eq!(outcome.verdict, Verdict::CompilationError);
        assert_eq!(outcome.compile_output.as_deref(), Some("SyntaxError"));
    }

    #[tokio::test]
    async fn runtime_error_beats_time_limit() {
        let simulation = Simulation {
            runtime_error: Some("IndexError".to_string()),
            timed_out: true,
            ..Simulation::default()
        };
        let judge = SimulatedJudge::new(FixedSimulator::new(Ok(simulation)));
        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, SOURCE, "", "5"))
            .await;
        assert_eq!(outcome.verdict, Verdict::RuntimeError);
        assert_eq!(outcome.diagnostic(), Some("IndexError"));
    }

    #[tokio::test]
    async fn timed_out_run_is_time_limit_exceeded_even_with_correct_output() {
        let simulation = Simulation {
            timed_out: true,
            stdout: "5".to_string(),
            ..Simulation::default()
        };
        let judge = SimulatedJudge::new(FixedSimulator::new(Ok(simulation)));
        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, SOURCE, "2 3", "5"))
            .await;
        assert_eq!(outcome.verdict, Verdict::TimeLimitExceeded);
    }

    #[tokio::test]
    async fn telemetry_is_carried_but_does_not_classify() {
        let simulation = Simulation {
            stdout: "5".to_string(),
            elapsed_ms: Some(999_999),
            memory_kb: Some(1 << 30),
            ..Simulation::default()
        };
        let judge = SimulatedJudge::new(FixedSimulator::new(Ok(simulation)));
        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, SOURCE, "2 3", "5"))
            .await;
        assert_eq!(outcome.verdict, Verdict::Accepted);
        assert_eq!(outcome.elapsed_ms, Some(999_999));
    }

    #[tokio::test]
    async fn backend_failure_becomes_runtime_error() {
        let judge = SimulatedJudge::new(FixedSimulator::new(Err(JudgeError::Unreachable(
            "connection refused".to_string(),
        ))));
        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, SOURCE, "2 3", "5"))
            .await;
        assert_eq!(outcome.verdict, Verdict::RuntimeError);
        assert!(outcome.diagnostic().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn precheck_faults_skip_the_backend() {
        let judge = SimulatedJudge::new(FixedSimulator::new(Ok(stdout("5"))));
        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, "print((1)", "", "1"))
            .await;
        assert_eq!(outcome.verdict, Verdict::CompilationError);
        assert_eq!(judge.simulator().calls(), 0);
    }
}
