//! Scripted judge for tests and offline demos
//!
//! By default MockJudge behaves like a program that always prints the expected
//! output. Script individual inputs with [`MockJudge::with_stdout`] or
//! [`MockJudge::with_outcome`]; every call is logged so tests can assert
//! exactly how many evaluations happened and in which order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Judge, JudgeRequest, compare_output};
use crate::outcome::SubmissionOutcome;

#[derive(Debug, Clone)]
enum Script {
    /// Pretend the program printed this
    Stdout(String),
    /// Return this outcome verbatim
    Outcome(SubmissionOutcome),
}

/// Mock implementation of [`Judge`]
#[derive(Debug, Default)]
pub struct MockJudge {
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl MockJudge {
    /// A judge that accepts every case unless scripted otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the program prints `stdout` when fed `stdin`.
    pub fn with_stdout(mut self, stdin: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.scripts
            .insert(stdin.into(), Script::Stdout(stdout.into()));
        self
    }

    /// Return `outcome` verbatim when fed `stdin`.
    pub fn with_outcome(mut self, stdin: impl Into<String>, outcome: SubmissionOutcome) -> Self {
        self.scripts.insert(stdin.into(), Script::Outcome(outcome));
        self
    }

    /// Delay every evaluation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// Delay evaluations of one input (overrides [`with_delay`](Self::with_delay)).
    pub fn with_delay_for(mut self, stdin: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(stdin.into(), delay);
        self
    }

    /// Number of evaluations performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Inputs evaluated so far, in call order.
    pub async fn inputs(&self) -> Vec<String> {
        self.inputs.lock().await.clone()
    }
}

#[async_trait]
impl Judge for MockJudge {
    async fn evaluate(&self, request: JudgeRequest<'_>) -> SubmissionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().await.push(request.stdin.to_string());

        if let Some(delay) = self.delays.get(request.stdin).or(self.default_delay.as_ref()) {
            tokio::time::sleep(*delay).await;
        }

        match self.scripts.get(request.stdin) {
            Some(Script::Outcome(outcome)) => outcome.clone(),
            Some(Script::Stdout(stdout)) => SubmissionOutcome {
                verdict: compare_output(&request, stdout),
                stdout: Some(stdout.clone()),
                ..SubmissionOutcome::accepted()
            },
            None => SubmissionOutcome {
                stdout: Some(request.expected_output.to_string()),
                ..SubmissionOutcome::accepted()
            },
        }
    }
}
