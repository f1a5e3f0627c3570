//! Fan-out evaluation of visible examples.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::debug;

use crate::judge::{Judge, JudgeRequest};
use crate::outcome::{SubmissionOutcome, TestCaseResult};
use crate::problem::{CodingProblem, Example};
use crate::types::Language;

/// Runs code against a problem's visible examples.
#[derive(Clone)]
pub struct RunEvaluator {
    judge: Arc<dyn Judge>,
}

impl RunEvaluator {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self { judge }
    }

    /// Evaluate `code` against every example concurrently.
    ///
    /// Returns one result per example, in example order, once all have
    /// resolved. A failing example never stops its siblings.
    pub async fn run_against_examples(
        &self,
        problem: &CodingProblem,
        language: Language,
        code: &str,
    ) -> Vec<TestCaseResult> {
        let judge = self.judge.as_ref();
        let results = join_all(problem.examples.iter().map(|example| async move {
            let outcome = judge
                .evaluate(JudgeRequest::new(
                    language,
                    code,
                    &example.input,
                    &example.output,
                ))
                .await;
            to_result(example, outcome)
        }))
        .await;

        debug!(
            problem_id = %problem.id,
            examples = results.len(),
            passed = results.iter().filter(|r| r.passed).count(),
            "ran examples"
        );
        results
    }
}

fn to_result(example: &Example, outcome: SubmissionOutcome) -> TestCaseResult {
    let passed = outcome.is_accepted();
    let error = if passed {
        None
    } else {
        Some(
            outcome
                .diagnostic()
                .map(str::to_string)
                .unwrap_or_else(|| outcome.verdict.label().to_string()),
        )
    };
    TestCaseResult {
        input: example.input.clone(),
        expected_output: example.output.clone(),
        actual_output: outcome.stdout.unwrap_or_default(),
        passed,
        error,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::judge::MockJudge;
    use crate::problem::fixtures::sum_problem;

    const CODE: &str = "a, b = map(int, input().split())\nprint(a + b)\n";

    #[tokio::test]
    async fn correct_code_passes_both_examples() {
        let judge = Arc::new(MockJudge::new());
        let evaluator = RunEvaluator::new(judge.clone());

        let results = evaluator
            .run_against_examples(&sum_problem(), Language::Python, CODE)
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
        assert_eq!(results[0].input, "2 3");
        assert_eq!(results[0].actual_output, "5");
        assert_eq!(results[1].input, "10 -4");
        assert_eq!(results[1].expected_output, "6");
        assert_eq!(judge.call_count(), 2);
    }

    #[tokio::test]
    async fn every_example_is_reported_even_after_a_failure() {
        let judge = Arc::new(
            MockJudge::new()
                .with_outcome("2 3", SubmissionOutcome::runtime_error("ValueError"))
                .with_stdout("10 -4", "6"),
        );
        let evaluator = RunEvaluator::new(judge.clone());

        let results = evaluator
            .run_against_examples(&sum_problem(), Language::Python, CODE)
            .await;

        assert_eq!(results.len(), 2);
        assert!(!results[0].passed);
        assert_eq!(results[0].error.as_deref(), Some("ValueError"));
        assert!(results[1].passed);
        assert_eq!(judge.call_count(), 2);
    }

    #[tokio::test]
    async fn wrong_answer_without_diagnostic_reports_the_verdict() {
        let judge = Arc::new(MockJudge::new().with_stdout("10 -4", "14"));
        let evaluator = RunEvaluator::new(judge);

        let results = evaluator
            .run_against_examples(&sum_problem(), Language::Python, CODE)
            .await;

        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert_eq!(results[1].actual_output, "14");
        assert_eq!(results[1].error.as_deref(), Some("Wrong Answer"));
    }

    #[tokio::test(start_paused = true)]
    async fn results_keep_example_order_when_completion_order_differs() {
        let judge = Arc::new(
            MockJudge::new()
                .with_delay_for("2 3", Duration::from_millis(500))
                .with_delay_for("10 -4", Duration::from_millis(10)),
        );
        let evaluator = RunEvaluator::new(judge.clone());

        let results = evaluator
            .run_against_examples(&sum_problem(), Language::Python, CODE)
            .await;

        assert_eq!(results[0].input, "2 3");
        assert_eq!(results[1].input, "10 -4");
    }

    #[tokio::test(start_paused = true)]
    async fn examples_are_evaluated_concurrently() {
        let judge = Arc::new(MockJudge::new().with_delay(Duration::from_secs(1)));
        let evaluator = RunEvaluator::new(judge);

        let start = tokio::time::Instant::now();
        evaluator
            .run_against_examples(&sum_problem(), Language::Python, CODE)
            .await;

        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn rerunning_unchanged_code_yields_identical_results() {
        let judge = Arc::new(MockJudge::new().with_stdout("10 -4", "7"));
        let evaluator = RunEvaluator::new(judge);
        let problem = sum_problem();

        let first = evaluator
            .run_against_examples(&problem, Language::Python, CODE)
            .await;
        let second = evaluator
            .run_against_examples(&problem, Language::Python, CODE)
            .await;

        assert_eq!(first, second);
    }
}
