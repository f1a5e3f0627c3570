//! Sequential, short-circuiting evaluation of hidden test cases.

use std::future;
use std::pin::pin;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::judge::{Judge, JudgeRequest};
use crate::outcome::{FailedCase, SubmissionOutcome};
use crate::problem::CodingProblem;
use crate::types::Language;

/// Submits code against a problem's hidden test cases.
#[derive(Clone)]
pub struct SubmitEvaluator {
    judge: Arc<dyn Judge>,
}

impl SubmitEvaluator {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self { judge }
    }

    /// Judge `code` against each hidden case in order, one at a time.
    ///
    /// Case `i + 1` is only evaluated once case `i` was Accepted, so a
    /// submission failing at index `k` costs exactly `k + 1` judge calls. The
    /// first non-Accepted outcome is returned with the failing case attached;
    /// if every case passes the result is a plain Accepted outcome.
    pub async fn submit(
        &self,
        problem: &CodingProblem,
        language: Language,
        code: &str,
    ) -> SubmissionOutcome {
        let judge = self.judge.as_ref();

        let mut failures = pin!(stream::iter(problem.test_cases.iter().cloned().enumerate())
            .then(|(index, case)| async move {
                let outcome = judge
                    .evaluate(JudgeRequest::new(language, code, &case.input, &case.output))
                    .await;
                debug!(problem_id = %problem.id, case = index, verdict = %outcome.verdict, "judged hidden case");
                (index, outcome)
            })
            .skip_while(|(_, outcome)| future::ready(outcome.is_accepted()))
            .boxed());
        let first_failure = failures.next().await;

        match first_failure {
            Some((index, mut outcome)) => {
                info!(
                    problem_id = %problem.id,
                    case = index,
                    verdict = %outcome.verdict,
                    "submission stopped at first failing case"
                );
                outcome.failed_case = Some(FailedCase {
                    index,
                    input: problem.test_cases[index].input.clone(),
                });
                outcome
            }
            None => {
                info!(problem_id = %problem.id, cases = problem.test_cases.len(), "submission accepted");
                SubmissionOutcome::accepted()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::MockJudge;
    use crate::outcome::Verdict;
    use crate::problem::fixtures::sum_problem;

    const CODE: &str = "a, b = map(int, input().split())\nprint(a + b)\n";

    #[tokio::test]
    async fn all_correct_code_is_accepted_after_every_case() {
        let judge = Arc::new(MockJudge::new());
        let evaluator = SubmitEvaluator::new(judge.clone());
        let problem = sum_problem();

        let outcome = evaluator.submit(&problem, Language::Python, CODE).await;

        assert_eq!(outcome.verdict, Verdict::Accepted);
        assert!(outcome.failed_case.is_none());
        assert_eq!(judge.call_count(), problem.test_cases.len());
    }

    #[tokio::test]
    async fn failure_at_index_two_stops_after_three_calls() {
        let problem = sum_problem();
        let failing_input = problem.test_cases[2].input.clone();
        let judge = Arc::new(MockJudge::new().with_stdout(failing_input.clone(), "-1"));
        let evaluator = SubmitEvaluator::new(judge.clone());

        let outcome = evaluator.submit(&problem, Language::Python, CODE).await;

        assert_eq!(judge.call_count(), 3);
        assert_eq!(
            outcome.verdict,
            Verdict::WrongAnswer {
                failed_input: failing_input.clone(),
                expected_output: problem.test_cases[2].output.clone(),
            }
        );
        assert_eq!(
            outcome.failed_case,
            Some(FailedCase {
                index: 2,
                input: failing_input,
            })
        );
    }

    #[tokio::test]
    async fn cases_are_judged_in_defined_order() {
        let problem = sum_problem();
        let judge = Arc::new(MockJudge::new());
        let evaluator = SubmitEvaluator::new(judge.clone());

        evaluator.submit(&problem, Language::Python, CODE).await;

        let expected: Vec<String> = problem.test_cases.iter().map(|c| c.input.clone()).collect();
        assert_eq!(judge.inputs().await, expected);
    }

    #[tokio::test]
    async fn first_case_failure_makes_a_single_call() {
        let problem = sum_problem();
        let judge = Arc::new(MockJudge::new().with_outcome(
            problem.test_cases[0].input.clone(),
            SubmissionOutcome::compilation_error("invalid syntax"),
        ));
        let evaluator = SubmitEvaluator::new(judge.clone());

        let outcome = evaluator.submit(&problem, Language::Python, CODE).await;

        assert_eq!(judge.call_count(), 1);
        assert_eq!(outcome.verdict, Verdict::CompilationError);
        assert_eq!(outcome.failed_case.map(|c| c.index), Some(0));
    }

    #[tokio::test]
    async fn non_wrong_answer_failures_still_name_the_failing_input() {
        let problem = sum_problem();
        let judge = Arc::new(MockJudge::new().with_outcome(
            problem.test_cases[4].input.clone(),
            SubmissionOutcome::time_limit_exceeded("too slow"),
        ));
        let evaluator = SubmitEvaluator::new(judge.clone());

        let outcome = evaluator.submit(&problem, Language::Python, CODE).await;

        assert_eq!(judge.call_count(), 5);
        assert_eq!(outcome.verdict, Verdict::TimeLimitExceeded);
        assert_eq!(
            outcome.failed_case.unwrap().input,
            problem.test_cases[4].input
        );
    }

    #[tokio::test]
    async fn submission_runs_on_a_spawned_task() {
        let judge = Arc::new(MockJudge::new());
        let evaluator = SubmitEvaluator::new(judge.clone());
        let problem = sum_problem();
        let cases = problem.test_cases.len();

        let handle = tokio::spawn(async move {
            evaluator.submit(&problem, Language::Python, CODE).await
        });

        assert_eq!(handle.await.unwrap().verdict, Verdict::Accepted);
        assert_eq!(judge.call_count(), cases);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_cases_are_never_judged_concurrently() {
        use std::time::Duration;

        let problem = sum_problem();
        let judge = Arc::new(MockJudge::new().with_delay(Duration::from_secs(1)));
        let evaluator = SubmitEvaluator::new(judge);

        let start = tokio::time::Instant::now();
        evaluator.submit(&problem, Language::Python, CODE).await;

        assert!(start.elapsed() >= Duration::from_secs(problem.test_cases.len() as u64));
    }
}
