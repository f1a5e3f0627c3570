//! End-to-end session tests.
//!
//! These drive an [`AssessmentSession`] through its public API only:
//! - timer-forced completion under a manual clock
//! - quiz scoring and JSONL progress recording
//! - coding runs and submits through a SimulatedJudge
//! - problem packs loaded from disk

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use proctor_core::{
    AssessmentSession, CodingProblem, CompletionReason, Difficulty, Example, FileProvisioner,
    JsonlProgressRecorder, JudgeError, Language, ManualClock, MockJudge, ProblemPack,
    QuizQuestion, QuizSet, RunEvaluator, SessionConfig, SessionMode, SessionRequest,
    SessionStatus, SimulatedJudge, Simulation, Simulator, StaticProvisioner, SubmitEvaluator,
    TestCase, Verdict,
};

// --- Fixtures ---

fn question(n: usize) -> QuizQuestion {
    QuizQuestion {
        question_text: format!("Question {n}?"),
        options: ["w", "x", "y", "z"].iter().map(|o| format!("{o}{n}")).collect(),
        correct_answer: format!("x{n}"),
        explanation: String::new(),
    }
}

fn five_question_quiz() -> QuizSet {
    QuizSet {
        topic: "borrowing".to_string(),
        questions: (0..5).map(question).collect(),
    }
}

fn sum_problem() -> CodingProblem {
    CodingProblem {
        id: "sum".to_string(),
        title: "Sum".to_string(),
        difficulty: Difficulty::Easy,
        description: "Print a + b.".to_string(),
        constraints: Vec::new(),
        examples: vec![
            Example {
                input: "2 3".to_string(),
                output: "5".to_string(),
                explanation: None,
            },
            Example {
                input: "10 -4".to_string(),
                output: "6".to_string(),
                explanation: None,
            },
        ],
        test_cases: ["1 1:2", "0 0:0", "-5 5:0", "100 200:300", "7 8:15"]
            .iter()
            .map(|case| {
                let (input, output) = case.split_once(':').unwrap();
                TestCase {
                    input: input.to_string(),
                    output: output.to_string(),
                }
            })
            .collect(),
        starter_code: BTreeMap::new(),
    }
}

fn quiz_request() -> SessionRequest {
    SessionRequest::Quiz {
        source_material: "borrowing".to_string(),
        count: None,
    }
}

fn coding_request() -> SessionRequest {
    SessionRequest::Coding {
        source_material: "arithmetic".to_string(),
        difficulty: Difficulty::Easy,
    }
}

/// Pretends to run programs of the form `print(a <op> b)`.
///
/// Adds when the source contains `a + b`, subtracts otherwise.
struct ArithmeticSimulator {
    calls: AtomicUsize,
}

impl ArithmeticSimulator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Simulator for ArithmeticSimulator {
    async fn simulate(
        &self,
        _language: Language,
        source: &str,
        stdin: &str,
    ) -> Result<Simulation, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let numbers: Vec<i64> = stdin
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|e| JudgeError::InvalidReply(format!("bad stdin: {e}")))?;
        let [a, b] = numbers[..] else {
            return Err(JudgeError::InvalidReply("expected two numbers".to_string()));
        };
        let value = if source.contains("a + b") { a + b } else { a - b };
        Ok(Simulation {
            stdout: format!("{value}\n"),
            elapsed_ms: Some(12),
            memory_kb: Some(1024),
            ..Simulation::default()
        })
    }
}

// --- Timer ---

#[tokio::test]
async fn ten_minute_quiz_completes_from_answers_at_second_599() {
    let clock = Arc::new(ManualClock::new());
    let session = AssessmentSession::builder(
        Arc::new(StaticProvisioner::with_quiz(five_question_quiz())),
        Arc::new(MockJudge::new()),
    )
    .clock(clock.clone())
    .build();
    let mut status = session.subscribe();

    session.start(quiz_request()).await.unwrap();
    let mut remaining = session.watch_time_remaining().await;
    assert_eq!(*remaining.borrow(), 600);

    session.submit_answer(Some("x0".to_string())).await.unwrap();
    session.submit_answer(Some("w1".to_string())).await.unwrap();

    clock.advance(599);
    remaining.wait_for(|left| *left == 1).await.unwrap();
    assert_eq!(session.status(), SessionStatus::Active);

    // Last-second answer still counts.
    session.submit_answer(Some("x2".to_string())).await.unwrap();

    clock.advance(1);
    status
        .wait_for(|s| *s == SessionStatus::Completed)
        .await
        .unwrap();

    let summary = session.summary().await.unwrap();
    assert_eq!(summary.reason, CompletionReason::TimerExpired);
    assert_eq!(summary.score, 2);
    assert_eq!(summary.total, 5);
    assert_eq!(session.time_remaining().await, 0);
}

#[tokio::test]
async fn late_timer_after_completion_is_a_no_op() {
    let clock = Arc::new(ManualClock::new());
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(JsonlProgressRecorder::new(dir.path().join("history.jsonl")));
    let session = AssessmentSession::builder(
        Arc::new(StaticProvisioner::with_quiz(five_question_quiz())),
        Arc::new(MockJudge::new()),
    )
    .clock(clock.clone())
    .recorder(recorder.clone())
    .config(SessionConfig {
        quiz_duration_secs: 5,
        ..SessionConfig::default()
    })
    .build();

    session.start(quiz_request()).await.unwrap();
    for answer in ["x0", "x1", "x2", "x3", "x4"] {
        session.submit_answer(Some(answer.to_string())).await.unwrap();
    }
    clock.advance(60);
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }

    let history = recorder.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].score, 5);
    assert_eq!(history[0].reason, CompletionReason::AllAnswered);
    assert_eq!(history[0].mode, SessionMode::Quiz);
}

// --- Coding ---

#[tokio::test]
async fn run_reports_both_examples_for_correct_code() {
    let judge = Arc::new(SimulatedJudge::new(ArithmeticSimulator::new()));
    let evaluator = RunEvaluator::new(judge);

    let results = evaluator
        .run_against_examples(&sum_problem(), Language::Python, "print(a + b)")
        .await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.passed));
    assert_eq!(results[0].input, "2 3");
    assert_eq!(results[1].actual_output.trim(), "6");
}

#[tokio::test]
async fn submit_stops_at_hidden_case_two_after_three_calls() {
    let problem = sum_problem();
    let judge = Arc::new(MockJudge::new().with_stdout("-5 5", "10"));
    let evaluator = SubmitEvaluator::new(judge.clone());

    let outcome = evaluator.submit(&problem, Language::Python, "print(abs(a) + b)").await;

    assert_eq!(judge.call_count(), 3);
    match &outcome.verdict {
        Verdict::WrongAnswer { failed_input, .. } => assert_eq!(failed_input, "-5 5"),
        other => panic!("expected wrong answer, got {other}"),
    }
    assert_eq!(outcome.failed_case.unwrap().index, 2);
}

#[tokio::test]
async fn precheck_failures_never_reach_the_simulator() {
    let judge = Arc::new(SimulatedJudge::new(ArithmeticSimulator::new()));
    let evaluator = SubmitEvaluator::new(judge.clone());

    let outcome = evaluator
        .submit(&sum_problem(), Language::Python, "print((a + b)\n")
        .await;

    assert_eq!(outcome.verdict, Verdict::CompilationError);
    assert_eq!(judge.simulator().calls.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.failed_case.map(|c| c.index), Some(0));
}

#[tokio::test]
async fn coding_session_solves_one_of_two_problems() {
    let mut second = sum_problem();
    second.id = "diff".to_string();
    second.examples = vec![Example {
        input: "5 3".to_string(),
        output: "2".to_string(),
        explanation: None,
    }];
    second.test_cases = vec![TestCase {
        input: "9 4".to_string(),
        output: "5".to_string(),
    }];

    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(JsonlProgressRecorder::new(dir.path().join("history.jsonl")));
    let session = AssessmentSession::builder(
        Arc::new(StaticProvisioner::with_problems(vec![sum_problem(), second])),
        Arc::new(SimulatedJudge::new(ArithmeticSimulator::new())),
    )
    .clock(Arc::new(ManualClock::new()))
    .recorder(recorder.clone())
    .build();

    session.start(coding_request()).await.unwrap();

    let adding = "print(a + b)";
    let report = session.submit_code(Language::Python, adding).await.unwrap();
    assert_eq!(report.outcome.verdict, Verdict::Accepted);

    session.select_item(1).await.unwrap();
    let results = session.run_code(Language::Python, adding).await.unwrap();
    assert!(!results[0].passed);
    let report = session.submit_code(Language::Python, adding).await.unwrap();
    assert!(matches!(report.outcome.verdict, Verdict::WrongAnswer { .. }));

    let summary = session.end_session().await.unwrap();
    assert_eq!(summary.score, 1);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.problem_ids, vec!["sum".to_string(), "diff".to_string()]);
    assert_eq!(summary.reason, CompletionReason::EndedByUser);
    assert_eq!(recorder.history().await.unwrap(), vec![summary]);
}

// --- Provisioning from disk ---

#[tokio::test]
async fn session_runs_from_a_pack_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pack.json");
    let pack = ProblemPack {
        topic: Some("borrowing".to_string()),
        problems: vec![sum_problem()],
        questions: five_question_quiz().questions,
    };
    tokio::fs::write(&path, serde_json::to_string(&pack).unwrap())
        .await
        .unwrap();

    let session = AssessmentSession::builder(
        Arc::new(FileProvisioner::new(&path)),
        Arc::new(MockJudge::new()),
    )
    .clock(Arc::new(ManualClock::new()))
    .build();

    let snapshot = session
        .start(SessionRequest::Quiz {
            source_material: "ignored".to_string(),
            count: Some(3),
        })
        .await
        .unwrap();
    assert_eq!(snapshot.total, 3);

    session.reset().await;
    let snapshot = session.start(coding_request()).await.unwrap();
    assert_eq!(snapshot.mode, Some(SessionMode::Coding));
    assert_eq!(snapshot.total, 1);
}

#[tokio::test]
async fn broken_pack_leaves_session_in_error_until_reset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pack.json");
    tokio::fs::write(&path, r#"{"questions": []}"#).await.unwrap();

    let session = AssessmentSession::builder(
        Arc::new(FileProvisioner::new(&path)),
        Arc::new(MockJudge::new()),
    )
    .clock(Arc::new(ManualClock::new()))
    .build();

    assert!(session.start(quiz_request()).await.is_err());
    assert!(matches!(session.status(), SessionStatus::Error { .. }));
    assert!(session.start(quiz_request()).await.is_err());

    session.reset().await;
    assert_eq!(session.status(), SessionStatus::Idle);
}
