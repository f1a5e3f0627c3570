//! proctor-core: timed assessment sessions and code judging
//!
//! This crate provides the engine behind proctor:
//!
//! - **Judging** - the [`Judge`] trait, the heuristic-plus-backend [`SimulatedJudge`]
//!   and a scripted [`MockJudge`]
//! - **Evaluation** - [`RunEvaluator`] (parallel, visible examples) and
//!   [`SubmitEvaluator`] (sequential, hidden tests, stops at the first failure)
//! - **Sessions** - the [`AssessmentSession`] state machine for quiz and coding sessions
//! - **Timing** - [`SessionTimer`] with an injectable [`Clock`]
//! - **Collaborators** - [`ProblemProvisioner`], [`HintAdvisor`] and [`ProgressRecorder`]
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use proctor_core::{
//!     AssessmentSession, FileProvisioner, MockJudge, SessionRequest,
//! };
//!
//! async fn example() -> Result<(), proctor_core::ProctorError> {
//!     let session = AssessmentSession::builder(
//!         Arc::new(FileProvisioner::new("pack.json")),
//!         Arc::new(MockJudge::new()),
//!     )
//!     .build();
//!
//!     session
//!         .start(SessionRequest::Quiz {
//!             source_material: "Rust ownership".to_string(),
//!             count: None,
//!         })
//!         .await?;
//!     session.submit_answer(Some("Moves".to_string())).await?;
//!     let summary = session.end_session().await?;
//!     println!("{}/{}", summary.score, summary.total);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ProblemProvisioner ──▶ AssessmentSession ──▶ ProgressRecorder
//!                          │         │
//!                   RunEvaluator  SubmitEvaluator ──▶ HintAdvisor
//!                          │         │
//!                          └─ Judge ─┘
//! ```

pub mod error;
pub mod evaluate;
pub mod hints;
pub mod judge;
pub mod outcome;
pub mod problem;
pub mod progress;
pub mod provision;
pub mod session;
pub mod timer;
pub mod types;

// Re-export key types for convenience
pub use error::{HintError, JudgeError, ProctorError, ProvisionError, RecordError, SessionError};
pub use evaluate::{RunEvaluator, SubmitEvaluator};
pub use hints::{FALLBACK_HINT, HintAdvisor};
pub use judge::{Judge, JudgeRequest, MockJudge, SimulatedJudge, Simulation, Simulator};
pub use outcome::{FailedCase, SubmissionOutcome, TestCaseResult, Verdict};
pub use problem::{CodingProblem, Example, QuizQuestion, QuizSet, TestCase};
pub use progress::{
    CompletionReason, JsonlProgressRecorder, MemoryProgressRecorder, ProgressRecorder,
    SessionSummary,
};
pub use provision::{FileProvisioner, ProblemPack, ProblemProvisioner, StaticProvisioner};
pub use session::{
    AssessmentSession, AttemptReport, CurrentItem, ProblemProgress, SessionConfig,
    SessionRequest, SessionSnapshot, SessionStatus,
};
pub use timer::{Clock, ManualClock, SessionTimer, SystemClock};
pub use types::{Difficulty, Language, SessionId, SessionMode};
