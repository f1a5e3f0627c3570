//! The assessment session state machine.

use std::sync::{Arc, Weak};

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::state::{
    CodingProgress, CurrentItem, Items, ProblemProgress, QuizProgress, SessionSnapshot,
    SessionStatus,
};
use crate::error::{ProvisionError, SessionError};
use crate::evaluate::{RunEvaluator, SubmitEvaluator};
use crate::hints::{self, HintAdvisor};
use crate::judge::Judge;
use crate::outcome::{SubmissionOutcome, TestCaseResult};
use crate::problem::{CodingProblem, validate_problems, validate_quiz};
use crate::progress::{CompletionReason, ProgressRecorder, SessionSummary};
use crate::provision::ProblemProvisioner;
use crate::timer::{Clock, SessionTimer, SystemClock};
use crate::types::{Difficulty, Language, SessionId, SessionMode};

/// What to provision when a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    /// A multiple-choice quiz. `count` defaults to the configured question count.
    Quiz {
        source_material: String,
        count: Option<usize>,
    },
    /// A set of coding problems.
    Coding {
        source_material: String,
        difficulty: Difficulty,
    },
}

impl SessionRequest {
    fn mode(&self) -> SessionMode {
        match self {
            Self::Quiz { .. } => SessionMode::Quiz,
            Self::Coding { .. } => SessionMode::Coding,
        }
    }
}

/// Result of one submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptReport {
    pub outcome: SubmissionOutcome,
    /// Remediation text, present only for a failed attempt with hints enabled.
    pub hint: Option<String>,
}

/// Builder for [`AssessmentSession`].
pub struct SessionBuilder {
    provisioner: Arc<dyn ProblemProvisioner>,
    judge: Arc<dyn Judge>,
    hint_advisor: Option<Arc<dyn HintAdvisor>>,
    recorder: Option<Arc<dyn ProgressRecorder>>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl SessionBuilder {
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn hint_advisor(mut self, advisor: Arc<dyn HintAdvisor>) -> Self {
        self.hint_advisor = Some(advisor);
        self
    }

    #[must_use]
    pub fn recorder(mut self, recorder: Arc<dyn ProgressRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> AssessmentSession {
        let id = SessionId::new();
        let (status_tx, _) = watch::channel(SessionStatus::Idle);
        AssessmentSession {
            inner: Arc::new(Inner {
                provisioner: self.provisioner,
                run: RunEvaluator::new(self.judge.clone()),
                submit: SubmitEvaluator::new(self.judge),
                hint_advisor: self.hint_advisor,
                recorder: self.recorder,
                config: self.config,
                status_tx,
                core: Mutex::new(Core {
                    id,
                    status: SessionStatus::Idle,
                    items: None,
                    timer: SessionTimer::new(self.clock),
                    epoch: 0,
                    summary: None,
                }),
            }),
        }
    }
}

/// One timed attempt at a quiz or a set of coding problems.
///
/// Cheap to clone; clones share the same session. All state is owned by the
/// session and changes only through its commands. Commands that await a
/// collaborator (provisioning, judging) release the lock while waiting and
/// discard their result with [`SessionError::StaleResult`] if the session
/// moved on in the meantime.
#[derive(Clone)]
pub struct AssessmentSession {
    inner: Arc<Inner>,
}

struct Inner {
    provisioner: Arc<dyn ProblemProvisioner>,
    run: RunEvaluator,
    submit: SubmitEvaluator,
    hint_advisor: Option<Arc<dyn HintAdvisor>>,
    recorder: Option<Arc<dyn ProgressRecorder>>,
    config: SessionConfig,
    status_tx: watch::Sender<SessionStatus>,
    core: Mutex<Core>,
}

struct Core {
    id: SessionId,
    status: SessionStatus,
    items: Option<Items>,
    timer: SessionTimer,
    /// Bumped on every transition that invalidates in-flight work.
    epoch: u64,
    summary: Option<SessionSummary>,
}

impl AssessmentSession {
    pub fn builder(
        provisioner: Arc<dyn ProblemProvisioner>,
        judge: Arc<dyn Judge>,
    ) -> SessionBuilder {
        SessionBuilder {
            provisioner,
            judge,
            hint_advisor: None,
            recorder: None,
            clock: Arc::new(SystemClock),
            config: SessionConfig::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.inner.status_tx.borrow().clone()
    }

    /// Watch status transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status_tx.subscribe()
    }

    pub async fn id(&self) -> SessionId {
        self.inner.core.lock().await.id
    }

    // ==================== Lifecycle ====================

    /// Provision items and start the clock. Only valid from `Idle`.
    ///
    /// Empty or malformed provisioner output moves the session to `Error`.
    pub async fn start(&self, request: SessionRequest) -> Result<SessionSnapshot, SessionError> {
        let epoch = {
            let mut core = self.lock().await;
            expect_status(&core, &SessionStatus::Idle)?;
            core.epoch += 1;
            self.set_status(&mut core, SessionStatus::Provisioning);
            info!(session_id = %core.id, mode = %request.mode(), "Provisioning session");
            core.epoch
        };

        let provisioned = self.provision(&request).await;

        let mut core = self.lock().await;
        if core.epoch != epoch || core.status != SessionStatus::Provisioning {
            debug!(session_id = %core.id, "Discarding provisioning result for superseded session");
            return Err(SessionError::StaleResult);
        }

        let items = match provisioned {
            Ok(items) => items,
            Err(e) => {
                warn!(session_id = %core.id, error = %e, "Provisioning failed");
                core.epoch += 1;
                self.set_status(
                    &mut core,
                    SessionStatus::Error {
                        message: e.to_string(),
                    },
                );
                return Err(e.into());
            }
        };

        let duration_secs = match items.mode() {
            SessionMode::Quiz => self.inner.config.quiz_duration_secs,
            SessionMode::Coding => self.inner.config.coding_duration_secs,
        };
        info!(
            session_id = %core.id,
            mode = %items.mode(),
            items = items.len(),
            duration_secs,
            "Session active"
        );
        core.items = Some(items);
        core.epoch += 1;
        let timer_epoch = core.epoch;
        let weak = Arc::downgrade(&self.inner);
        core.timer.start(duration_secs, move || on_timeout(weak, timer_epoch));
        self.set_status(&mut core, SessionStatus::Active);

        Ok(snapshot(&core))
    }

    async fn provision(&self, request: &SessionRequest) -> Result<Items, ProvisionError> {
        let provisioner = self.inner.provisioner.as_ref();
        match request {
            SessionRequest::Quiz {
                source_material,
                count,
            } => {
                let count = count.unwrap_or(self.inner.config.quiz_question_count);
                let quiz = provisioner.generate_quiz(source_material, count).await?;
                validate_quiz(&quiz)?;
                Ok(Items::Quiz(QuizProgress::new(quiz)))
            }
            SessionRequest::Coding {
                source_material,
                difficulty,
            } => {
                let problems = provisioner.generate(source_material, *difficulty).await?;
                validate_problems(&problems)?;
                Ok(Items::Coding(CodingProgress::new(problems)))
            }
        }
    }

    /// Grade the session now. Valid in either mode while `Active`.
    pub async fn end_session(&self) -> Result<SessionSummary, SessionError> {
        let summary = {
            let mut core = self.lock().await;
            expect_status(&core, &SessionStatus::Active)?;
            self.complete(&mut core, CompletionReason::EndedByUser)
        };
        self.record(&summary).await;
        Ok(summary)
    }

    /// Move an in-progress session to `Error`, dropping its progress.
    pub async fn abort(&self, message: impl Into<String>) -> Result<(), SessionError> {
        let mut core = self.lock().await;
        if !matches!(core.status, SessionStatus::Active | SessionStatus::Provisioning) {
            return Err(SessionError::InvalidState {
                expected: "Active or Provisioning".to_string(),
                actual: core.status.to_string(),
            });
        }
        let message = message.into();
        warn!(session_id = %core.id, %message, "Session aborted");
        core.timer.stop();
        core.items = None;
        core.epoch += 1;
        self.set_status(&mut core, SessionStatus::Error { message });
        Ok(())
    }

    /// Discard everything and return to `Idle` with a fresh session id.
    pub async fn reset(&self) {
        let mut core = self.lock().await;
        core.timer.stop();
        core.items = None;
        core.summary = None;
        core.epoch += 1;
        let previous = core.id;
        core.id = SessionId::new();
        debug!(previous = %previous, session_id = %core.id, "Session reset");
        self.set_status(&mut core, SessionStatus::Idle);
    }

    // ==================== Quiz ====================

    /// Record an answer for the current question and move on.
    ///
    /// `None` skips the question (it scores as wrong). Answering the last
    /// question grades the quiz and completes the session.
    pub async fn submit_answer(
        &self,
        answer: Option<String>,
    ) -> Result<SessionSnapshot, SessionError> {
        let (snapshot, summary) = {
            let mut core = self.lock().await;
            expect_status(&core, &SessionStatus::Active)?;
            let quiz = quiz_mut(&mut core)?;

            if let Some(answer) = answer {
                quiz.answers.insert(quiz.current_index, answer);
            }
            let finished = quiz.is_last();
            if !finished {
                quiz.current_index += 1;
            }

            let summary =
                finished.then(|| self.complete(&mut core, CompletionReason::AllAnswered));
            (snapshot(&core), summary)
        };

        if let Some(summary) = summary {
            self.record(&summary).await;
        }
        Ok(snapshot)
    }

    // ==================== Coding ====================

    /// Navigate to another problem.
    pub async fn select_item(&self, index: usize) -> Result<CurrentItem, SessionError> {
        let mut core = self.lock().await;
        expect_status(&core, &SessionStatus::Active)?;
        let coding = coding_mut(&mut core)?;
        if index >= coding.problems.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: coding.problems.len(),
            });
        }
        coding.current_index = index;
        current_item(&core).ok_or(SessionError::IndexOutOfRange { index, len: 0 })
    }

    /// Run `code` against the current problem's examples. Informational only.
    pub async fn run_code(
        &self,
        language: Language,
        code: &str,
    ) -> Result<Vec<TestCaseResult>, SessionError> {
        let (epoch, index, problem) = self.begin_attempt(language, code).await?;

        let results = self
            .inner
            .run
            .run_against_examples(&problem, language, code)
            .await;

        let mut core = self.lock().await;
        let progress = fresh_progress(&mut core, epoch, index)?;
        progress.last_results = results.clone();
        Ok(results)
    }

    /// Submit `code` for the current problem against its hidden tests.
    ///
    /// Accepted marks the problem solved. A failed attempt escalates to the
    /// hint advisor once when hints are enabled.
    pub async fn submit_code(
        &self,
        language: Language,
        code: &str,
    ) -> Result<AttemptReport, SessionError> {
        let (epoch, index, problem) = self.begin_attempt(language, code).await?;

        let outcome = self.inner.submit.submit(&problem, language, code).await;
        let hint = self.hint_for(&problem, code, &outcome).await;

        let mut core = self.lock().await;
        let session_id = core.id;
        let progress = fresh_progress(&mut core, epoch, index)?;
        progress.attempts += 1;
        if outcome.is_accepted() {
            progress.solved = true;
        }
        progress.last_outcome = Some(outcome.clone());
        progress.hint = hint.clone();
        info!(
            session_id = %session_id,
            problem_id = %problem.id,
            attempts = progress.attempts,
            verdict = %outcome.verdict,
            "Submission judged"
        );

        Ok(AttemptReport { outcome, hint })
    }

    /// Save code for the current problem and capture what an attempt needs.
    async fn begin_attempt(
        &self,
        language: Language,
        code: &str,
    ) -> Result<(u64, usize, CodingProblem), SessionError> {
        let mut core = self.lock().await;
        expect_status(&core, &SessionStatus::Active)?;
        let epoch = core.epoch;
        let coding = coding_mut(&mut core)?;
        let index = coding.current_index;
        coding.progress[index]
            .code
            .insert(language, code.to_string());
        Ok((epoch, index, coding.problems[index].clone()))
    }

    async fn hint_for(
        &self,
        problem: &CodingProblem,
        code: &str,
        outcome: &SubmissionOutcome,
    ) -> Option<String> {
        if outcome.is_accepted() || !self.inner.config.hints_enabled {
            return None;
        }
        let advisor = self.inner.hint_advisor.as_deref()?;
        let case = hints::failing_case(problem, outcome)?;
        Some(hints::escalate(advisor, problem, code, &case).await)
    }

    // ==================== Read models ====================

    pub async fn current_item(&self) -> Option<CurrentItem> {
        current_item(&*self.lock().await)
    }

    /// Seconds left on the session clock.
    pub async fn time_remaining(&self) -> u64 {
        self.lock().await.timer.remaining()
    }

    /// Watch the session clock count down.
    pub async fn watch_time_remaining(&self) -> watch::Receiver<u64> {
        self.lock().await.timer.watch_remaining()
    }

    /// Last submit outcome for the current problem.
    pub async fn last_outcome(&self) -> Option<SubmissionOutcome> {
        match &self.lock().await.items {
            Some(Items::Coding(c)) => c.progress[c.current_index].last_outcome.clone(),
            _ => None,
        }
    }

    /// Last run results for the current problem.
    pub async fn last_results(&self) -> Vec<TestCaseResult> {
        match &self.lock().await.items {
            Some(Items::Coding(c)) => c.progress[c.current_index].last_results.clone(),
            _ => Vec::new(),
        }
    }

    /// Progress on every coding problem, in session order.
    pub async fn problem_progress(&self) -> Vec<ProblemProgress> {
        match &self.lock().await.items {
            Some(Items::Coding(c)) => c.progress.clone(),
            _ => Vec::new(),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        snapshot(&*self.lock().await)
    }

    /// Summary of the completed session, if it has completed.
    pub async fn summary(&self) -> Option<SessionSummary> {
        self.lock().await.summary.clone()
    }

    // ==================== Internals ====================

    async fn lock(&self) -> MutexGuard<'_, Core> {
        self.inner.core.lock().await
    }

    fn set_status(&self, core: &mut Core, status: SessionStatus) {
        core.status = status.clone();
        self.inner.status_tx.send_replace(status);
    }

    /// Grade and move to `Completed`. Caller records the summary after
    /// releasing the lock.
    fn complete(&self, core: &mut Core, reason: CompletionReason) -> SessionSummary {
        core.timer.stop();
        core.epoch += 1;

        let (mode, score, total, topic, problem_ids) = match &core.items {
            Some(Items::Quiz(q)) => (
                SessionMode::Quiz,
                q.score(),
                q.quiz.questions.len(),
                Some(q.quiz.topic.clone()).filter(|t| !t.is_empty()),
                Vec::new(),
            ),
            Some(Items::Coding(c)) => (
                SessionMode::Coding,
                c.score(),
                c.problems.len(),
                None,
                c.problems.iter().map(|p| p.id.clone()).collect(),
            ),
            None => (SessionMode::Quiz, 0, 0, None, Vec::new()),
        };

        let summary = SessionSummary {
            session_id: core.id,
            mode,
            score,
            total,
            topic,
            problem_ids,
            completed_at: Utc::now(),
            reason,
        };
        info!(
            session_id = %core.id,
            score,
            total,
            reason = reason.as_str(),
            "Session completed"
        );
        core.summary = Some(summary.clone());
        self.set_status(core, SessionStatus::Completed);
        summary
    }

    async fn record(&self, summary: &SessionSummary) {
        let Some(recorder) = &self.inner.recorder else {
            return;
        };
        if let Err(e) = recorder.record(summary).await {
            warn!(session_id = %summary.session_id, error = %e, "Failed to record session progress");
        }
    }

    async fn expire(&self, epoch: u64) {
        let summary = {
            let mut core = self.lock().await;
            if core.status != SessionStatus::Active || core.epoch != epoch {
                debug!(session_id = %core.id, status = %core.status, "Ignoring late timer expiry");
                return;
            }
            self.complete(&mut core, CompletionReason::TimerExpired)
        };
        self.record(&summary).await;
    }
}

async fn on_timeout(session: Weak<Inner>, epoch: u64) {
    if let Some(inner) = session.upgrade() {
        AssessmentSession { inner }.expire(epoch).await;
    }
}

fn expect_status(core: &Core, expected: &SessionStatus) -> Result<(), SessionError> {
    if &core.status == expected {
        Ok(())
    } else {
        Err(SessionError::InvalidState {
            expected: expected.to_string(),
            actual: core.status.to_string(),
        })
    }
}

fn quiz_mut(core: &mut Core) -> Result<&mut QuizProgress, SessionError> {
    match core.items.as_mut() {
        Some(Items::Quiz(q)) => Ok(q),
        other => Err(SessionError::WrongMode {
            expected: SessionMode::Quiz.to_string(),
            actual: other.map_or("empty", |i| i.mode().as_str()).to_string(),
        }),
    }
}

fn coding_mut(core: &mut Core) -> Result<&mut CodingProgress, SessionError> {
    match core.items.as_mut() {
        Some(Items::Coding(c)) => Ok(c),
        other => Err(SessionError::WrongMode {
            expected: SessionMode::Coding.to_string(),
            actual: other.map_or("empty", |i| i.mode().as_str()).to_string(),
        }),
    }
}

/// Progress slot for an attempt, unless the session moved on since it began.
fn fresh_progress(
    core: &mut Core,
    epoch: u64,
    index: usize,
) -> Result<&mut ProblemProgress, SessionError> {
    if core.status != SessionStatus::Active || core.epoch != epoch {
        debug!(session_id = %core.id, status = %core.status, "Discarding stale evaluation result");
        return Err(SessionError::StaleResult);
    }
    let coding = coding_mut(core)?;
    coding
        .progress
        .get_mut(index)
        .ok_or(SessionError::StaleResult)
}

fn current_item(core: &Core) -> Option<CurrentItem> {
    core.items.as_ref().and_then(Items::current_item)
}

fn snapshot(core: &Core) -> SessionSnapshot {
    let items = core.items.as_ref();
    SessionSnapshot {
        id: core.id,
        status: core.status.clone(),
        mode: items.map(Items::mode),
        current_index: items.map_or(0, Items::current_index),
        total: items.map_or(0, Items::len),
        answered: items.map_or(0, Items::answered),
        time_remaining_secs: core.timer.remaining(),
        score: core.summary.as_ref().map(|s| s.score),
    }
}
