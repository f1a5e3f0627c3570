//! Session status and per-item progress

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outcome::{SubmissionOutcome, TestCaseResult};
use crate::problem::{CodingProblem, QuizQuestion, QuizSet};
use crate::types::{Language, SessionId, SessionMode};

/// Lifecycle state of an [`AssessmentSession`](super::AssessmentSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// No items loaded
    Idle,
    /// Waiting on the provisioner
    Provisioning,
    /// Items loaded, clock running
    Active,
    /// Graded; terminal for this session instance
    Completed,
    /// Failed; terminal until reset
    Error { message: String },
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Provisioning => "Provisioning",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Error { .. } => "Error",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error { .. })
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quiz answers in progress.
#[derive(Debug, Clone)]
pub(crate) struct QuizProgress {
    pub quiz: QuizSet,
    pub current_index: usize,
    pub answers: BTreeMap<usize, String>,
}

impl QuizProgress {
    pub fn new(quiz: QuizSet) -> Self {
        Self {
            quiz,
            current_index: 0,
            answers: BTreeMap::new(),
        }
    }

    /// Correct answers. Unanswered questions count as wrong.
    pub fn score(&self) -> usize {
        self.answers
            .iter()
            .filter(|(index, answer)| {
                self.quiz
                    .questions
                    .get(**index)
                    .is_some_and(|q| q.is_correct(answer))
            })
            .count()
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.quiz.questions.len()
    }
}

/// Work on one coding problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemProgress {
    /// Latest code per language
    pub code: BTreeMap<Language, String>,
    /// Submit attempts
    pub attempts: u32,
    /// Set by the first Accepted submit; never cleared
    pub solved: bool,
    pub last_outcome: Option<SubmissionOutcome>,
    pub last_results: Vec<TestCaseResult>,
    pub hint: Option<String>,
}

impl ProblemProgress {
    /// Saved code for `language`, falling back to the problem's starter code.
    pub fn code_for<'a>(&'a self, problem: &'a CodingProblem, language: Language) -> &'a str {
        self.code
            .get(&language)
            .map_or_else(|| problem.starter_code(language), String::as_str)
    }
}

/// Coding problems in progress.
#[derive(Debug, Clone)]
pub(crate) struct CodingProgress {
    pub problems: Vec<CodingProblem>,
    pub progress: Vec<ProblemProgress>,
    pub current_index: usize,
}

impl CodingProgress {
    pub fn new(problems: Vec<CodingProblem>) -> Self {
        let progress = vec![ProblemProgress::default(); problems.len()];
        Self {
            problems,
            progress,
            current_index: 0,
        }
    }

    /// Solved problems.
    pub fn score(&self) -> usize {
        self.progress.iter().filter(|p| p.solved).count()
    }
}

/// Items a session is working through.
#[derive(Debug, Clone)]
pub(crate) enum Items {
    Quiz(QuizProgress),
    Coding(CodingProgress),
}

impl Items {
    pub fn mode(&self) -> SessionMode {
        match self {
            Self::Quiz(_) => SessionMode::Quiz,
            Self::Coding(_) => SessionMode::Coding,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Quiz(q) => q.quiz.questions.len(),
            Self::Coding(c) => c.problems.len(),
        }
    }

    pub fn current_index(&self) -> usize {
        match self {
            Self::Quiz(q) => q.current_index,
            Self::Coding(c) => c.current_index,
        }
    }

    pub fn score(&self) -> usize {
        match self {
            Self::Quiz(q) => q.score(),
            Self::Coding(c) => c.score(),
        }
    }

    /// Answered questions, or problems with at least one submit.
    pub fn answered(&self) -> usize {
        match self {
            Self::Quiz(q) => q.answers.len(),
            Self::Coding(c) => c.progress.iter().filter(|p| p.attempts > 0).count(),
        }
    }

    pub fn current_item(&self) -> Option<CurrentItem> {
        let total = self.len();
        match self {
            Self::Quiz(q) => q.quiz.questions.get(q.current_index).map(|question| {
                CurrentItem::Question {
                    index: q.current_index,
                    total,
                    question: question.clone(),
                }
            }),
            Self::Coding(c) => c.problems.get(c.current_index).map(|problem| CurrentItem::Problem {
                index: c.current_index,
                total,
                problem: problem.clone(),
                progress: c.progress[c.current_index].clone(),
            }),
        }
    }
}

/// The item the user is looking at.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentItem {
    Question {
        index: usize,
        total: usize,
        question: QuizQuestion,
    },
    Problem {
        index: usize,
        total: usize,
        problem: CodingProblem,
        progress: ProblemProgress,
    },
}

/// Read model of a session for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub status: SessionStatus,
    pub mode: Option<SessionMode>,
    pub current_index: usize,
    pub total: usize,
    pub answered: usize,
    pub time_remaining_secs: u64,
    /// Present once the session is graded.
    pub score: Option<usize>,
}
