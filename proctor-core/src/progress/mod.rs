//! Progress recording
//!
//! When a session completes it hands a [`SessionSummary`] to a
//! [`ProgressRecorder`]. Recording is fire-and-forget from the session's
//! point of view: failures are logged and never undo the completion.

mod jsonl;
mod memory;

pub use jsonl::JsonlProgressRecorder;
pub use memory::MemoryProgressRecorder;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::types::{SessionId, SessionMode};

/// Why a session reached `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// The last quiz question was answered.
    AllAnswered,
    /// The user ended the session.
    EndedByUser,
    /// The countdown reached zero.
    TimerExpired,
}

impl CompletionReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllAnswered => "all_answered",
            Self::EndedByUser => "ended_by_user",
            Self::TimerExpired => "timer_expired",
        }
    }
}

/// Outcome of one completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub mode: SessionMode,
    /// Correct answers (quiz) or solved problems (coding).
    pub score: usize,
    pub total: usize,
    /// Quiz topic, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Coding problem ids, in session order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub problem_ids: Vec<String>,
    pub completed_at: DateTime<Utc>,
    pub reason: CompletionReason,
}

impl SessionSummary {
    /// Score as a percentage of the total; 0 for an empty session.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.score as f64 * 100.0 / self.total as f64
        }
    }
}

/// Persists completed session summaries.
#[async_trait]
pub trait ProgressRecorder: Send + Sync {
    async fn record(&self, summary: &SessionSummary) -> Result<(), RecordError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_handles_empty_sessions() {
        assert_eq!(fixtures::summary(0, 0).percentage(), 0.0);
        assert_eq!(fixtures::summary(3, 4).percentage(), 75.0);
    }

    #[test]
    fn summary_wire_format_is_camel_case() {
        let json = serde_json::to_value(fixtures::summary(1, 5)).unwrap();
        assert_eq!(json["mode"], "quiz");
        assert_eq!(json["reason"], "all_answered");
        assert!(json.get("completedAt").is_some());
        assert!(json.get("problemIds").is_none());
    }
}
