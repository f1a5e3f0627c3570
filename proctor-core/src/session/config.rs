//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for assessment sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Countdown for quiz sessions, in seconds.
    pub quiz_duration_secs: u64,
    /// Countdown for coding sessions, in seconds.
    pub coding_duration_secs: u64,
    /// Ask the hint advisor after a failed submit.
    pub hints_enabled: bool,
    /// Questions requested when a quiz request does not say.
    pub quiz_question_count: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quiz_duration_secs: 10 * 60,
            coding_duration_secs: 45 * 60,
            hints_enabled: true,
            quiz_question_count: 5,
        }
    }
}

impl SessionConfig {
    pub fn quiz_duration(&self) -> Duration {
        Duration::from_secs(self.quiz_duration_secs)
    }

    pub fn coding_duration(&self) -> Duration {
        Duration::from_secs(self.coding_duration_secs)
    }
}
