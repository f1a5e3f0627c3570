//! In-memory recorder for tests and throwaway sessions.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ProgressRecorder, SessionSummary};
use crate::error::RecordError;

#[derive(Debug, Default)]
pub struct MemoryProgressRecorder {
    records: Mutex<Vec<SessionSummary>>,
    fail: bool,
}

impl MemoryProgressRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose every `record` call fails with an IO error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn records(&self) -> Vec<SessionSummary> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ProgressRecorder for MemoryProgressRecorder {
    async fn record(&self, summary: &SessionSummary) -> Result<(), RecordError> {
        if self.fail {
            return Err(RecordError::Io(std::io::Error::other("recorder unavailable")));
        }
        self.records.lock().await.push(summary.clone());
        Ok(())
    }
}
