//! Append-only JSONL session history.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use super::{ProgressRecorder, SessionSummary};
use crate::error::RecordError;

/// One JSON summary per line, appended on every completion.
pub struct JsonlProgressRecorder {
    path: PathBuf,
}

impl JsonlProgressRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<(), RecordError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Recorded summaries, oldest first. Unreadable lines are skipped.
    pub async fn history(&self) -> Result<Vec<SessionSummary>, RecordError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut summaries = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!(path = %self.path.display(), error = %e, "Skipping unreadable history line"),
            }
        }

        Ok(summaries)
    }
}

#[async_trait]
impl ProgressRecorder for JsonlProgressRecorder {
    async fn record(&self, summary: &SessionSummary) -> Result<(), RecordError> {
        self.ensure_parent_dir().await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut json = serde_json::to_string(summary)?;
        json.push('\n');
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
