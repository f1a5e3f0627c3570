//! Problem packs stored as JSON files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ProblemProvisioner;
use crate::error::ProvisionError;
use crate::problem::{CodingProblem, QuizQuestion, QuizSet};
use crate::types::Difficulty;

/// On-disk pack: a topic plus coding problems and/or quiz questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemPack {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub problems: Vec<CodingProblem>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

impl ProblemPack {
    /// Problems of the requested tier, or the whole set when the pack has
    /// none of that tier.
    #[must_use]
    pub fn problems_for(&self, difficulty: Difficulty) -> Vec<CodingProblem> {
        let tiered: Vec<CodingProblem> = self
            .problems
            .iter()
            .filter(|p| p.difficulty == difficulty)
            .cloned()
            .collect();
        if tiered.is_empty() {
            debug!(difficulty = difficulty.as_str(), "no problems of requested tier, serving all");
            self.problems.clone()
        } else {
            tiered
        }
    }

    /// The first `count` questions.
    #[must_use]
    pub fn quiz(&self, fallback_topic: &str, count: usize) -> QuizSet {
        QuizSet {
            topic: self
                .topic
                .clone()
                .unwrap_or_else(|| fallback_topic.to_string()),
            questions: self.questions.iter().take(count).cloned().collect(),
        }
    }
}

/// Provisioner reading a [`ProblemPack`] from a JSON file on every request.
pub struct FileProvisioner {
    path: PathBuf,
}

impl FileProvisioner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the pack.
    pub async fn load(&self) -> Result<ProblemPack, ProvisionError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let pack = serde_json::from_str(&contents)?;
        Ok(pack)
    }
}

#[async_trait]
impl ProblemProvisioner for FileProvisioner {
    async fn generate(
        &self,
        _source_material: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<CodingProblem>, ProvisionError> {
        Ok(self.load().await?.problems_for(difficulty))
    }

    async fn generate_quiz(
        &self,
        source_material: &str,
        count: usize,
    ) -> Result<QuizSet, ProvisionError> {
        Ok(self.load().await?.quiz(source_material, count))
    }
}
