//! In-memory provisioner serving fixed items.

use async_trait::async_trait;

use super::ProblemProvisioner;
use crate::error::ProvisionError;
use crate::problem::{CodingProblem, QuizSet};
use crate::types::Difficulty;

/// Serves the same problems/quiz on every request, or fails every request.
#[derive(Debug, Clone, Default)]
pub struct StaticProvisioner {
    problems: Vec<CodingProblem>,
    quiz: Option<QuizSet>,
    failure: Option<String>,
}

impl StaticProvisioner {
    pub fn with_problems(problems: Vec<CodingProblem>) -> Self {
        Self {
            problems,
            ..Self::default()
        }
    }

    pub fn with_quiz(quiz: QuizSet) -> Self {
        Self {
            quiz: Some(quiz),
            ..Self::default()
        }
    }

    /// Every request fails with a backend error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    fn check_failure(&self) -> Result<(), ProvisionError> {
        match &self.failure {
            Some(message) => Err(ProvisionError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProblemProvisioner for StaticProvisioner {
    async fn generate(
        &self,
        _source_material: &str,
        _difficulty: Difficulty,
    ) -> Result<Vec<CodingProblem>, ProvisionError> {
        self.check_failure()?;
        Ok(self.problems.clone())
    }

    async fn generate_quiz(
        &self,
        source_material: &str,
        count: usize,
    ) -> Result<QuizSet, ProvisionError> {
        self.check_failure()?;
        let quiz = self.quiz.clone().unwrap_or_else(|| QuizSet {
            topic: source_material.to_string(),
            questions: Vec::new(),
        });
        Ok(QuizSet {
            questions: quiz.questions.into_iter().take(count).collect(),
            ..quiz
        })
    }
}
