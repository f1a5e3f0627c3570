//! Problem and quiz provisioning
//!
//! A [`ProblemProvisioner`] turns source material into items for a session.
//! Sessions validate whatever comes back (see
//! [`validate_problems`](crate::problem::validate_problems)), so
//! implementations only fetch and parse.

mod file;
mod fixed;

pub use file::{FileProvisioner, ProblemPack};
pub use fixed::StaticProvisioner;

use async_trait::async_trait;

use crate::error::ProvisionError;
use crate::problem::{CodingProblem, QuizSet};
use crate::types::Difficulty;

/// Source of coding problems and quiz questions.
#[async_trait]
pub trait ProblemProvisioner: Send + Sync {
    /// Coding problems about `source_material` at the given tier.
    async fn generate(
        &self,
        source_material: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<CodingProblem>, ProvisionError>;

    /// `count` multiple-choice questions about `source_material`.
    async fn generate_quiz(
        &self,
        source_material: &str,
        count: usize,
    ) -> Result<QuizSet, ProvisionError>;
}
