//! Language-model backends for proctor.
//!
//! This crate provides:
//! - [`OllamaClient`] for chat completions against a local Ollama instance
//! - [`ModelSimulator`], a [`Simulator`](proctor_core::Simulator) that asks a
//!   model to trace a program instead of running it
//! - [`ModelProvisioner`] for generated coding problems and quizzes
//! - [`ModelHintAdvisor`] for remediation hints
//!
//! All adapters are generic over [`ChatModel`], so they can be exercised
//! without a server.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐
//! │ModelSimulator│  │ ModelProvisioner │  │ ModelHintAdvisor │
//! └──────┬───────┘  └────────┬─────────┘  └────────┬─────────┘
//!        └───────────────────┼─────────────────────┘
//!                            ▼
//!                   ChatModel (OllamaClient)
//! ```

mod advisor;
mod error;
mod ollama;
mod provisioner;
mod simulator;

pub mod prompts;
pub mod reply;

use async_trait::async_trait;

pub use advisor::ModelHintAdvisor;
pub use error::{Error, Result};
pub use ollama::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SEED, OllamaClient};
pub use provisioner::ModelProvisioner;
pub use simulator::ModelSimulator;

/// A system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// Ask the backend to constrain the reply to JSON.
    pub json: bool,
}

impl Prompt {
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            json: true,
        }
    }

    pub fn text(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            json: false,
        }
    }
}

/// Single-turn chat completion.
///
/// Implementations must sample deterministically (temperature 0, fixed seed).
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

#[async_trait]
impl<M: ChatModel + ?Sized> ChatModel for std::sync::Arc<M> {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        (**self).complete(prompt).await
    }
}
