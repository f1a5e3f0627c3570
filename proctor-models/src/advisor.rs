//! Model-written remediation hints.

use async_trait::async_trait;
use proctor_core::{CodingProblem, HintAdvisor, HintError, TestCase};

use crate::{ChatModel, prompts, reply};

/// [`HintAdvisor`] backed by a chat model.
pub struct ModelHintAdvisor<M> {
    model: M,
}

impl<M: ChatModel> ModelHintAdvisor<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: ChatModel> HintAdvisor for ModelHintAdvisor<M> {
    async fn explain(
        &self,
        problem: &CodingProblem,
        code: &str,
        failing_case: &TestCase,
    ) -> Result<String, HintError> {
        let text = self
            .model
            .complete(&prompts::hint(problem, code, failing_case))
            .await?;
        Ok(reply::strip_fences(&text).to_string())
    }
}
