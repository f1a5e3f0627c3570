//! Model-traced program execution.

use async_trait::async_trait;
use proctor_core::{JudgeError, Language, Simulation, Simulator};
use tracing::debug;

use crate::{ChatModel, prompts, reply};

/// [`Simulator`] that asks a chat model to trace the program.
///
/// Wrap it in a [`SimulatedJudge`](proctor_core::SimulatedJudge): the judge
/// runs static prechecks first and owns the classification.
pub struct ModelSimulator<M> {
    model: M,
}

impl<M: ChatModel> ModelSimulator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: ChatModel> Simulator for ModelSimulator<M> {
    async fn simulate(
        &self,
        language: Language,
        source: &str,
        stdin: &str,
    ) -> Result<Simulation, JudgeError> {
        let text = self
            .model
            .complete(&prompts::simulate(language, source, stdin))
            .await?;
        let simulation: Simulation = reply::parse_json(&text)?;
        debug!(
            %language,
            compile_error = simulation.compile_error.is_some(),
            runtime_error = simulation.runtime_error.is_some(),
            timed_out = simulation.timed_out,
            "Model traced program"
        );
        Ok(simulation)
    }
}

#[cfg(test)]
mod tests {
    use proctor_core::{Judge, JudgeRequest, SimulatedJudge, Verdict};

    use super::*;
    use crate::Error;
    use crate::testing::ScriptedModel;

    #[tokio::test]
    async fn reply_becomes_simulation() {
        let model = ScriptedModel::replying(
            "```json\n{\"stdout\": \"5\\n\", \"timedOut\": false, \"elapsedMs\": 3}\n```",
        );
        let simulator = ModelSimulator::new(model);

        let simulation = simulator
            .simulate(Language::Python, "print(2 + 3)", "")
            .await
            .unwrap();

        assert_eq!(simulation.stdout, "5\n");
        assert_eq!(simulation.elapsed_ms, Some(3));
        assert!(simulation.compile_error.is_none());
    }

    #[tokio::test]
    async fn unparseable_reply_is_invalid_reply() {
        let simulator = ModelSimulator::new(ScriptedModel::replying("it prints five"));
        let err = simulator
            .simulate(Language::Python, "print(5)", "")
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::InvalidReply(_)));
    }

    #[tokio::test]
    async fn judge_over_failing_model_yields_runtime_error() {
        let model = ScriptedModel::failing(Error::Request("connection refused".to_string()));
        let judge = SimulatedJudge::new(ModelSimulator::new(model));

        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, "print(5)", "", "5"))
            .await;

        assert_eq!(outcome.verdict, Verdict::RuntimeError);
        assert!(
            outcome
                .stderr
                .unwrap()
                .starts_with("judge backend failure:")
        );
    }

    #[tokio::test]
    async fn judge_classifies_model_runtime_error() {
        let model = ScriptedModel::replying(
            r#"{"runtimeError": "IndexError: list index out of range", "stdout": ""}"#,
        );
        let judge = SimulatedJudge::new(ModelSimulator::new(model));

        let outcome = judge
            .evaluate(JudgeRequest::new(Language::Python, "print([][0])", "", "0"))
            .await;

        assert_eq!(outcome.verdict, Verdict::RuntimeError);
    }
}
