//! Model-generated problems and quizzes.

use async_trait::async_trait;
use proctor_core::{
    CodingProblem, Difficulty, ProblemProvisioner, ProvisionError, QuizQuestion, QuizSet,
};
use serde::Deserialize;
use tracing::info;

use crate::{ChatModel, prompts, reply};

#[derive(Deserialize)]
#[serde(untagged)]
enum ProblemsReply {
    Wrapped { problems: Vec<CodingProblem> },
    Bare(Vec<CodingProblem>),
}

#[derive(Deserialize)]
struct QuizReply {
    #[serde(default)]
    topic: Option<String>,
    questions: Vec<QuizQuestion>,
}

/// [`ProblemProvisioner`] backed by a chat model.
///
/// Output is parsed but not validated; the session validates every
/// provisioner's output the same way.
pub struct ModelProvisioner<M> {
    model: M,
}

impl<M: ChatModel> ModelProvisioner<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: ChatModel> ProblemProvisioner for ModelProvisioner<M> {
    async fn generate(
        &self,
        source_material: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<CodingProblem>, ProvisionError> {
        let text = self
            .model
            .complete(&prompts::problems(source_material, difficulty))
            .await?;
        let problems = match reply::parse_json(&text)? {
            ProblemsReply::Wrapped { problems } | ProblemsReply::Bare(problems) => problems,
        };
        info!(count = problems.len(), difficulty = difficulty.as_str(), "Generated problems");
        Ok(problems)
    }

    async fn generate_quiz(
        &self,
        source_material: &str,
        count: usize,
    ) -> Result<QuizSet, ProvisionError> {
        let text = self
            .model
            .complete(&prompts::quiz(source_material, count))
            .await?;
        let quiz: QuizReply = reply::parse_json(&text)?;
        info!(count = quiz.questions.len(), "Generated quiz");
        Ok(QuizSet {
            topic: quiz
                .topic
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| source_material.to_string()),
            questions: quiz.questions.into_iter().take(count).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::testing::ScriptedModel;

    const PROBLEM: &str = r#"{
        "id": "rev",
        "title": "Reverse",
        "difficulty": "Easy",
        "description": "Reverse the input.",
        "examples": [{"input": "ab", "output": "ba"}],
        "testCases": [{"input": "abc", "output": "cba"}],
        "starterCode": {"python": "s = input()\n"}
    }"#;

    #[tokio::test]
    async fn wrapped_problem_list_parses() {
        let model = ScriptedModel::replying(&format!(r#"{{"problems": [{PROBLEM}]}}"#));
        let provisioner = ModelProvisioner::new(model);

        let problems = provisioner.generate("strings", Difficulty::Easy).await.unwrap();

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].id, "rev");
        assert_eq!(problems[0].test_cases[0].output, "cba");
    }

    #[tokio::test]
    async fn bare_problem_array_parses() {
        let model = ScriptedModel::replying(&format!("[{PROBLEM}]"));
        let provisioner = ModelProvisioner::new(model);

        let problems = provisioner.generate("strings", Difficulty::Easy).await.unwrap();
        assert_eq!(problems[0].title, "Reverse");
    }

    #[tokio::test]
    async fn quiz_topic_falls_back_to_source_material() {
        let model = ScriptedModel::replying(
            r#"{"questions": [{"questionText": "2+2?", "options": ["1","2","3","4"], "correctAnswer": "4"}]}"#,
        );
        let provisioner = ModelProvisioner::new(model);

        let quiz = provisioner.generate_quiz("arithmetic", 5).await.unwrap();

        assert_eq!(quiz.topic, "arithmetic");
        assert_eq!(quiz.questions.len(), 1);
        assert!(quiz.questions[0].is_correct("4"));
    }

    #[tokio::test]
    async fn quiz_is_truncated_to_count() {
        let question = r#"{"questionText": "q", "options": ["a","b","c","d"], "correctAnswer": "a"}"#;
        let model = ScriptedModel::replying(&format!(
            r#"{{"topic": "letters", "questions": [{question}, {question}, {question}]}}"#
        ));
        let provisioner = ModelProvisioner::new(model);

        let quiz = provisioner.generate_quiz("letters", 2).await.unwrap();
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(quiz.topic, "letters");
    }

    #[tokio::test]
    async fn unreachable_model_is_a_backend_error() {
        let model = ScriptedModel::failing(Error::Request("connection refused".to_string()));
        let provisioner = ModelProvisioner::new(model);

        let err = provisioner.generate_quiz("x", 3).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Backend(_)));
    }

    #[tokio::test]
    async fn prose_reply_is_a_parse_error() {
        let provisioner = ModelProvisioner::new(ScriptedModel::replying("Sorry, I can't."));
        let err = provisioner.generate("x", Difficulty::Hard).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Parse(_)));
    }
}
