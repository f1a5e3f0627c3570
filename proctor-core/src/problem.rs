//! Problems and quiz questions handed out by provisioners.
//!
//! Field names are camelCase on the wire so that generated problem packs can
//! be loaded as-is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProvisionError;
use crate::types::{Difficulty, Language};

/// Number of options every quiz question must offer.
pub const QUIZ_OPTION_COUNT: usize = 4;

fn generated_id() -> String {
    Uuid::now_v7().to_string()
}

/// A visible input/output pair shown to the user for self-checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A hidden input/output pair used for scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub output: String,
}

impl From<&Example> for TestCase {
    fn from(example: &Example) -> Self {
        Self {
            input: example.input.clone(),
            output: example.output.clone(),
        }
    }
}

/// A coding problem with visible examples and hidden test cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingProblem {
    #[serde(default = "generated_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub description: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    pub examples: Vec<Example>,
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub starter_code: BTreeMap<Language, String>,
}

impl CodingProblem {
    /// Starter code for a language, or an empty string when none was provided.
    #[must_use]
    pub fn starter_code(&self, language: Language) -> &str {
        self.starter_code
            .get(&language)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Check the structural invariants a session relies on.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.title.trim().is_empty() {
            return Err(ProvisionError::malformed(format!(
                "problem {} has no title",
                self.id
            )));
        }
        if self.examples.is_empty() {
            return Err(ProvisionError::malformed(format!(
                "problem '{}' has no examples",
                self.title
            )));
        }
        if self.test_cases.is_empty() {
            return Err(ProvisionError::malformed(format!(
                "problem '{}' has no hidden test cases",
                self.title
            )));
        }
        Ok(())
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    /// Whether `answer` is the correct option.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.question_text.trim().is_empty() {
            return Err(ProvisionError::malformed("question has no text"));
        }
        if self.options.len() != QUIZ_OPTION_COUNT {
            return Err(ProvisionError::malformed(format!(
                "question '{}' has {} options, expected {}",
                self.question_text,
                self.options.len(),
                QUIZ_OPTION_COUNT
            )));
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(ProvisionError::malformed(format!(
                "correct answer of '{}' is not one of its options",
                self.question_text
            )));
        }
        Ok(())
    }
}

/// A generated quiz: a topic and its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSet {
    #[serde(default)]
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
}

/// Validate a provisioned problem set. Empty output is a failure, never an
/// empty success.
pub fn validate_problems(problems: &[CodingProblem]) -> Result<(), ProvisionError> {
    if problems.is_empty() {
        return Err(ProvisionError::Empty);
    }
    problems.iter().try_for_each(CodingProblem::validate)
}

/// Validate a provisioned quiz.
pub fn validate_quiz(quiz: &QuizSet) -> Result<(), ProvisionError> {
    if quiz.questions.is_empty() {
        return Err(ProvisionError::Empty);
    }
    quiz.questions.iter().try_for_each(QuizQuestion::validate)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn sum_problem_is_valid() {
        assert!(sum_problem().validate().is_ok());
    }

    #[test]
    fn problem_without_hidden_tests_is_malformed() {
        let mut problem = sum_problem();
        problem.test_cases.clear();
        let err = problem.validate().unwrap_err();
        assert!(err.to_string().contains("no hidden test cases"));
    }

    #[test]
    fn problem_without_examples_is_malformed() {
        let mut problem = sum_problem();
        problem.examples.clear();
        assert!(matches!(
            problem.validate(),
            Err(ProvisionError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_problem_set_is_a_failure() {
        assert!(matches!(validate_problems(&[]), Err(ProvisionError::Empty)));
    }

    #[test]
    fn question_needs_four_options() {
        let mut q = question("2 + 2?", "A");
        q.options.pop();
        assert!(q.validate().is_err());
    }

    #[test]
    fn question_answer_must_be_an_option() {
        let q = question("2 + 2?", "E");
        assert!(q.validate().is_err());
        assert!(question("2 + 2?", "C").validate().is_ok());
    }

    #[test]
    fn empty_quiz_is_a_failure() {
        let quiz = QuizSet {
            topic: "arithmetic".to_string(),
            questions: vec![],
        };
        assert!(matches!(validate_quiz(&quiz), Err(ProvisionError::Empty)));
    }

    #[test]
    fn problem_parses_from_camel_case_json() {
        let json = r#"{
            "title": "Echo",
            "difficulty": "Medium",
            "description": "Print the input.",
            "examples": [{"input": "hi", "output": "hi"}],
            "testCases": [{"input": "x", "output": "x"}],
            "starterCode": {"python": "print(input())", "c++": "int main() {}"}
        }"#;
        let problem: CodingProblem = serde_json::from_str(json).unwrap();
        assert!(!problem.id.is_empty());
        assert_eq!(problem.difficulty, Difficulty::Medium);
        assert_eq!(problem.starter_code(Language::Python), "print(input())");
        assert_eq!(problem.starter_code(Language::Cpp), "int main() {}");
        assert_eq!(problem.starter_code(Language::Go), "");
    }
}
