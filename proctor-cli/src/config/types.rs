use directories::ProjectDirs;
use proctor_core::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawProctorConfig {
    #[serde(default)]
    pub session: RawSessionSection,

    #[serde(default)]
    pub models: RawModelsSection,

    #[serde(default)]
    pub progress: RawProgressSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSessionSection {
    pub quiz_minutes: Option<u64>,
    pub coding_minutes: Option<u64>,
    pub hints: Option<bool>,
    pub question_count: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawModelsSection {
    pub host: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawProgressSection {
    pub path: Option<PathBuf>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProctorConfig {
    #[serde(default)]
    pub session: SessionSection,

    #[serde(default)]
    pub models: ModelsSection,

    #[serde(default)]
    pub progress: ProgressSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSection {
    /// Quiz countdown in minutes
    pub quiz_minutes: u64,

    /// Coding countdown in minutes
    pub coding_minutes: u64,

    /// Ask the model for a hint after a failed submit
    pub hints: bool,

    /// Questions per quiz when `--count` is not given
    pub question_count: usize,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            quiz_minutes: DEFAULT_QUIZ_MINUTES,
            coding_minutes: DEFAULT_CODING_MINUTES,
            hints: true,
            question_count: DEFAULT_QUESTION_COUNT,
        }
    }
}

impl SessionSection {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            quiz_duration_secs: self.quiz_minutes.saturating_mul(60),
            coding_duration_secs: self.coding_minutes.saturating_mul(60),
            hints_enabled: self.hints,
            quiz_question_count: self.question_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsSection {
    /// Ollama base URL
    pub host: String,

    /// Model used for judging, generation and hints
    pub model: String,
}

impl Default for ModelsSection {
    fn default() -> Self {
        Self {
            host: proctor_models::DEFAULT_BASE_URL.to_string(),
            model: proctor_models::DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSection {
    /// JSONL file session summaries are appended to
    pub path: PathBuf,
}

impl Default for ProgressSection {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

pub const DEFAULT_QUIZ_MINUTES: u64 = 10;
pub const DEFAULT_CODING_MINUTES: u64 = 45;
pub const DEFAULT_QUESTION_COUNT: usize = 5;

/// `<data_dir>/proctor/history.jsonl`, or `.proctor/history.jsonl` without a home directory.
pub fn default_history_path() -> PathBuf {
    ProjectDirs::from("", "", "proctor")
        .map(|dirs| dirs.data_dir().join("history.jsonl"))
        .unwrap_or_else(|| PathBuf::from(".proctor/history.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ProctorConfig::default();
        assert_eq!(config.session.quiz_minutes, 10);
        assert_eq!(config.session.coding_minutes, 45);
        assert!(config.session.hints);
        assert_eq!(config.models.host, "http://localhost:11434");
        assert!(config.progress.path.ends_with("history.jsonl"));
    }

    #[test]
    fn test_session_section_converts_minutes_to_seconds() {
        let section = SessionSection {
            quiz_minutes: 2,
            coding_minutes: 30,
            hints: false,
            question_count: 8,
        };

        let config = section.to_session_config();

        assert_eq!(config.quiz_duration_secs, 120);
        assert_eq!(config.coding_duration_secs, 1800);
        assert!(!config.hints_enabled);
        assert_eq!(config.quiz_question_count, 8);
    }

    #[test]
    fn test_huge_minutes_saturate() {
        let section = SessionSection {
            quiz_minutes: u64::MAX,
            coding_minutes: u64::MAX / 60 + 1,
            hints: true,
            question_count: 5,
        };

        let config = section.to_session_config();

        assert_eq!(config.quiz_duration_secs, u64::MAX);
        assert_eq!(config.coding_duration_secs, u64::MAX);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ProctorConfig {
            models: ModelsSection {
                host: "http://gpu-box:11434".to_string(),
                model: "qwen2.5-coder".to_string(),
            },
            progress: ProgressSection {
                path: PathBuf::from("/tmp/history.jsonl"),
            },
            ..Default::default()
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ProctorConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.models, config.models);
        assert_eq!(parsed.progress, config.progress);
        assert_eq!(parsed.session, SessionSection::default());
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[session]
quiz_minutes = 3
"#;
        let raw: RawProctorConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.session.quiz_minutes, Some(3));
        assert!(raw.session.hints.is_none());
        assert!(raw.models.model.is_none());
        assert!(raw.progress.path.is_none());
    }
}
