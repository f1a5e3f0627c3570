use super::types::{
    DEFAULT_CODING_MINUTES, DEFAULT_QUESTION_COUNT, DEFAULT_QUIZ_MINUTES, ModelsSection,
    ProctorConfig, ProgressSection, RawModelsSection, RawProctorConfig, RawProgressSection,
    RawSessionSection, SessionSection, default_history_path,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<ProctorConfig> {
        Self::load_layers(
            Self::user_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Merge the given layers over the defaults; missing files are skipped.
    pub fn load_layers(user: Option<&Path>, project: &Path) -> Result<ProctorConfig> {
        let mut raw = RawProctorConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(user_path)?);
        }

        // Layer 2: Project config
        if project.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(project)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "proctor").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with PROCTOR_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("PROCTOR_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".proctor/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawProctorConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawProctorConfig, overlay: RawProctorConfig) -> RawProctorConfig {
        RawProctorConfig {
            session: RawSessionSection {
                quiz_minutes: overlay.session.quiz_minutes.or(base.session.quiz_minutes),
                coding_minutes: overlay.session.coding_minutes.or(base.session.coding_minutes),
                hints: overlay.session.hints.or(base.session.hints),
                question_count: overlay.session.question_count.or(base.session.question_count),
            },
            models: RawModelsSection {
                host: overlay.models.host.or(base.models.host),
                model: overlay.models.model.or(base.models.model),
            },
            progress: RawProgressSection {
                path: overlay.progress.path.or(base.progress.path),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawProctorConfig) -> ProctorConfig {
        let models = ModelsSection::default();
        ProctorConfig {
            session: SessionSection {
                quiz_minutes: raw.session.quiz_minutes.unwrap_or(DEFAULT_QUIZ_MINUTES),
                coding_minutes: raw.session.coding_minutes.unwrap_or(DEFAULT_CODING_MINUTES),
                hints: raw.session.hints.unwrap_or(true),
                question_count: raw.session.question_count.unwrap_or(DEFAULT_QUESTION_COUNT),
            },
            models: ModelsSection {
                host: raw.models.host.unwrap_or(models.host),
                model: raw.models.model.unwrap_or(models.model),
            },
            progress: ProgressSection {
                path: raw.progress.path.unwrap_or_else(default_history_path),
            },
        }
    }
}
