//! Wiring of core collaborators to the configured model backend.

use std::sync::Arc;

use proctor_core::{
    HintAdvisor, JsonlProgressRecorder, Judge, ProblemProvisioner, SimulatedJudge,
};
use proctor_models::{ModelHintAdvisor, ModelProvisioner, ModelSimulator, OllamaClient};

use crate::config::{ModelsSection, ProctorConfig};

pub fn chat_model(models: &ModelsSection) -> Arc<OllamaClient> {
    Arc::new(OllamaClient::with_base_url(&models.host, &models.model))
}

/// Judge that runs prechecks locally and asks the model to trace the program.
pub fn judge(model: Arc<OllamaClient>) -> Arc<dyn Judge> {
    Arc::new(SimulatedJudge::new(ModelSimulator::new(model)))
}

pub fn hint_advisor(model: Arc<OllamaClient>) -> Arc<dyn HintAdvisor> {
    Arc::new(ModelHintAdvisor::new(model))
}

pub fn generator(model: Arc<OllamaClient>) -> Arc<dyn ProblemProvisioner> {
    Arc::new(ModelProvisioner::new(model))
}

pub fn recorder(config: &ProctorConfig) -> Arc<JsonlProgressRecorder> {
    Arc::new(JsonlProgressRecorder::new(&config.progress.path))
}
