//! Definición (sólo lectura) del pipeline al que se asocia una sesión.

use serde_json::json;

use crate::constants::DEBUG_LAYER_VERSION;
use crate::hashing::hash_value;

use super::StepId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineMeta {
    pub name: String,
    pub steps: Vec<StepId>,
}

impl PipelineMeta {
    pub fn new(name: impl Into<String>, steps: Vec<StepId>) -> Self {
        Self { name: name.into(),
               steps }
    }

    pub fn contains(&self, step: &str) -> bool {
        self.steps.iter().any(|s| s.as_str() == step)
    }

    /// Hash determinista de nombre + steps ordenados. Lo usa la configuración
    /// persistida para detectar que fue guardada contra otra definición.
    pub fn definition_hash(&self) -> String {
        let steps: Vec<&str> = self.steps.iter().map(StepId::as_str).collect();
        hash_value(&json!({
            "version": DEBUG_LAYER_VERSION,
            "name": self.name,
            "steps": steps,
        }))
    }
}
