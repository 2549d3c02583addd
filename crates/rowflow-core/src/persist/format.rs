use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::condition::{Condition, FieldCondition};
use crate::debug::{DebugSession, ObservationMode, ObservationSpec};
use crate::errors::DebugError;
use crate::model::PipelineMeta;

/// Una entrada por step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDebugEntry {
    #[serde(rename = "stepname")]
    pub step_name: String,
    #[serde(default)]
    pub read_first_rows: bool,
    #[serde(default)]
    pub row_count: i64,
    #[serde(default)]
    pub pause_on_breakpoint: bool,
    #[serde(default)]
    pub condition: String,
}

impl StepDebugEntry {
    pub fn mode(&self) -> ObservationMode {
        if self.read_first_rows {
            ObservationMode::Preview
        } else if self.pause_on_breakpoint {
            ObservationMode::Breakpoint
        } else {
            ObservationMode::Disabled
        }
    }

    fn from_spec(step_name: &str, spec: &ObservationSpec) -> Self {
        Self { step_name: step_name.to_string(),
               read_first_rows: spec.mode() == ObservationMode::Preview,
               row_count: spec.capacity(),
               pause_on_breakpoint: spec.mode() == ObservationMode::Breakpoint,
               condition: spec.condition().map(|c| c.expression()).unwrap_or_default() }
    }

    fn to_spec(&self) -> Result<ObservationSpec, DebugError> {
        let condition = if self.condition.trim().is_empty() {
            None
        } else {
            let parsed = FieldCondition::parse(&self.condition).map_err(|e| {
                                                                   DebugError::Config(format!("step '{}': {e}", self.step_name))
                                                               })?;
            Some(Arc::new(parsed) as Arc<dyn Condition>)
        };
        Ok(ObservationSpec::new(self.mode(), self.row_count, condition))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_hash: Option<String>,
    #[serde(rename = "step-debug-metas", default)]
    pub steps: Vec<StepDebugEntry>,
}

/// Envoltorio con el contenedor raíz `pipeline-debug-meta`.
#[derive(Serialize, Deserialize)]
struct Document {
    #[serde(rename = "pipeline-debug-meta")]
    meta: DebugConfig,
}

impl DebugConfig {
    /// Entradas de todas las specs, en orden de registro.
    pub fn from_session(session: &DebugSession) -> Self {
        Self { pipeline_hash: Some(session.pipeline().definition_hash()),
               steps: session.entries()
                             .map(|(step, spec)| StepDebugEntry::from_spec(step.as_str(), spec))
                             .collect() }
    }

    /// Crea una sesión nueva para `pipeline`. Las entradas de steps que no
    /// existen en el pipeline se descartan; un hash distinto sólo se reporta.
    pub fn into_session(&self, pipeline: Arc<PipelineMeta>) -> Result<DebugSession, DebugError> {
        if let Some(saved) = &self.pipeline_hash {
            if *saved != pipeline.definition_hash() {
                warn!("debug config was saved for another definition of pipeline '{}'", pipeline.name);
            }
        }
        let mut session = DebugSession::new(Arc::clone(&pipeline));
        for entry in &self.steps {
            if !pipeline.contains(&entry.step_name) {
                warn!("debug config names unknown step '{}', skipped", entry.step_name);
                continue;
            }
            session.register(entry.step_name.as_str(), entry.to_spec()?);
        }
        Ok(session)
    }

    pub fn to_json_string(&self) -> Result<String, DebugError> {
        Ok(serde_json::to_string_pretty(&Document { meta: self.clone() })?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DebugError> {
        let doc: Document = serde_json::from_str(text)?;
        Ok(doc.meta)
    }

    pub fn load(path: &Path) -> Result<Self, DebugError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DebugError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
