//! Errores de la capa de depuración.

use thiserror::Error;

use crate::condition::ConditionError;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DebugError {
    /// La evaluación de una condición falló sobre una fila emitida. Se
    /// devuelve al engine como fallo del step (no se suprime).
    #[error("step '{step}' fault: {source}")]
    StepFault {
        step: String,
        #[source]
        source: ConditionError,
    },
    #[error("invalid debug configuration: {0}")] Config(String),
    #[error("serialization: {0}")] Serialization(String),
    #[error("io: {0}")] Io(String),
    #[error("internal: {0}")] Internal(String),
}

impl From<serde_json::Error> for DebugError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DebugError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
