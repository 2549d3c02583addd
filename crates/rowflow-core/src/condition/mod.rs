//! Contrato de condiciones evaluadas sobre filas emitidas.
//!
//! El lenguaje de predicados completo vive fuera de esta capa; aquí sólo se
//! consume `evaluate`. `FieldCondition` es una implementación mínima
//! (`campo op literal`) usada por la configuración persistida y los tests.

mod field;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::RowMeta;

pub use field::{CompareOp, FieldCondition};

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum ConditionError {
    #[error("cannot parse condition '{0}'")] Parse(String),
    #[error("unknown field '{0}'")] UnknownField(String),
    #[error("field '{field}' is not comparable with {literal}")]
    Incomparable { field: String, literal: String },
}

/// Predicado sobre una fila. Puede fallar; el fallo se propaga como fallo
/// del step que emitió la fila.
pub trait Condition: Send + Sync + Debug {
    fn evaluate(&self, meta: &RowMeta, row: &[Value]) -> Result<bool, ConditionError>;

    /// Una condición vacía nunca dispara un breakpoint.
    fn is_empty(&self) -> bool;

    /// Texto de la expresión, tal como se persiste.
    fn expression(&self) -> String;
}
