//! Estructura (schema) de las filas que emite un step.
//!
//! Los valores de una fila son `serde_json::Value` neutrales; `RowMeta` sólo
//! describe nombres y tipo lógico de cada posición.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMeta {
    pub fields: Vec<FieldMeta>,
}

impl RowMeta {
    pub fn new(fields: Vec<FieldMeta>) -> Self {
        Self { fields }
    }

    /// Atajo para construir un schema a partir de pares `(nombre, tipo)`.
    pub fn from_pairs(pairs: &[(&str, FieldKind)]) -> Self {
        Self { fields: pairs.iter()
                            .map(|(name, kind)| FieldMeta { name: name.to_string(),
                                                            kind: *kind })
                            .collect() }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Posición del campo `name`, si existe.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Copia profunda de los valores de una fila. El engine reutiliza sus
    /// buffers tras emitir, de modo que nunca se guarda una referencia viva.
    pub fn clone_row(&self, row: &[Value]) -> Vec<Value> {
        row.to_vec()
    }
}
