use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::RowMeta;

/// Copia inmutable de una fila emitida, junto al schema vigente al capturarla.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSnapshot {
    pub meta: Arc<RowMeta>,
    pub values: Vec<Value>,
}

impl RowSnapshot {
    /// Captura `row` sin compartir memoria con el buffer del engine.
    pub fn capture(meta: &Arc<RowMeta>, row: &[Value]) -> Self {
        Self { meta: Arc::clone(meta),
               values: meta.clone_row(row) }
    }

    /// Valor del campo `name` en la fila capturada.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.meta.index_of(name).and_then(|i| self.values.get(i))
    }
}
