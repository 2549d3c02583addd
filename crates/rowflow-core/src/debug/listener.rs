use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{RowMeta, RowSnapshot, StepId};

use super::DebugSession;

/// Datos de un hit entregados a los listeners. Se construye con el lock de la
/// spec tomado: `rows` es el buffer tal como quedó tras la fila que disparó.
#[derive(Debug)]
pub struct BreakpointHit<'a> {
    pub session_id: Uuid,
    pub step: &'a StepId,
    /// Valor de `hit_count` tras este hit (1 para el primero).
    pub hit_number: u64,
    pub rows: &'a [RowSnapshot],
    pub row_meta: Option<&'a Arc<RowMeta>>,
    pub at: DateTime<Utc>,
}

/// Se invoca de forma síncrona en el hilo del step que disparó el hit. Un
/// listener lento sólo demora a ese hilo. Puede leer buffers a través de la
/// sesión; el de su propia spec coincide con `hit.rows`.
pub trait BreakpointListener: Send + Sync {
    fn break_point_hit(&self, session: &DebugSession, hit: &BreakpointHit<'_>);
}
