//! Interfaz consumida del motor de ejecución de steps.
//!
//! El motor real (planificación de hilos, pausa/reanudación) es externo; esta
//! capa sólo necesita enumerar copias en ejecución de un step, suscribir un
//! callback por fila emitida y pedir una pausa global. `InMemoryEngine` es una
//! implementación de referencia con hilos reales, usada por tests y la demo.

mod memory;
mod pause;

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::DebugError;
use crate::model::{RowMeta, StepId};

pub use memory::{CopyOutcome, InMemoryEngine};
pub use pause::PauseSignal;

/// Identifica una copia en ejecución de un step (paralelismo de datos).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepHandle {
    pub step: StepId,
    pub copy: usize,
}

impl StepHandle {
    pub fn new(step: impl Into<StepId>, copy: usize) -> Self {
        Self { step: step.into(),
               copy }
    }
}

pub type SubscriptionId = u64;

/// Suscripción devuelta por el engine; se entrega de vuelta para cancelarla.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub handle: StepHandle,
    pub id: SubscriptionId,
}

/// Callback invocado de forma síncrona, en el hilo del step, por cada fila
/// emitida y antes de que la vea cualquier consumidor aguas abajo. Un `Err`
/// es un fallo del step.
pub trait RowListener: Send + Sync {
    fn row_written(&self, meta: &Arc<RowMeta>, row: &[Value]) -> Result<(), DebugError>;
}

pub trait PipelineEngine: Send + Sync + Debug {
    /// Copias actualmente en ejecución de `step` (cero o más).
    fn running_instances(&self, step: &StepId) -> Vec<StepHandle>;

    /// `None` si la copia ya no está en ejecución.
    fn subscribe_rows(&self, handle: &StepHandle, listener: Arc<dyn RowListener>) -> Option<Subscription>;

    /// No-op si la copia o la suscripción ya no existen.
    fn unsubscribe_rows(&self, subscription: &Subscription);

    /// `false` si la copia terminó o la suscripción fue cancelada.
    fn is_subscribed(&self, subscription: &Subscription) -> bool;

    /// Señal global de pausa; idempotente para quien la invoca.
    fn pause_running(&self);

    fn resume_running(&self);

    fn is_paused(&self) -> bool;
}
