//! Engine en memoria con hilos reales.
//!
//! Cada copia de step se ejecuta en el hilo que llama a `run_copy`; el engine
//! sólo guarda las copias vivas y sus suscripciones, y la señal de pausa.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use super::{PauseSignal, PipelineEngine, RowListener, StepHandle, Subscription, SubscriptionId};
use crate::errors::DebugError;
use crate::model::{RowMeta, StepId};

#[derive(Default)]
struct CopyState {
    listeners: Vec<(SubscriptionId, Arc<dyn RowListener>)>,
}

/// Resultado de ejecutar una copia de step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Se emitieron todas las filas.
    Finished { rows: usize },
    /// La ejecución fue detenida mientras la copia estaba en pausa.
    Stopped { rows: usize },
}

impl CopyOutcome {
    pub fn rows(&self) -> usize {
        match self {
            CopyOutcome::Finished { rows } | CopyOutcome::Stopped { rows } => *rows,
        }
    }
}

#[derive(Default)]
pub struct InMemoryEngine {
    copies: Mutex<IndexMap<StepHandle, CopyState>>,
    next_subscription: AtomicU64,
    signal: PauseSignal,
}

impl fmt::Debug for InMemoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let copies = self.copies.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("InMemoryEngine")
         .field("copies", &copies.keys().collect::<Vec<_>>())
         .field("signal", &self.signal)
         .finish()
    }
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra `copies` copias en ejecución de `step` y devuelve sus handles.
    pub fn define_step(&self, step: impl Into<StepId>, copies: usize) -> Vec<StepHandle> {
        let step = step.into();
        let mut map = self.copies.lock().unwrap_or_else(PoisonError::into_inner);
        (0..copies).map(|copy| {
                       let handle = StepHandle::new(step.clone(), copy);
                       map.entry(handle.clone()).or_default();
                       handle
                   })
                   .collect()
    }

    /// La copia termina: se descarta junto con sus suscripciones.
    pub fn finish(&self, handle: &StepHandle) {
        self.copies.lock().unwrap_or_else(PoisonError::into_inner).shift_remove(handle);
    }

    pub fn signal(&self) -> &PauseSignal {
        &self.signal
    }

    pub fn stop(&self) {
        self.signal.stop();
    }

    pub fn listener_count(&self, handle: &StepHandle) -> usize {
        self.copies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handle)
            .map_or(0, |c| c.listeners.len())
    }

    /// Entrega una fila a los listeners de la copia, en orden de suscripción.
    /// El lock del engine no se mantiene durante los callbacks.
    pub fn emit(&self, handle: &StepHandle, meta: &Arc<RowMeta>, row: &[Value]) -> Result<(), DebugError> {
        let listeners: Vec<Arc<dyn RowListener>> = {
            let map = self.copies.lock().unwrap_or_else(PoisonError::into_inner);
            map.get(handle)
               .map(|c| c.listeners.iter().map(|(_, l)| Arc::clone(l)).collect())
               .unwrap_or_default()
        };
        for l in listeners {
            l.row_written(meta, row)?;
        }
        Ok(())
    }

    /// Bucle de un step: antes de cada fila espera si hay pausa; si la
    /// ejecución se detiene durante la espera, sale sin emitir más. Un error
    /// de un listener aborta la copia.
    pub fn run_copy<I>(&self, handle: &StepHandle, meta: Arc<RowMeta>, rows: I) -> Result<CopyOutcome, DebugError>
        where I: IntoIterator<Item = Vec<Value>>
    {
        let mut emitted = 0;
        for row in rows {
            if !self.signal.wait_while_paused() {
                return Ok(CopyOutcome::Stopped { rows: emitted });
            }
            if let Err(e) = self.emit(handle, &meta, &row) {
                debug!("step copy {}#{} aborted: {e}", handle.step, handle.copy);
                self.finish(handle);
                return Err(e);
            }
            emitted += 1;
        }
        Ok(CopyOutcome::Finished { rows: emitted })
    }
}

impl PipelineEngine for InMemoryEngine {
    fn running_instances(&self, step: &StepId) -> Vec<StepHandle> {
        self.copies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|h| &h.step == step)
            .cloned()
            .collect()
    }

    fn subscribe_rows(&self, handle: &StepHandle, listener: Arc<dyn RowListener>) -> Option<Subscription> {
        let mut map = self.copies.lock().unwrap_or_else(PoisonError::into_inner);
        let copy = map.get_mut(handle)?;
        let id = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        copy.listeners.push((id, listener));
        Some(Subscription { handle: handle.clone(),
                            id })
    }

    fn unsubscribe_rows(&self, subscription: &Subscription) {
        let mut map = self.copies.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(copy) = map.get_mut(&subscription.handle) {
            copy.listeners.retain(|(id, _)| *id != subscription.id);
        }
    }

    fn is_subscribed(&self, subscription: &Subscription) -> bool {
        self.copies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&subscription.handle)
            .is_some_and(|c| c.listeners.iter().any(|(id, _)| *id == subscription.id))
    }

    fn pause_running(&self) {
        self.signal.pause();
    }

    fn resume_running(&self) {
        self.signal.resume();
    }

    fn is_paused(&self) -> bool {
        self.signal.is_paused()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;
    use serde_json::json;

    struct Failing;
    impl RowListener for Failing {
        fn row_written(&self, _meta: &Arc<RowMeta>, _row: &[Value]) -> Result<(), DebugError> {
            Err(DebugError::Internal("boom".into()))
        }
    }

    #[test]
    fn unknown_copies_are_not_subscribable() {
        let engine = InMemoryEngine::new();
        let handles = engine.define_step("a", 2);
        assert_eq!(engine.running_instances(&"a".into()), handles);
        assert!(engine.running_instances(&"b".into()).is_empty());
        assert!(engine.subscribe_rows(&StepHandle::new("b", 0), Arc::new(Failing)).is_none());
    }

    #[test]
    fn subscriptions_die_with_their_copy() {
        let engine = InMemoryEngine::new();
        let handle = engine.define_step("a", 1).remove(0);
        let sub = engine.subscribe_rows(&handle, Arc::new(Failing)).unwrap();
        assert!(engine.is_subscribed(&sub));

        engine.finish(&handle);
        engine.define_step("a", 1);
        assert!(!engine.is_subscribed(&sub));
        assert_eq!(engine.listener_count(&handle), 0);
    }

    #[test]
    fn listener_error_aborts_the_copy() {
        let engine = InMemoryEngine::new();
        let handle = engine.define_step("a", 1).remove(0);
        engine.subscribe_rows(&handle, Arc::new(Failing)).unwrap();
        let meta = Arc::new(RowMeta::from_pairs(&[("v", FieldKind::Integer)]));
        let res = engine.run_copy(&handle, meta, vec![vec![json!(1)]]);
        assert_eq!(res, Err(DebugError::Internal("boom".into())));
        assert!(engine.running_instances(&"a".into()).is_empty());
    }
}
