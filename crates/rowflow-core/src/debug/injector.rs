//! Inyección de observadores en las copias en ejecución de cada step.
//!
//! `activate` suscribe un `StepObserver` por copia en ejecución de cada step
//! con spec. Las suscripciones se llevan por par (sesión, copia), por lo que
//! activar dos veces no duplica callbacks. `deactivate` las cancela todas.

use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info};
use serde_json::Value;
use uuid::Uuid;

use crate::engine::{PipelineEngine, RowListener, StepHandle, Subscription};
use crate::errors::DebugError;
use crate::model::{RowMeta, RowSnapshot, StepId};

use super::coordinator::PauseCoordinator;
use super::spec::{ObservationMode, ObservationSpec};
use super::DebugSession;

/// Qué hizo el protocolo con una fila.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Spec deshabilitada o inerte: nada cambió.
    Ignored,
    /// La fila quedó en el buffer (o se evaluó sin disparar).
    Captured,
    /// Se pidió pausa y se notificó; lleva el número de hit.
    Hit(u64),
}

/// Callback suscripto a una copia de step.
pub struct StepObserver {
    session: Arc<DebugSession>,
    step: StepId,
    spec: Arc<ObservationSpec>,
    coordinator: PauseCoordinator,
}

impl fmt::Debug for StepObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepObserver")
         .field("session", &self.session.id())
         .field("step", &self.step)
         .field("spec", &self.spec)
         .finish()
    }
}

impl StepObserver {
    pub fn new(session: Arc<DebugSession>, step: StepId, spec: Arc<ObservationSpec>, coordinator: PauseCoordinator) -> Self {
        Self { session,
               step,
               spec,
               coordinator }
    }

    /// Protocolo de observación de una fila. Todo ocurre con el lock de la
    /// spec tomado: actualización del buffer, evaluación de la condición,
    /// pedido de pausa, hit y listeners.
    pub fn observe(&self, meta: &Arc<RowMeta>, row: &[Value]) -> Result<Observation, DebugError> {
        let spec = self.spec.as_ref();
        let capacity = spec.capacity();
        match spec.mode() {
            ObservationMode::Disabled => Ok(Observation::Ignored),
            ObservationMode::Preview => {
                if capacity <= 0 {
                    return Ok(Observation::Ignored);
                }
                let mut state = spec.lock_state();
                if state.buffer.push_chronological(RowSnapshot::capture(meta, row), capacity) {
                    state.buffer_meta = Some(Arc::clone(meta));
                    return Ok(Observation::Captured);
                }
                // lleno: el buffer queda como está
                self.coordinator.request_pause();
                let n = self.coordinator.notify_hit(&self.session, &self.step, spec, &state);
                Ok(Observation::Hit(n))
            }
            ObservationMode::Breakpoint => {
                let Some(condition) = spec.condition().filter(|c| !c.is_empty()) else {
                    return Ok(Observation::Ignored);
                };
                let mut state = spec.lock_state();
                state.buffer_meta = Some(Arc::clone(meta));
                state.buffer.push_most_recent(RowSnapshot::capture(meta, row), capacity);

                let holds = condition.evaluate(meta, row)
                                     .map_err(|source| DebugError::StepFault { step: self.step.to_string(),
                                                                               source })?;
                if !holds {
                    return Ok(Observation::Captured);
                }
                self.coordinator.request_pause();
                let n = self.coordinator.notify_hit(&self.session, &self.step, spec, &state);
                Ok(Observation::Hit(n))
            }
        }
    }
}

impl RowListener for StepObserver {
    fn row_written(&self, meta: &Arc<RowMeta>, row: &[Value]) -> Result<(), DebugError> {
        self.observe(meta, row).map(|_| ())
    }
}

pub struct ObservationInjector {
    engine: Arc<dyn PipelineEngine>,
    coordinator: PauseCoordinator,
    subscriptions: DashMap<(Uuid, StepHandle), Subscription>,
}

impl fmt::Debug for ObservationInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationInjector")
         .field("engine", &self.engine)
         .field("subscriptions", &self.subscriptions.len())
         .finish()
    }
}

impl ObservationInjector {
    pub fn new(engine: Arc<dyn PipelineEngine>) -> Self {
        Self { coordinator: PauseCoordinator::new(Arc::clone(&engine)),
               engine,
               subscriptions: DashMap::new() }
    }

    pub fn coordinator(&self) -> &PauseCoordinator {
        &self.coordinator
    }

    /// Suscribe un observador por copia en ejecución de cada step con spec.
    /// Steps sin copias en ejecución se ignoran. Devuelve cuántas
    /// suscripciones nuevas se crearon (0 si ya estaba activa).
    pub fn activate(&self, session: &Arc<DebugSession>) -> usize {
        let released = self.prune_finished(session);
        if released > 0 {
            debug!("debug session {}: {released} subscriptions of finished copies dropped", session.id());
        }
        let mut added = 0;
        for (step, spec) in session.entries() {
            let handles = self.engine.running_instances(step);
            if handles.is_empty() {
                debug!("step '{step}' not running, nothing to observe");
                continue;
            }
            for handle in handles {
                // la entrada queda tomada durante la suscripción: dos
                // activaciones concurrentes no duplican el callback
                let Entry::Vacant(slot) = self.subscriptions.entry((session.id(), handle)) else {
                    continue;
                };
                let observer = StepObserver::new(Arc::clone(session),
                                                 step.clone(),
                                                 Arc::clone(spec),
                                                 self.coordinator.clone());
                if let Some(sub) = self.engine.subscribe_rows(&slot.key().1, Arc::new(observer)) {
                    debug!("subscribed step '{step}' copy {} (id={})", sub.handle.copy, sub.id);
                    slot.insert(sub);
                    added += 1;
                }
            }
        }
        info!("debug session {} activated: {added} new subscriptions", session.id());
        added
    }

    /// Cancela todas las suscripciones de la sesión. Seguro aunque la
    /// corrida ya haya terminado.
    pub fn deactivate(&self, session: &DebugSession) -> usize {
        let keys: Vec<(Uuid, StepHandle)> = self.subscriptions
                                                .iter()
                                                .filter(|e| e.key().0 == session.id())
                                                .map(|e| e.key().clone())
                                                .collect();
        let mut removed = 0;
        for key in keys {
            if let Some((_, sub)) = self.subscriptions.remove(&key) {
                self.engine.unsubscribe_rows(&sub);
                removed += 1;
            }
        }
        info!("debug session {} deactivated: {removed} subscriptions released", session.id());
        removed
    }

    /// Descarta las entradas cuya copia ya terminó (el engine soltó la
    /// suscripción). Una copia redefinida con el mismo handle vuelve a
    /// quedar libre para suscribirse.
    fn prune_finished(&self, session: &DebugSession) -> usize {
        let mut dropped = 0;
        self.subscriptions.retain(|(id, _), sub| {
                              let keep = *id != session.id() || self.engine.is_subscribed(sub);
                              if !keep {
                                  dropped += 1;
                              }
                              keep
                          });
        dropped
    }

    pub fn subscription_count(&self, session: &DebugSession) -> usize {
        self.subscriptions.iter().filter(|e| e.key().0 == session.id()).count()
    }

    pub fn is_active(&self, session: &DebugSession) -> bool {
        self.subscription_count(session) > 0
    }
}
