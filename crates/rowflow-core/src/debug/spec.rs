//! Configuración y estado de observación de un step.
//!
//! `mode`, `capacity` y `condition` se fijan al crear la spec (antes de la
//! corrida). El buffer y el schema capturado viven bajo un lock propio de la
//! spec: todas las copias en paralelo de un step comparten la misma spec y
//! cada invocación del protocolo de observación es atómica respecto de las
//! demás. `hit_count` es atómico para poder leerse sin tomar el lock.
//!
//! Mientras se notifican los listeners de un hit el lock sigue tomado, pero el
//! buffer queda publicado en una vista inmutable: las lecturas (`buffer`,
//! `buffer_len`, `buffer_meta`) la usan en lugar del lock, así un listener
//! puede leer su propia spec o la de otro step sin bloquear el hilo.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::model::{RowMeta, RowSnapshot};
use crate::settings::Settings;

use super::buffer::RowBuffer;
use super::listener::BreakpointListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationMode {
    /// Captura las primeras N filas y luego pausa.
    Preview,
    /// Pausa cuando la condición se cumple sobre una fila.
    Breakpoint,
    Disabled,
}

#[derive(Debug, Default)]
pub(crate) struct SpecState {
    pub buffer: RowBuffer,
    pub buffer_meta: Option<Arc<RowMeta>>,
}

/// Buffer tal como quedó al disparar un hit.
#[derive(Debug, Clone)]
pub(crate) struct HitView {
    pub rows: Arc<[RowSnapshot]>,
    pub meta: Option<Arc<RowMeta>>,
}

/// Mantiene la vista publicada; al soltarse la retira.
pub(crate) struct PublishedHit<'a> {
    spec: &'a ObservationSpec,
    view: HitView,
}

impl Deref for PublishedHit<'_> {
    type Target = HitView;

    fn deref(&self) -> &HitView {
        &self.view
    }
}

impl Drop for PublishedHit<'_> {
    fn drop(&mut self) {
        *self.spec.lock_published() = None;
    }
}

pub struct ObservationSpec {
    mode: ObservationMode,
    capacity: i64,
    condition: Option<Arc<dyn Condition>>,
    state: Mutex<SpecState>,
    hit_count: AtomicU64,
    listeners: Mutex<Vec<Arc<dyn BreakpointListener>>>,
    published: Mutex<Option<HitView>>,
}

impl fmt::Debug for ObservationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationSpec")
         .field("mode", &self.mode)
         .field("capacity", &self.capacity)
         .field("condition", &self.condition.as_ref().map(|c| c.expression()))
         .field("hit_count", &self.hit_count())
         .field("listeners", &self.listener_count())
         .finish()
    }
}

impl ObservationSpec {
    pub fn new(mode: ObservationMode, capacity: i64, condition: Option<Arc<dyn Condition>>) -> Self {
        Self { mode,
               capacity,
               condition,
               state: Mutex::new(SpecState::default()),
               hit_count: AtomicU64::new(0),
               listeners: Mutex::new(Vec::new()),
               published: Mutex::new(None) }
    }

    pub fn preview(capacity: i64) -> Self {
        Self::new(ObservationMode::Preview, capacity, None)
    }

    /// Preview con la capacidad configurada en el entorno.
    pub fn preview_default() -> Self {
        Self::preview(Settings::global().preview_rows)
    }

    pub fn breakpoint(capacity: i64, condition: impl Condition + 'static) -> Self {
        Self::new(ObservationMode::Breakpoint, capacity, Some(Arc::new(condition)))
    }

    pub fn disabled() -> Self {
        Self::new(ObservationMode::Disabled, 0, None)
    }

    pub fn mode(&self) -> ObservationMode {
        self.mode
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn condition(&self) -> Option<&Arc<dyn Condition>> {
        self.condition.as_ref()
    }

    /// Condición presente y no vacía.
    pub fn has_condition(&self) -> bool {
        self.condition.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// La spec está "en uso": preview con capacidad positiva, o breakpoint
    /// con condición no vacía (independiente de la capacidad).
    pub fn is_active(&self) -> bool {
        match self.mode {
            ObservationMode::Preview => self.capacity > 0,
            ObservationMode::Breakpoint => self.has_condition(),
            ObservationMode::Disabled => false,
        }
    }

    pub fn hit_count(&self) -> u64 {
        self.hit_count.load(Ordering::SeqCst)
    }

    /// Copia del buffer actual. Para breakpoints el orden es de la más
    /// reciente a la más vieja; para previews, cronológico.
    pub fn buffer(&self) -> Vec<RowSnapshot> {
        match self.published_view() {
            Some(view) => view.rows.to_vec(),
            None => self.lock_state().buffer.to_vec(),
        }
    }

    pub fn buffer_len(&self) -> usize {
        match self.published_view() {
            Some(view) => view.rows.len(),
            None => self.lock_state().buffer.len(),
        }
    }

    /// Schema de la última fila capturada.
    pub fn buffer_meta(&self) -> Option<Arc<RowMeta>> {
        match self.published_view() {
            Some(view) => view.meta,
            None => self.lock_state().buffer_meta.clone(),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn BreakpointListener>) {
        self.lock_listeners().push(listener);
    }

    /// Quita el listener por identidad del `Arc`.
    pub fn remove_listener(&self, listener: &Arc<dyn BreakpointListener>) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    pub(crate) fn listeners_snapshot(&self) -> Vec<Arc<dyn BreakpointListener>> {
        self.lock_listeners().clone()
    }

    /// Incrementa el contador de hits y devuelve el nuevo valor.
    pub(crate) fn record_hit(&self) -> u64 {
        self.hit_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, SpecState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publica el buffer para la notificación de un hit. Se llama con el
    /// lock de estado tomado; la vista vive lo que viva el guard.
    pub(crate) fn publish(&self, state: &SpecState) -> PublishedHit<'_> {
        let view = HitView { rows: state.buffer.iter().cloned().collect(),
                             meta: state.buffer_meta.clone() };
        *self.lock_published() = Some(view.clone());
        PublishedHit { spec: self,
                       view }
    }

    fn published_view(&self) -> Option<HitView> {
        self.lock_published().clone()
    }

    fn lock_published(&self) -> MutexGuard<'_, Option<HitView>> {
        self.published.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<Arc<dyn BreakpointListener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::FieldCondition;

    #[test]
    fn activity_depends_on_mode_capacity_and_condition() {
        assert!(ObservationSpec::preview(3).is_active());
        assert!(!ObservationSpec::preview(0).is_active());
        assert!(ObservationSpec::breakpoint(0, FieldCondition::parse("v > 1").unwrap()).is_active());
        assert!(ObservationSpec::breakpoint(-1, FieldCondition::parse("v > 1").unwrap()).is_active());
        assert!(!ObservationSpec::breakpoint(5, FieldCondition::empty()).is_active());
        assert!(!ObservationSpec::new(ObservationMode::Breakpoint, 5, None).is_active());
        assert!(!ObservationSpec::disabled().is_active());
    }

    #[test]
    fn preview_default_takes_capacity_from_settings() {
        let spec = ObservationSpec::preview_default();
        assert_eq!(spec.mode(), ObservationMode::Preview);
        assert_eq!(spec.capacity(), Settings::global().preview_rows);
        assert!(spec.condition().is_none());
    }
}
