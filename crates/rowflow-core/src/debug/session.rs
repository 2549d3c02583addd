//! Sesión de depuración de una corrida: step -> spec.
//!
//! El conjunto de steps se arma antes de activar la sesión (`register` pide
//! `&mut self`); una vez compartida en un `Arc` el mapa queda fijo y sólo
//! cambia el estado interno de cada spec, protegido por su propio lock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::model::{PipelineMeta, StepId};

use super::listener::BreakpointListener;
use super::spec::ObservationSpec;

#[derive(Debug)]
pub struct DebugSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    pipeline: Arc<PipelineMeta>,
    specs: IndexMap<StepId, Arc<ObservationSpec>>,
}

impl DebugSession {
    pub fn new(pipeline: Arc<PipelineMeta>) -> Self {
        Self { id: Uuid::new_v4(),
               created_at: Utc::now(),
               pipeline,
               specs: IndexMap::new() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn pipeline(&self) -> &PipelineMeta {
        &self.pipeline
    }

    /// Asocia `spec` al step, reemplazando (y devolviendo) la anterior.
    pub fn register(&mut self, step: impl Into<StepId>, spec: ObservationSpec) -> Option<Arc<ObservationSpec>> {
        self.specs.insert(step.into(), Arc::new(spec))
    }

    pub fn get(&self, step: &str) -> Option<&Arc<ObservationSpec>> {
        self.specs.get(step)
    }

    /// Specs en orden de registro.
    pub fn all_specs(&self) -> impl Iterator<Item = &Arc<ObservationSpec>> {
        self.specs.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&StepId, &Arc<ObservationSpec>)> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Cantidad de specs en uso (ver `ObservationSpec::is_active`). Sólo
    /// informativo; no condiciona la ejecución.
    pub fn active_spec_count(&self) -> usize {
        self.specs.values().filter(|s| s.is_active()).count()
    }

    /// Suma de hits de todas las specs; refleja corridas en curso.
    pub fn total_hits(&self) -> u64 {
        self.specs.values().map(|s| s.hit_count()).sum()
    }

    /// `false` si el step no tiene spec.
    pub fn register_listener(&self, step: &str, listener: Arc<dyn BreakpointListener>) -> bool {
        match self.specs.get(step) {
            Some(spec) => {
                spec.add_listener(listener);
                true
            }
            None => false,
        }
    }

    pub fn unregister_listener(&self, step: &str, listener: &Arc<dyn BreakpointListener>) -> bool {
        self.specs.get(step).is_some_and(|spec| spec.remove_listener(listener))
    }

    /// Registra el mismo listener en todas las specs.
    pub fn add_listener_to_all(&self, listener: Arc<dyn BreakpointListener>) {
        for spec in self.specs.values() {
            spec.add_listener(Arc::clone(&listener));
        }
    }
}
