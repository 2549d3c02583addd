//! Pedido de pausa global y notificación de hits.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::engine::PipelineEngine;
use crate::model::StepId;

use super::listener::BreakpointHit;
use super::spec::{ObservationSpec, SpecState};
use super::DebugSession;

#[derive(Clone)]
pub struct PauseCoordinator {
    engine: Arc<dyn PipelineEngine>,
}

impl fmt::Debug for PauseCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PauseCoordinator").field("engine", &self.engine).finish()
    }
}

impl PauseCoordinator {
    pub fn new(engine: Arc<dyn PipelineEngine>) -> Self {
        Self { engine }
    }

    /// Señal de pausa al engine. No guarda estado propio: varios pedidos
    /// concurrentes o redundantes son válidos, el engine decide.
    pub fn request_pause(&self) {
        info!("debug pause requested");
        self.engine.pause_running();
    }

    /// Suma un hit a la spec y avisa a sus listeners, en orden de registro,
    /// en el hilo que llama. Se invoca con el lock de la spec tomado (`state`)
    /// de modo que hits concurrentes sobre la misma spec no se mezclan. Los
    /// listeners ven el buffer publicado y pueden leer cualquier spec.
    pub(crate) fn notify_hit(&self,
                             session: &DebugSession,
                             step: &StepId,
                             spec: &ObservationSpec,
                             state: &SpecState)
                             -> u64 {
        let hit_number = spec.record_hit();
        info!("debug hit: session={} step={step} hit={hit_number}", session.id());
        let listeners = spec.listeners_snapshot();
        if listeners.is_empty() {
            return hit_number;
        }
        let view = spec.publish(state);
        let hit = BreakpointHit { session_id: session.id(),
                                  step,
                                  hit_number,
                                  rows: &view.rows,
                                  row_meta: view.meta.as_ref(),
                                  at: Utc::now() };
        for l in listeners {
            l.break_point_hit(session, &hit);
        }
        hit_number
    }
}
