//! Pipeline de demostración.
//!
//! Dos steps sobre el `InMemoryEngine`: `generate` (dos copias en paralelo)
//! y `filter`. Sin configuración persistida se hace preview de `generate` y
//! un breakpoint `value > 25` sobre `filter`. Se espera la pausa, se toma el
//! estado de los buffers y se detiene la corrida.

use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use log::{info, warn};
use rowflow_adapters::{ChannelHitListener, HitReport, LogHitListener};
use rowflow_core::{DebugConfig, DebugError, DebugSession, FieldCondition, FieldKind, InMemoryEngine,
                   ObservationInjector, ObservationMode, ObservationSpec, PipelineEngine, PipelineMeta, RowMeta,
                   Settings, StepId};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

pub const GENERATE_STEP: &str = "generate";
pub const FILTER_STEP: &str = "filter";
const GENERATE_COPIES: usize = 2;
const ROWS_PER_COPY: i64 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub mode: ObservationMode,
    pub capacity: i64,
    pub condition: String,
    pub hit_count: u64,
    pub fields: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub paused: bool,
    pub active_specs: usize,
    pub total_hits: u64,
    pub steps: Vec<StepReport>,
    pub hits: Vec<HitReport>,
    pub faults: Vec<String>,
}

pub fn demo_pipeline() -> Arc<PipelineMeta> {
    Arc::new(PipelineMeta::new("rowflow-demo", vec![StepId::from(GENERATE_STEP), StepId::from(FILTER_STEP)]))
}

/// Sesión por defecto cuando no hay archivo de configuración.
pub fn default_session(pipeline: Arc<PipelineMeta>, settings: &Settings) -> Result<DebugSession, DebugError> {
    let condition = FieldCondition::parse("value > 25").map_err(|e| DebugError::Config(e.to_string()))?;
    let mut session = DebugSession::new(pipeline);
    session.register(GENERATE_STEP, ObservationSpec::preview(settings.preview_rows));
    session.register(FILTER_STEP, ObservationSpec::breakpoint(3, condition));
    Ok(session)
}

fn load_session(pipeline: Arc<PipelineMeta>, settings: &Settings) -> Result<DebugSession, DebugError> {
    match &settings.debug_file {
        Some(path) => {
            info!("loading debug configuration from {}", path.display());
            DebugConfig::load(path)?.into_session(pipeline)
        }
        None => default_session(pipeline, settings),
    }
}

fn row_meta() -> Arc<RowMeta> {
    Arc::new(RowMeta::from_pairs(&[("id", FieldKind::Integer), ("copy", FieldKind::Integer), ("value", FieldKind::Integer)]))
}

fn generated_rows(copy: usize) -> Vec<Vec<Value>> {
    (1..=ROWS_PER_COPY).map(|id| vec![json!(id), json!(copy), json!(id * 2 + copy as i64)]).collect()
}

fn filtered_rows() -> Vec<Vec<Value>> {
    (1..=ROWS_PER_COPY).map(|id| vec![json!(id), json!(0), json!(id * 3)])
                       .filter(|r| r[2].as_i64().is_some_and(|v| v % 2 == 0))
                       .collect()
}

fn snapshot_steps(session: &DebugSession) -> Vec<StepReport> {
    session.entries()
           .map(|(step, spec)| {
               let fields = spec.buffer_meta()
                                .map(|m| m.fields.iter().map(|f| f.name.clone()).collect())
                                .unwrap_or_default();
               StepReport { step: step.to_string(),
                            mode: spec.mode(),
                            capacity: spec.capacity(),
                            condition: spec.condition().map(|c| c.expression()).unwrap_or_default(),
                            hit_count: spec.hit_count(),
                            fields,
                            rows: spec.buffer().into_iter().map(|r| r.values).collect() }
           })
           .collect()
}

/// Corre la demo completa y devuelve el estado observado durante la pausa.
pub fn run_demo(settings: &Settings) -> Result<DemoReport, DebugError> {
    let started_at = Utc::now();
    let engine = Arc::new(InMemoryEngine::new());
    let mut copies = engine.define_step(GENERATE_STEP, GENERATE_COPIES);
    copies.extend(engine.define_step(FILTER_STEP, 1));

    let session = Arc::new(load_session(demo_pipeline(), settings)?);
    let (listener, hits_rx): (ChannelHitListener, Receiver<HitReport>) = ChannelHitListener::new();
    session.add_listener_to_all(Arc::new(LogHitListener));
    session.add_listener_to_all(Arc::new(listener));

    let dyn_engine: Arc<dyn PipelineEngine> = engine.clone();
    let injector = ObservationInjector::new(dyn_engine);
    injector.activate(&session);

    let runners = copies.into_iter()
                        .map(|handle| {
                            let engine = Arc::clone(&engine);
                            let rows = if handle.step.as_str() == FILTER_STEP {
                                filtered_rows()
                            } else {
                                generated_rows(handle.copy)
                            };
                            thread::Builder::new().name(format!("{}-{}", handle.step, handle.copy))
                                                  .spawn(move || engine.run_copy(&handle, row_meta(), rows))
                        })
                        .collect::<Result<Vec<_>, _>>()?;

    let paused = engine.signal().wait_for_pause(settings.pause_wait);
    if !paused {
        warn!("pipeline did not pause within {:?}", settings.pause_wait);
    }

    // detenida la corrida, los buffers ya no cambian
    engine.stop();
    let mut faults = Vec::new();
    for r in runners {
        match r.join() {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => faults.push(e.to_string()),
            Err(_) => faults.push("step thread panicked".to_string()),
        }
    }
    injector.deactivate(&session);
    let steps = snapshot_steps(&session);

    Ok(DemoReport { session_id: session.id(),
                    started_at,
                    paused,
                    active_specs: session.active_spec_count(),
                    total_hits: session.total_hits(),
                    steps,
                    hits: hits_rx.try_iter().collect(),
                    faults })
}
