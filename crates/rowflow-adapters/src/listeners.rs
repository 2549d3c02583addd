use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};
use rowflow_core::{BreakpointHit, BreakpointListener, DebugSession};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Copia propia de un hit, apta para enviar a otro hilo o serializar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitReport {
    pub session_id: Uuid,
    pub step: String,
    pub hit_number: u64,
    pub fields: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub at: DateTime<Utc>,
}

impl HitReport {
    pub fn from_hit(hit: &BreakpointHit<'_>) -> Self {
        let fields = hit.row_meta
                        .map(|m| m.fields.iter().map(|f| f.name.clone()).collect())
                        .unwrap_or_default();
        Self { session_id: hit.session_id,
               step: hit.step.to_string(),
               hit_number: hit.hit_number,
               fields,
               rows: hit.rows.iter().map(|r| r.values.clone()).collect(),
               at: hit.at }
    }
}

/// Deja cada hit en el log.
#[derive(Debug, Default)]
pub struct LogHitListener;

impl BreakpointListener for LogHitListener {
    fn break_point_hit(&self, session: &DebugSession, hit: &BreakpointHit<'_>) {
        info!("[{}] pipeline '{}' paused at step '{}' (hit #{}, {} buffered rows, total hits {})",
              hit.session_id,
              session.pipeline().name,
              hit.step,
              hit.hit_number,
              hit.rows.len(),
              session.total_hits());
    }
}

/// Reenvía cada hit como `HitReport` por un canal.
#[derive(Debug, Clone)]
pub struct ChannelHitListener {
    tx: Sender<HitReport>,
}

impl ChannelHitListener {
    pub fn new() -> (Self, Receiver<HitReport>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    pub fn with_sender(tx: Sender<HitReport>) -> Self {
        Self { tx }
    }
}

impl BreakpointListener for ChannelHitListener {
    fn break_point_hit(&self, _session: &DebugSession, hit: &BreakpointHit<'_>) {
        if self.tx.send(HitReport::from_hit(hit)).is_err() {
            debug!("hit report for step '{}' dropped: receiver gone", hit.step);
        }
    }
}
