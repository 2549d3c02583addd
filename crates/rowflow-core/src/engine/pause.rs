//! Señal de pausa difundida a todos los hilos de step.
//!
//! Quien pide la pausa nunca bloquea: sólo marca el flag y despierta a los
//! hilos que esperan. Cada hilo de step consulta la señal en el borde entre
//! filas (`wait_while_paused`).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct PauseState {
    paused: bool,
    stopped: bool,
}

#[derive(Debug, Default)]
pub struct PauseSignal {
    state: Mutex<PauseState>,
    changed: Condvar,
    pause_requests: AtomicU64,
}

impl PauseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.pause_requests.fetch_add(1, Ordering::SeqCst);
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        st.paused = true;
        self.changed.notify_all();
    }

    pub fn resume(&self) {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        st.paused = false;
        self.changed.notify_all();
    }

    /// Detiene la ejecución: los hilos en espera salen y no emiten más filas.
    pub fn stop(&self) {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        st.stopped = true;
        self.changed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).stopped
    }

    /// Cantidad de pedidos de pausa recibidos (incluye redundantes).
    pub fn pause_requests(&self) -> u64 {
        self.pause_requests.load(Ordering::SeqCst)
    }

    /// Bloquea mientras esté en pausa. Devuelve `false` si la ejecución fue
    /// detenida y el hilo no debe continuar.
    pub fn wait_while_paused(&self) -> bool {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let st = self.changed
                     .wait_while(guard, |st| st.paused && !st.stopped)
                     .unwrap_or_else(PoisonError::into_inner);
        !st.stopped
    }

    /// Espera hasta que alguien pida la pausa o venza `timeout`.
    pub fn wait_for_pause(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        while !guard.paused {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            guard = self.changed
                        .wait_timeout(guard, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
        }
        true
    }
}
