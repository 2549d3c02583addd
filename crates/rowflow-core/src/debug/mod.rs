//! Capa de depuración/preview sobre steps en ejecución.
//!
//! - `ObservationSpec`: modo, capacidad, condición, buffer, hits, listeners.
//! - `DebugSession`: step -> spec para una corrida, consultas agregadas.
//! - `ObservationInjector`: suscribe observadores a las copias en ejecución.
//! - `PauseCoordinator`: pausa global + notificación de hits.

mod buffer;
mod coordinator;
mod injector;
mod listener;
mod session;
mod spec;

pub use buffer::RowBuffer;
pub use coordinator::PauseCoordinator;
pub use injector::{Observation, ObservationInjector, StepObserver};
pub use listener::{BreakpointHit, BreakpointListener};
pub use session::DebugSession;
pub use spec::{ObservationMode, ObservationSpec};
