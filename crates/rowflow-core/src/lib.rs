//! rowflow-core: capa de preview/breakpoints para un motor de steps que
//! emiten filas en hilos concurrentes.
//!
//! Un `DebugSession` asocia a cada step una `ObservationSpec`. Al activarse,
//! el `ObservationInjector` suscribe un observador a cada copia en ejecución
//! del step; por cada fila emitida el observador actualiza el buffer de la
//! spec y, cuando corresponde, pide una pausa global al engine y notifica a
//! los listeners.
pub mod condition;
pub mod constants;
pub mod debug;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod model;
pub mod persist;
pub mod settings;

pub use condition::{Condition, ConditionError, FieldCondition};
pub use debug::{BreakpointHit, BreakpointListener, DebugSession, Observation, ObservationInjector, ObservationMode,
                ObservationSpec, PauseCoordinator, RowBuffer};
pub use engine::{InMemoryEngine, PauseSignal, PipelineEngine, RowListener, StepHandle, Subscription};
pub use errors::DebugError;
pub use model::{FieldKind, FieldMeta, PipelineMeta, RowMeta, RowSnapshot, StepId};
pub use persist::{DebugConfig, StepDebugEntry};
pub use settings::Settings;
