//! Configuración de depuración persistida junto a la definición del pipeline.
//!
//! Formato JSON con los nombres de contenedor y de campo históricos:
//!
//! ```json
//! { "pipeline-debug-meta": {
//!     "pipeline_hash": "...",
//!     "step-debug-metas": [
//!       { "stepname": "filter", "read_first_rows": false, "row_count": 2,
//!         "pause_on_breakpoint": true, "condition": "value > 10" } ] } }
//! ```

mod format;

pub use format::{DebugConfig, StepDebugEntry};
