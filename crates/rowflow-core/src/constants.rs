//! Constantes de la capa de depuración.
//!
//! Los nombres de contenedor del formato persistido se mantienen estables para
//! poder leer configuraciones guardadas por versiones previas.

/// Versión lógica de la capa de depuración. Se incluye en el hash de la
/// definición del pipeline para invalidar configuraciones de otra versión.
pub const DEBUG_LAYER_VERSION: &str = "D1.0";

/// Contenedor raíz de la configuración persistida.
pub const PIPELINE_DEBUG_META_TAG: &str = "pipeline-debug-meta";

/// Lista ordenada de entradas por step dentro del contenedor raíz.
pub const STEP_DEBUG_METAS_TAG: &str = "step-debug-metas";

/// Capacidad por defecto de un preview cuando no hay configuración explícita.
pub const DEFAULT_PREVIEW_ROWS: i64 = 1000;
