//! rowflow
//!
//! Fachada del workspace:
//! - Re-exporta `rowflow_core` (sesión de depuración, injector, engine en
//!   memoria, configuración persistida).
//! - Expone los listeners de `rowflow_adapters` en `adapters`.
//! - `demo` arma y corre un pipeline de ejemplo con previews y breakpoints.

pub mod demo;

pub use rowflow_adapters as adapters;
pub use rowflow_core::*;
