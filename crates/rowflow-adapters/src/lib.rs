//! Listeners de breakpoints listos para usar desde herramientas de operador.

pub mod listeners;

pub use listeners::{ChannelHitListener, HitReport, LogHitListener};
