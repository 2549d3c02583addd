//! Configuración desde variables de entorno.
//!
//! Se carga `.env` una sola vez (si existe) antes de leer las variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::constants::DEFAULT_PREVIEW_ROWS;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Capacidad de los previews creados sin capacidad explícita.
    pub preview_rows: i64,
    /// Configuración de depuración persistida a cargar (opcional).
    pub debug_file: Option<PathBuf>,
    /// Cuánto espera la demo a que el pipeline quede en pausa.
    pub pause_wait: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self { preview_rows: DEFAULT_PREVIEW_ROWS,
               debug_file: None,
               pause_wait: Duration::from_millis(5000) }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de
    /// variables. Valores vacíos o inválidos caen al default.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let preview_rows = var("ROWFLOW_PREVIEW_ROWS").and_then(|v| v.parse().ok())
                                                      .unwrap_or(defaults.preview_rows);
        let debug_file = var("ROWFLOW_DEBUG_FILE").map(PathBuf::from);
        let pause_wait = var("ROWFLOW_PAUSE_WAIT_MS").and_then(|v| v.parse().ok())
                                                      .map(Duration::from_millis)
                                                      .unwrap_or(defaults.pause_wait);
        Self { preview_rows,
               debug_file,
               pause_wait }
    }

    /// Instancia global, evaluada una sola vez.
    pub fn global() -> &'static Settings {
        &SETTINGS
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn missing_variables_use_defaults() {
        let s = from_pairs(&[]);
        assert_eq!(s, Settings::default());
        assert_eq!(s.preview_rows, DEFAULT_PREVIEW_ROWS);
        assert_eq!(s.debug_file, None);
        assert_eq!(s.pause_wait, Duration::from_millis(5000));
    }

    #[test]
    fn variables_are_parsed() {
        let s = from_pairs(&[("ROWFLOW_PREVIEW_ROWS", "25"),
                             ("ROWFLOW_DEBUG_FILE", " debug.json "),
                             ("ROWFLOW_PAUSE_WAIT_MS", "250")]);
        assert_eq!(s.preview_rows, 25);
        assert_eq!(s.debug_file, Some(PathBuf::from("debug.json")));
        assert_eq!(s.pause_wait, Duration::from_millis(250));
    }

    #[test]
    fn blank_or_invalid_values_fall_back() {
        let s = from_pairs(&[("ROWFLOW_PREVIEW_ROWS", "many"),
                             ("ROWFLOW_DEBUG_FILE", "   "),
                             ("ROWFLOW_PAUSE_WAIT_MS", "-3")]);
        assert_eq!(s, Settings::default());
        let s = from_pairs(&[("ROWFLOW_PREVIEW_ROWS", ""), ("ROWFLOW_PAUSE_WAIT_MS", "")]);
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn negative_preview_rows_are_kept() {
        // un preview con capacidad <= 0 queda inerte, no es un error de config
        assert_eq!(from_pairs(&[("ROWFLOW_PREVIEW_ROWS", "-1")]).preview_rows, -1);
    }
}
