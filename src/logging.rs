//! # Logging
//! src/logging.rs
//!
//! `RUST_LOG` tiene prioridad. Si no está definido, el nivel sale de la
//! verbosidad del CLI: 0 → warn, 1 → info, 2 → debug.

use tracing_subscriber::EnvFilter;

/// Filtro por defecto para un nivel de verbosidad
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "summary_server=warn",
        1 => "summary_server=info",
        _ => "summary_server=debug",
    }
}

/// Inicializa el subscriber global
///
/// Llamarlo dos veces es un no-op (el segundo intento se ignora).
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(0), "summary_server=warn");
        assert_eq!(default_filter(1), "summary_server=info");
        assert_eq!(default_filter(2), "summary_server=debug");
        assert_eq!(default_filter(9), "summary_server=debug");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(1);
        init(2);
    }
}
