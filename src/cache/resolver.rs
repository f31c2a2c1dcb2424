//! # Resolución de Caché
//! src/cache/resolver.rs
//!
//! Decide qué hacer con un job:
//!
//! ```text
//! summaries/<key>.txt existe → Artifact(html renderizado)
//! errors/<key>.txt existe    → Error(mensaje tal cual)
//! ninguno                    → Pending (el llamador encola el job)
//! ```
//!
//! El chequeo no es atómico respecto al worker: dos llamadas pueden ver
//! `Pending` para la misma key y encolar dos veces.

use crate::cache::store::{CacheError, CacheStore};
use crate::jobs::Job;
use crate::pipeline::Renderer;
use std::sync::Arc;
use tracing::debug;

/// Resultado de consultar la caché
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Resumen renderizado a HTML
    Artifact(String),
    /// Mensaje de error guardado
    Error(String),
    /// Sin entrada: hay que encolar
    Pending,
}

/// Resolver que combina el store con el renderer
#[derive(Clone)]
pub struct CacheResolver {
    store: CacheStore,
    renderer: Arc<dyn Renderer>,
}

impl CacheResolver {
    pub fn new(store: CacheStore, renderer: Arc<dyn Renderer>) -> Self {
        Self { store, renderer }
    }

    /// Resuelve el estado de un job
    pub fn resolve(&self, job: &Job) -> Result<Resolution, CacheError> {
        let key = job.key();

        if self.store.has_artifact(key) {
            debug!(key, "resumen en caché");
            let html = self
                .renderer
                .render(&self.store.artifact_path(key))
                .map_err(|source| CacheError::Render {
                    key: key.to_string(),
                    source,
                })?;
            return Ok(Resolution::Artifact(html));
        }

        if let Some(message) = self.store.read_error(key)? {
            debug!(key, "error en caché");
            return Ok(Resolution::Error(message));
        }

        Ok(Resolution::Pending)
    }
}
