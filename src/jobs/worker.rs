//! # Worker de Resúmenes
//! src/jobs/worker.rs
//!
//! Un único worker drena la cola, un job a la vez:
//!
//! 1. Si el resumen ya existe, se salta (protege contra jobs duplicados).
//! 2. Reutiliza `txts/<key>.txt` o extrae el texto del documento.
//!    Texto demasiado corto → se guarda un error y el job termina.
//! 3. Envía el texto al servicio de chat y guarda el resumen.
//!
//! Si el servicio de chat falla no se escribe nada: un request posterior
//! vuelve a encolar la key.

use crate::cache::{CacheError, CacheStore};
use crate::config::Config;
use crate::jobs::job::Job;
use crate::jobs::scheduler::Scheduler;
use crate::pipeline::{Summarizer, TextExtractor};
use std::io;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Configuración del worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Espera máxima por job antes de volver a iterar
    pub poll_interval: Duration,

    /// Largo mínimo (en caracteres) para considerar válida una extracción
    pub min_text_len: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            min_text_len: 1000,
        }
    }
}

impl WorkerConfig {
    /// Crea una configuración desde el Config principal
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            min_text_len: config.min_text_len,
        }
    }
}

/// Resultado de procesar un job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// El resumen ya existía
    Skipped,
    /// Resumen escrito
    Summarized,
    /// Error escrito en `errors/`
    Rejected(String),
    /// El servicio de chat falló; no se escribió nada
    Deferred(String),
}

/// Worker que materializa entradas de caché
pub struct Worker {
    scheduler: Scheduler,
    cache: CacheStore,
    extractor: Box<dyn TextExtractor>,
    summarizer: Box<dyn Summarizer>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(
        scheduler: Scheduler,
        cache: CacheStore,
        extractor: Box<dyn TextExtractor>,
        summarizer: Box<dyn Summarizer>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            scheduler,
            cache,
            extractor,
            summarizer,
            config,
        }
    }

    /// Lanza el worker en su propio thread
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("summary-worker".to_string())
            .spawn(move || self.run())
    }

    /// Loop principal; no retorna
    pub fn run(&self) {
        info!(
            poll_secs = self.config.poll_interval.as_secs_f64(),
            min_text_len = self.config.min_text_len,
            "🔧 worker iniciado"
        );

        loop {
            self.run_once();
        }
    }

    /// Espera un job hasta `poll_interval` y lo procesa
    ///
    /// Retorna None si no llegó ningún job (no es un error).
    pub fn run_once(&self) -> Option<Outcome> {
        let job = self.scheduler.next(self.config.poll_interval)?;
        Some(self.handle(&job))
    }

    fn handle(&self, job: &Job) -> Outcome {
        let start = Instant::now();
        let outcome = match self.process(job) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(key = job.key(), error = %e, "❌ no se pudo actualizar la caché");
                Outcome::Deferred(e.to_string())
            }
        };
        self.scheduler.complete(job);

        debug!(
            key = job.key(),
            outcome = ?outcome,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "job terminado"
        );
        outcome
    }

    /// Procesa un job completo
    pub fn process(&self, job: &Job) -> Result<Outcome, CacheError> {
        let key = job.key();

        if self.cache.has_artifact(key) {
            info!(path = job.source_path(), "resumen ya existe, se salta");
            return Ok(Outcome::Skipped);
        }

        let text = match self.obtain_text(job)? {
            Ok(text) => text,
            Err(message) => return Ok(Outcome::Rejected(message)),
        };

        info!(path = job.source_path(), "esperando respuesta del modelo ...");
        match self.summarizer.summarize(&text) {
            Ok(summary) => {
                self.cache.write_artifact(key, &summary)?;
                info!(key, "✅ summaries/{}.txt escrito", key);
                Ok(Outcome::Summarized)
            }
            Err(e) => {
                error!(path = job.source_path(), error = %e, "el servicio de chat falló");
                Ok(Outcome::Deferred(e.to_string()))
            }
        }
    }

    /// Obtiene el texto del documento
    ///
    /// El resultado interno es `Err(mensaje)` cuando la extracción no sirve;
    /// en ese caso el error ya quedó guardado en la caché.
    fn obtain_text(&self, job: &Job) -> Result<Result<String, String>, CacheError> {
        let key = job.key();

        if let Some(cached) = self.cache.read_text(key)? {
            if self.is_long_enough(&cached) {
                debug!(key, "usando texto extraído en caché");
                return Ok(Ok(cached));
            }
        }

        info!(path = job.source_path(), "extrayendo texto ...");
        let extracted = match self.extractor.extract(Path::new(job.source_path())) {
            Ok(text) => text,
            Err(e) => {
                let message = format!("text-extraction failed: {}", e);
                warn!(path = job.source_path(), error = %e, "no se pudo extraer el texto");
                self.cache.write_error(key, &message)?;
                return Ok(Err(message));
            }
        };

        if self.is_long_enough(&extracted) {
            self.cache.write_text(key, &extracted)?;
            return Ok(Ok(extracted));
        }

        let message = format!(
            "text-extraction too short. Corrupt file?\nExtracted: {}",
            extracted
        );
        warn!(
            path = job.source_path(),
            chars = extracted.chars().count(),
            "texto extraído demasiado corto, ¿archivo corrupto?"
        );
        self.cache.write_error(key, &message)?;
        Ok(Err(message))
    }

    fn is_long_enough(&self, text: &str) -> bool {
        text.chars().count() > self.config.min_text_len
    }
}
