//! # Summary Server - Entry Point
//! src/main.rs
//!
//! Arranca el worker de resúmenes en segundo plano y luego el loop de
//! aceptación en el thread principal.

use std::process::ExitCode;
use std::sync::Arc;
use summary_server::cache::{CacheResolver, CacheStore};
use summary_server::config::Config;
use summary_server::jobs::{Scheduler, Worker, WorkerConfig};
use summary_server::logging;
use summary_server::pipeline::{CommandExtractor, CommandRenderer, OllamaSummarizer};
use summary_server::server::{Server, ServerError};
use tracing::{error, info};

fn main() -> ExitCode {
    // Crear configuración (CLI o env)
    let config = Config::new();
    logging::init(config.verbosity());

    if let Err(e) = config.validate() {
        error!("💥 Configuración inválida: {}", e);
        return ExitCode::FAILURE;
    }
    config.log_summary();

    let store = match CacheStore::open(&config.cache_dir) {
        Ok(store) => store,
        Err(e) => {
            error!("💥 No se pudo preparar la caché: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let scheduler = Scheduler::new(config.collapse_duplicates);

    let worker = Worker::new(
        scheduler.clone(),
        store.clone(),
        Box::new(CommandExtractor::new(&config.extractor)),
        Box::new(
            OllamaSummarizer::new(&config.llm_host, &config.model)
                .with_options(config.chat_options()),
        ),
        WorkerConfig::from_config(&config),
    );
    let worker_handle = match worker.spawn() {
        Ok(handle) => handle,
        Err(e) => {
            error!("💥 No se pudo lanzar el worker: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let resolver = CacheResolver::new(store, Arc::new(CommandRenderer::new(&config.renderer)));
    let server = Server::new(config, resolver, scheduler);

    match server.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ ServerError::Bind { .. }) => {
            error!("💥 Error fatal: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            // El servidor se detuvo pero el worker termina la cola pendiente
            error!("💥 Servidor detenido: {}", e);
            info!("el worker sigue procesando jobs; Ctrl-C para salir");
            if worker_handle.join().is_err() {
                error!("el worker terminó con panic");
            }
            ExitCode::FAILURE
        }
    }
}
