//! # Summary Server
//! src/lib.rs
//!
//! Servidor TCP que resume documentos con un modelo de lenguaje y sirve
//! los resúmenes desde una caché en disco. Los requests nunca esperan al
//! modelo: si el resumen no existe se encola un job y el cliente vuelve a
//! preguntar más tarde.
//!
//! ## Arquitectura
//!
//! - `http`: framing de requests y responses con preámbulo fijo
//! - `server`: loop de aceptación y manejo de cada conexión
//! - `cache`: entradas en disco y resolución hit / error / pendiente
//! - `jobs`: cola, scheduler y worker en segundo plano
//! - `pipeline`: extracción de texto, resumen vía chat y render a HTML
//! - `config`: argumentos CLI y variables de entorno
//! - `logging`: inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```ignore
//! use std::sync::Arc;
//! use summary_server::cache::{CacheResolver, CacheStore};
//! use summary_server::config::Config;
//! use summary_server::jobs::Scheduler;
//! use summary_server::pipeline::CommandRenderer;
//! use summary_server::server::Server;
//!
//! let config = Config::default();
//! let store = CacheStore::open(&config.cache_dir)?;
//! let resolver = CacheResolver::new(store, Arc::new(CommandRenderer::default()));
//! let server = Server::new(config, resolver, Scheduler::default());
//! server.run()?;
//! ```

pub mod cache;
pub mod config;
pub mod http;
pub mod jobs;
pub mod logging;
pub mod pipeline;
pub mod server;
