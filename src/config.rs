//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración con soporte para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./summary_server --port 3246 \
//!   --cache-dir /srv/papers \
//!   --llm-host http://gpu-box:11434 \
//!   --collapse-duplicates -v
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! SUMMARY_PORT=8080 SUMMARY_BIND=0.0.0.0 ./summary_server
//! ```

use crate::pipeline::ChatOptions;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Configuración del servidor de resúmenes
#[derive(Debug, Clone, Parser)]
#[command(name = "summary_server")]
#[command(about = "Servidor que resume documentos en segundo plano y sirve los resúmenes en caché")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Host/IP en el que escucha
    #[arg(short, long, default_value = "localhost", env = "SUMMARY_BIND")]
    pub bind: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "3246", env = "SUMMARY_PORT")]
    pub port: u16,

    /// Loguea también cada response completo
    #[arg(short, long)]
    pub verbose: bool,

    /// Solo advertencias y errores (tiene prioridad sobre --verbose)
    #[arg(short, long)]
    pub quiet: bool,

    // === Caché ===
    /// Directorio raíz de summaries/, errors/ y txts/
    #[arg(long = "cache-dir", default_value = ".", env = "SUMMARY_CACHE_DIR")]
    pub cache_dir: PathBuf,

    // === Herramientas externas ===
    /// Programa que extrae texto de un documento (`<prog> <path> -`)
    #[arg(long, default_value = "pdftotext", env = "SUMMARY_EXTRACTOR")]
    pub extractor: String,

    /// Programa que convierte markdown a HTML
    #[arg(long, default_value = "pandoc", env = "SUMMARY_RENDERER")]
    pub renderer: String,

    /// URL base del servicio de chat
    #[arg(long = "llm-host", default_value = "http://localhost:11434", env = "SUMMARY_LLM_HOST")]
    pub llm_host: String,

    /// Modelo usado para resumir
    #[arg(long, default_value = "phi3:14b-medium-128k-instruct-f16", env = "SUMMARY_MODEL")]
    pub model: String,

    /// Temperatura de muestreo del modelo
    #[arg(long, default_value = "0.001", env = "SUMMARY_TEMPERATURE")]
    pub temperature: f32,

    /// Semilla del modelo (resúmenes reproducibles)
    #[arg(long, default_value = "42", env = "SUMMARY_SEED")]
    pub seed: u64,

    /// Tamaño de la ventana de contexto en tokens
    #[arg(long = "num-ctx", default_value = "128000", env = "SUMMARY_NUM_CTX")]
    pub num_ctx: u32,

    // === Worker ===
    /// Mínimo de caracteres para aceptar un texto extraído
    #[arg(long = "min-text-len", default_value = "1000", env = "SUMMARY_MIN_TEXT_LEN")]
    pub min_text_len: usize,

    /// Segundos que el worker espera por un job antes de volver a iterar
    #[arg(long = "poll-secs", default_value = "5", env = "SUMMARY_POLL_SECS")]
    pub poll_secs: u64,

    // === Conexiones ===
    /// Timeout de lectura por conexión en segundos (0 = sin timeout)
    #[arg(long = "read-timeout-secs", default_value = "0", env = "SUMMARY_READ_TIMEOUT_SECS")]
    pub read_timeout_secs: u64,

    /// Atiende cada conexión en su propio thread
    #[arg(long)]
    pub concurrent: bool,

    /// No encola una key que ya está pendiente
    #[arg(long = "collapse-duplicates")]
    pub collapse_duplicates: bool,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use summary_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "localhost:3246");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Nivel de verbosidad: 0 (quiet), 1 (normal) o 2 (verbose)
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else if self.verbose {
            2
        } else {
            1
        }
    }

    /// Parámetros de muestreo para el servicio de chat
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            temperature: self.temperature,
            seed: self.seed,
            num_ctx: self.num_ctx,
            ..ChatOptions::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    /// Timeout de lectura por conexión, None si está desactivado
    pub fn read_timeout(&self) -> Option<Duration> {
        match self.read_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port must be > 0".to_string());
        }
        if self.bind.trim().is_empty() {
            return Err("Bind address must not be empty".to_string());
        }

        if self.extractor.trim().is_empty() {
            return Err("Extractor program must not be empty".to_string());
        }
        if self.renderer.trim().is_empty() {
            return Err("Renderer program must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("Model must not be empty".to_string());
        }

        if !(self.llm_host.starts_with("http://") || self.llm_host.starts_with("https://")) {
            return Err(format!(
                "LLM host must start with http:// or https:// (got '{}')",
                self.llm_host
            ));
        }

        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err("Temperature must be a non-negative number".to_string());
        }
        if self.num_ctx == 0 {
            return Err("Context window must be > 0".to_string());
        }

        if self.poll_secs == 0 {
            return Err("Poll interval must be > 0".to_string());
        }

        Ok(())
    }

    /// Loguea un resumen de la configuración
    pub fn log_summary(&self) {
        info!(address = %self.address(), "🌐 red");
        info!(cache_dir = %self.cache_dir.display(), "🗂️  caché");
        info!(
            extractor = %self.extractor,
            renderer = %self.renderer,
            llm_host = %self.llm_host,
            model = %self.model,
            temperature = self.temperature,
            seed = self.seed,
            num_ctx = self.num_ctx,
            "🔧 herramientas"
        );
        info!(
            min_text_len = self.min_text_len,
            poll_secs = self.poll_secs,
            read_timeout_secs = self.read_timeout_secs,
            concurrent = self.concurrent,
            collapse_duplicates = self.collapse_duplicates,
            "👷 worker y conexiones"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            bind: "localhost".to_string(),
            port: 3246,
            verbose: false,
            quiet: false,
            cache_dir: PathBuf::from("."),
            extractor: "pdftotext".to_string(),
            renderer: "pandoc".to_string(),
            llm_host: "http://localhost:11434".to_string(),
            model: "phi3:14b-medium-128k-instruct-f16".to_string(),
            temperature: 0.001,
            seed: 42,
            num_ctx: 128_000,
            min_text_len: 1000,
            poll_secs: 5,
            read_timeout_secs: 0,
            concurrent: false,
            collapse_duplicates: false,
        }
    }
}
