//! # Pipeline de Documentos
//! src/pipeline/mod.rs
//!
//! Colaboradores externos del worker y del resolver, cada uno detrás de un
//! trait para poder reemplazarlos en tests:
//!
//! - `TextExtractor`: documento → texto plano (por defecto `pdftotext`)
//! - `Summarizer`: texto → resumen en markdown (servicio de chat en streaming)
//! - `Renderer`: resumen en caché → HTML (por defecto `pandoc`)

pub mod chat;
pub mod extract;
pub mod prompt;
pub mod render;

pub use chat::{ChatOptions, OllamaSummarizer, StreamAccumulator};
pub use extract::CommandExtractor;
pub use render::CommandRenderer;

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Errores de los colaboradores externos
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No se pudo lanzar la herramienta
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// La herramienta terminó con error
    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Error de transporte o status HTTP del servicio de chat
    #[error("chat request failed: {0}")]
    Chat(#[from] ureq::Error),

    /// Error leyendo el stream de respuesta
    #[error("failed to read chat stream: {0}")]
    Stream(#[from] io::Error),

    /// Fragmento del stream que no es JSON válido
    #[error("invalid chat stream fragment: {0}")]
    Fragment(#[from] serde_json::Error),

    /// El servicio reportó un error dentro del stream
    #[error("chat service reported an error: {0}")]
    Service(String),

    /// El servicio no devolvió texto
    #[error("chat service returned no content")]
    EmptyCompletion,
}

/// Extrae el texto de un documento
pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &Path) -> Result<String, PipelineError>;
}

/// Produce un resumen en markdown a partir del texto extraído
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String, PipelineError>;
}

/// Convierte un resumen en caché (markdown) a HTML
pub trait Renderer: Send + Sync {
    fn render(&self, artifact: &Path) -> Result<String, PipelineError>;
}

/// Ejecuta una herramienta externa y retorna su stdout decodificado
///
/// Las secuencias UTF-8 inválidas se reemplazan.
pub(crate) fn run_tool(mut command: Command) -> Result<String, PipelineError> {
    let program = command.get_program().to_string_lossy().into_owned();

    let output = command.output().map_err(|source| PipelineError::Spawn {
        program: program.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(PipelineError::ToolFailed {
            program,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
