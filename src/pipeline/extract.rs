//! # Extracción de Texto
//!
//! Invoca una herramienta externa con el path del documento y toma su
//! stdout como texto: `pdftotext <path> -`.

use crate::pipeline::{run_tool, PipelineError, TextExtractor};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Extractor basado en un comando externo
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
}

impl CommandExtractor {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for CommandExtractor {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl TextExtractor for CommandExtractor {
    fn extract(&self, document: &Path) -> Result<String, PipelineError> {
        debug!(program = %self.program, document = %document.display(), "extrayendo texto");

        let mut command = Command::new(&self.program);
        // "-" envía el texto a stdout
        command.arg(document).arg("-");

        run_tool(command)
    }
}
