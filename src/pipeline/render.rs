//! # Render de Resúmenes
//!
//! Convierte un resumen en caché a HTML con una herramienta externa:
//! `pandoc -f markdown -t html <path>`. La salida se pasa tal cual al cliente.

use crate::pipeline::{run_tool, PipelineError, Renderer};
use std::path::Path;
use std::process::Command;

/// Renderer basado en pandoc
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
}

impl CommandRenderer {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, artifact: &Path) -> Result<String, PipelineError> {
        let mut command = Command::new(&self.program);
        command.args(["-f", "markdown", "-t", "html"]).arg(artifact);

        run_tool(command)
    }
}
