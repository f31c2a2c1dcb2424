//! # Resumen vía Servicio de Chat
//! src/pipeline/chat.rs
//!
//! Cliente bloqueante para un servicio compatible con `POST /api/chat` de
//! Ollama en modo streaming. La respuesta llega como NDJSON:
//!
//! ```text
//! {"message":{"role":"assistant","content":"# Ti"},"done":false}
//! {"message":{"role":"assistant","content":"tle\n"},"done":false}
//! ...
//! {"done":true}
//! ```
//!
//! Los fragmentos se acumulan y el stream se corta en cuanto aparece una
//! línea centinela (`---` o la nota final de la plantilla), aunque el modelo
//! siga generando.

use crate::pipeline::prompt::{NOTE_MARKER, SUMMARY_INSTRUCTIONS};
use crate::pipeline::{PipelineError, Summarizer};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tracing::{debug, trace};
use ureq::Agent;

/// Parámetros de muestreo enviados al modelo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOptions {
    pub temperature: f32,
    pub repeat_penalty: f32,
    pub seed: u64,
    pub num_ctx: u32,
    pub top_p: f32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.001,
            repeat_penalty: 1.0,
            seed: 42,
            num_ctx: 128_000,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    options: &'a ChatOptions,
    stream: bool,
}

/// Una línea del stream NDJSON
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

/// Summarizer que habla con un servidor Ollama
pub struct OllamaSummarizer {
    agent: Agent,
    endpoint: String,
    model: String,
    options: ChatOptions,
}

impl OllamaSummarizer {
    /// Crea un cliente para `host` (ej: "http://localhost:11434")
    pub fn new(host: &str, model: &str) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(10)))
            .build()
            .into();

        Self {
            agent,
            endpoint: format!("{}/api/chat", host.trim_end_matches('/')),
            model: model.to_string(),
            options: ChatOptions::default(),
        }
    }

    /// Reemplaza los parámetros de muestreo
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    /// URL completa del endpoint de chat
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, text: &str) -> Result<String, PipelineError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "user",
                    content: text,
                },
                ChatMessage {
                    role: "system",
                    content: SUMMARY_INSTRUCTIONS,
                },
            ],
            options: &self.options,
            stream: true,
        };

        Ok(serde_json::to_string(&request)?)
    }
}

impl Summarizer for OllamaSummarizer {
    fn summarize(&self, text: &str) -> Result<String, PipelineError> {
        debug!(endpoint = %self.endpoint, model = %self.model, chars = text.chars().count(), "enviando texto al modelo");

        let response = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .send(self.request_body(text)?)?;

        read_stream(BufReader::new(response.into_body().into_reader()))
    }
}

/// Consume un stream NDJSON hasta `done`, EOF o una línea centinela
pub fn read_stream<R: BufRead>(reader: R) -> Result<String, PipelineError> {
    let mut accumulator = StreamAccumulator::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let chunk: ChatChunk = serde_json::from_str(&line)?;
        if let Some(error) = chunk.error {
            return Err(PipelineError::Service(error));
        }

        if let Some(message) = chunk.message {
            if accumulator.push(&message.content) {
                debug!("línea centinela recibida, se corta el stream");
                break;
            }
        }

        if chunk.done {
            break;
        }
    }

    accumulator.finish()
}

/// Acumula fragmentos de texto y detecta el fin del resumen
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    response: String,
    current_line: String,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un fragmento; retorna true si completó una línea centinela
    pub fn push(&mut self, fragment: &str) -> bool {
        self.response.push_str(fragment);
        self.current_line.push_str(fragment);
        trace!(fragment, "fragmento recibido");

        while let Some(end) = self.current_line.find('\n') {
            let line: String = self.current_line.drain(..=end).collect();
            if is_sentinel(line.trim_end_matches(['\r', '\n'])) {
                return true;
            }
        }

        false
    }

    /// Texto acumulado hasta ahora
    pub fn text(&self) -> &str {
        &self.response
    }

    /// Resumen final sin espacios sobrantes
    pub fn finish(self) -> Result<String, PipelineError> {
        let summary = self.response.trim();
        if summary.is_empty() {
            return Err(PipelineError::EmptyCompletion);
        }
        Ok(summary.to_string())
    }
}

fn is_sentinel(line: &str) -> bool {
    line.starts_with("---") || line.to_lowercase().contains(NOTE_MARKER)
}
