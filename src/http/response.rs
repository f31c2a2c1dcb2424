//! # Construcción de Respuestas
//!
//! Todas las respuestas comparten el mismo preámbulo fijo: este servidor
//! nunca emite un status distinto de 200.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Access-Control-Allow-Origin: *\r\n
//! Content-Type: application/json; charset=utf-8\r\n
//! \r\n
//! {"downloading":true}
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use summary_server::http::Response;
//!
//! let response = Response::error("text-extraction too short");
//! let bytes = response.to_bytes();
//! // Ahora puedes enviar `bytes` por el socket
//! ```

use serde_json::{json, Value};

/// Status line fija
const STATUS_LINE: &str = "HTTP/1.1 200 OK";

/// Headers fijos, en orden
const HEADERS: [(&str, &str); 2] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Content-Type", "application/json; charset=utf-8"),
];

/// Respuesta lista para escribir en el socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    body: String,
}

impl Response {
    /// Respuesta con un body JSON arbitrario
    pub fn json(value: &Value) -> Self {
        Self {
            body: value.to_string(),
        }
    }

    /// `{"summary": <html>}` - el resumen ya está en caché
    pub fn summary(html: &str) -> Self {
        Self::json(&json!({ "summary": html }))
    }

    /// `{"error": <mensaje>}` - el procesamiento falló antes
    pub fn error(message: &str) -> Self {
        Self::json(&json!({ "error": message }))
    }

    /// `{"downloading": true}` - el job quedó encolado
    pub fn downloading() -> Self {
        Self::json(&json!({ "downloading": true }))
    }

    /// Fallback heredado: devuelve el request crudo como body
    pub fn echo(raw_request: &str) -> Self {
        Self {
            body: raw_request.to_string(),
        }
    }

    /// Obtiene el body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Convierte la respuesta a bytes: status line, headers, línea vacía, body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(STATUS_LINE.as_bytes());
        result.extend_from_slice(b"\r\n");

        for (name, value) in HEADERS {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(self.body.as_bytes());

        result
    }
}
