//! # Módulo HTTP
//!
//! Implementación mínima del protocolo de cable, sin librerías de alto nivel:
//!
//! - Framing de requests (request line, headers, body por `content-length`)
//! - Respuestas con preámbulo fijo y body JSON
//!
//! No es un servidor HTTP general: no hay routing, ni chunked encoding,
//! ni conexiones persistentes. Una request por conexión.

pub mod request;   // Framing de requests
pub mod response;  // Construcción de responses

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{FrameError, ParsedRequest, BLOCK_SIZE};
pub use response::Response;
