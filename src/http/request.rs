//! # Lectura y Framing de Requests
//! src/http/request.rs
//!
//! Este módulo convierte los bytes crudos de una conexión en un
//! `ParsedRequest` (request line + headers + body) sin usar librerías HTTP.
//!
//! ## Formato esperado
//!
//! ```text
//! POST / HTTP/1.1\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 30\r\n
//! \r\n
//! {"path": "/docs/report.pdf"}
//! ```
//!
//! ## Algoritmo
//!
//! 1. Leer el primer bloque (hasta `BLOCK_SIZE` bytes) hasta ver el fin de
//!    los headers (`\r\n\r\n`), llenar el bloque o que el peer cierre.
//! 2. Parsear request line y headers (nombres en minúsculas).
//! 3. Si hay `content-length`, seguir leyendo hasta completar el body. Lo que
//!    falta se recalcula después de cada `read`, nunca se asume que las
//!    lecturas vienen alineadas al tamaño de bloque.
//!
//! El body se decodifica como UTF-8 reemplazando secuencias inválidas:
//! el framer solo falla por errores estructurales.
//!
//! El paso 1 bloquea mientras el peer no envíe `\r\n\r\n` ni cierre. Con el
//! loop de aceptación en serie eso detiene al resto de los clientes; el
//! límite es el timeout de lectura de la conexión (`--read-timeout-secs`),
//! que llega acá como `FrameError::Io`.

use std::collections::HashMap;
use std::io::{self, Read};
use thiserror::Error;
use tracing::{trace, warn};

/// Tamaño de bloque del protocolo (suele ser el tamaño máximo de headers)
pub const BLOCK_SIZE: usize = 8192;

/// Separador entre el bloque de headers y el body
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Terminador de línea del protocolo
const LINE_TERMINATOR: &str = "\r\n";

/// Separador entre nombre y valor de un header
const HEADER_SEPARATOR: &str = ": ";

/// Errores de framing (request malformado a nivel estructural)
#[derive(Debug, Error)]
pub enum FrameError {
    /// El peer cerró sin enviar nada
    #[error("Empty request")]
    EmptyRequest,

    /// La primera línea está vacía
    #[error("Missing request line")]
    MissingRequestLine,

    /// Header sin exactamente un separador `name: value`
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// `content-length` no numérico
    #[error("Invalid content-length: {0}")]
    InvalidContentLength(String),

    /// Error del socket durante la lectura
    #[error("I/O error while reading request: {0}")]
    Io(#[from] io::Error),
}

/// Request parseado de una conexión
///
/// Vive solo mientras dura la conexión.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// Primera línea, opaca (ej: "POST / HTTP/1.1")
    request_line: String,

    /// Headers con el nombre en minúsculas; los duplicados se sobrescriben
    header_fields: HashMap<String, String>,

    /// Todos los bytes recibidos
    raw_bytes: Vec<u8>,

    /// Posición en `raw_bytes` donde empieza el body
    body_offset: usize,

    /// Body decodificado (UTF-8 con reemplazo)
    body_text: String,
}

impl ParsedRequest {
    /// Lee un request completo desde un stream
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use std::io::Cursor;
    /// use summary_server::http::ParsedRequest;
    ///
    /// let raw = b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\n{}";
    /// let request = ParsedRequest::read_from(&mut Cursor::new(&raw[..])).unwrap();
    ///
    /// assert_eq!(request.request_line(), "POST / HTTP/1.1");
    /// assert_eq!(request.body_text(), "{}");
    /// ```
    pub fn read_from<R: Read>(stream: &mut R) -> Result<Self, FrameError> {
        let first_chunk = read_first_chunk(stream)?;
        let mut request = Self::parse_head(first_chunk)?;

        if let Some(expected) = request.content_length()? {
            request.read_body(stream, expected)?;
        }

        request.body_text = String::from_utf8_lossy(request.body_bytes()).into_owned();
        Ok(request)
    }

    /// Parsea el primer bloque: request line, headers y fragmento inicial del body
    pub fn parse_head(first_chunk: Vec<u8>) -> Result<Self, FrameError> {
        if first_chunk.is_empty() {
            return Err(FrameError::EmptyRequest);
        }

        let (head_end, body_offset) = match find_subsequence(&first_chunk, HEADER_TERMINATOR) {
            Some(pos) => (pos, pos + HEADER_TERMINATOR.len()),
            // Sin línea vacía: todo el bloque son headers y el body está vacío
            None => (first_chunk.len(), first_chunk.len()),
        };

        let head = String::from_utf8_lossy(&first_chunk[..head_end]).into_owned();
        let mut lines = head.split(LINE_TERMINATOR);

        let request_line = lines.next().unwrap_or_default().to_string();
        if request_line.trim().is_empty() {
            return Err(FrameError::MissingRequestLine);
        }

        let header_fields = Self::parse_headers(lines)?;
        let body_text = String::from_utf8_lossy(&first_chunk[body_offset..]).into_owned();

        Ok(Self {
            request_line,
            header_fields,
            raw_bytes: first_chunk,
            body_offset,
            body_text,
        })
    }

    /// Parsea los headers hasta la primera línea vacía
    ///
    /// Cada línea debe partirse en exactamente dos piezas con `": "`.
    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, FrameError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.is_empty() {
                break;
            }

            let parts: Vec<&str> = line.split(HEADER_SEPARATOR).collect();
            match parts.as_slice() {
                [name, value] => {
                    headers.insert(name.to_lowercase(), value.to_string());
                }
                _ => return Err(FrameError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    /// Completa el body hasta `expected` bytes
    ///
    /// Si el peer cierra antes, se queda con lo recibido.
    fn read_body<R: Read>(&mut self, stream: &mut R, expected: usize) -> Result<(), FrameError> {
        let mut block = [0u8; BLOCK_SIZE];

        loop {
            let remaining = expected.saturating_sub(self.body_bytes().len());
            if remaining == 0 {
                return Ok(());
            }

            let wanted = remaining.min(BLOCK_SIZE);
            let read = read_block(stream, &mut block[..wanted])?;
            if read == 0 {
                warn!(
                    expected,
                    received = self.body_bytes().len(),
                    "peer cerró la conexión antes de completar el body"
                );
                return Ok(());
            }

            trace!(read, remaining = remaining - read, "bloque de body recibido");
            self.raw_bytes.extend_from_slice(&block[..read]);
        }
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene la request line
    pub fn request_line(&self) -> &str {
        &self.request_line
    }

    /// Obtiene todos los headers (nombres en minúsculas)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.header_fields
    }

    /// Obtiene un header; el nombre no distingue mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_fields
            .get(&name.to_lowercase())
            .map(|s| s.as_str())
    }

    /// Valor numérico de `content-length`, si viene
    pub fn content_length(&self) -> Result<Option<usize>, FrameError> {
        match self.header("content-length") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map(Some)
                .map_err(|_| FrameError::InvalidContentLength(value.to_string())),
            None => Ok(None),
        }
    }

    /// Todos los bytes recibidos
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    /// Request completo decodificado (para el fallback de eco)
    pub fn raw_text(&self) -> String {
        String::from_utf8_lossy(&self.raw_bytes).into_owned()
    }

    /// Bytes del body recibidos hasta ahora
    pub fn body_bytes(&self) -> &[u8] {
        &self.raw_bytes[self.body_offset..]
    }

    /// Body decodificado
    pub fn body_text(&self) -> &str {
        &self.body_text
    }
}

/// Lee el primer bloque hasta ver el fin de headers, llenar el bloque o EOF
fn read_first_chunk<R: Read>(stream: &mut R) -> Result<Vec<u8>, FrameError> {
    let mut chunk = Vec::with_capacity(BLOCK_SIZE);
    let mut block = [0u8; BLOCK_SIZE];

    while chunk.len() < BLOCK_SIZE {
        let read = read_block(stream, &mut block[..BLOCK_SIZE - chunk.len()])?;
        if read == 0 {
            break;
        }

        chunk.extend_from_slice(&block[..read]);
        if find_subsequence(&chunk, HEADER_TERMINATOR).is_some() {
            break;
        }
    }

    Ok(chunk)
}

/// `read` que reintenta si la llamada fue interrumpida por una señal
fn read_block<R: Read>(stream: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buffer) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
