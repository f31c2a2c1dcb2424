//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Una conexión = un request = un response:
//!
//! ```text
//! leer frame → parsear {"path": ...} → resolver caché → responder → cerrar
//! ```
//!
//! Un frame malformado cierra la conexión sin responder. Un body que no es
//! un job válido (JSON roto, sin `path`, path sin nombre de archivo) se
//! responde con el request crudo (eco). Un fallo al resolver la caché se
//! responde como `{"error": ...}`.

use crate::cache::{CacheResolver, Resolution};
use crate::http::{FrameError, ParsedRequest, Response};
use crate::jobs::{Job, JobRequest, Scheduler};
use std::io::{self, Write};
use std::net::TcpStream;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Atiende conexiones individuales
///
/// Se comparte entre threads con `Arc` cuando el servidor es concurrente.
pub struct ConnectionHandler {
    resolver: CacheResolver,
    scheduler: Scheduler,
    read_timeout: Option<Duration>,
}

impl ConnectionHandler {
    pub fn new(resolver: CacheResolver, scheduler: Scheduler, read_timeout: Option<Duration>) -> Self {
        Self {
            resolver,
            scheduler,
            read_timeout,
        }
    }

    /// Procesa una conexión completa y la cierra
    pub fn handle(&self, mut stream: TcpStream) -> io::Result<()> {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_read_timeout(self.read_timeout)?;

        let request = match ParsedRequest::read_from(&mut stream) {
            Ok(request) => request,
            Err(FrameError::EmptyRequest) => {
                debug!(%peer, "conexión cerrada sin datos");
                return Ok(());
            }
            Err(e) => {
                warn!(%peer, error = %e, "request malformado, se cierra sin responder");
                return Ok(());
            }
        };

        info!("{} - {}", peer, request.request_line());

        let response = self.respond(&request);
        debug!(%peer, body = response.body(), "response");

        stream.write_all(&response.to_bytes())?;
        stream.flush()
    }

    /// Construye el response para un request ya leído
    pub fn respond(&self, request: &ParsedRequest) -> Response {
        let job = match job_from_body(request.body_text()) {
            Ok(job) => job,
            Err(reason) => {
                warn!(reason = %reason, "body no es un job válido, se responde con eco");
                return Response::echo(&request.raw_text());
            }
        };

        match self.resolver.resolve(&job) {
            Ok(Resolution::Artifact(html)) => Response::summary(&html),
            Ok(Resolution::Error(message)) => Response::error(&message),
            Ok(Resolution::Pending) => {
                if self.scheduler.submit(job.clone()) {
                    info!(path = job.source_path(), pending = self.scheduler.pending(), "job encolado");
                } else {
                    debug!(key = job.key(), "job ya pendiente, no se vuelve a encolar");
                }
                Response::downloading()
            }
            Err(e) => {
                warn!(key = job.key(), error = %e, "no se pudo resolver la caché");
                Response::error(&e.to_string())
            }
        }
    }
}

fn job_from_body(body: &str) -> Result<Job, String> {
    let job_request: JobRequest = serde_json::from_str(body).map_err(|e| e.to_string())?;
    Job::try_from(job_request).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::pipeline::{PipelineError, Renderer};
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct UpperRenderer;

    impl Renderer for UpperRenderer {
        fn render(&self, artifact: &Path) -> Result<String, PipelineError> {
            Ok(fs::read_to_string(artifact)?.to_uppercase())
        }
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&self, _artifact: &Path) -> Result<String, PipelineError> {
            Err(PipelineError::Spawn {
                program: "pandoc".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "not installed"),
            })
        }
    }

    fn handler() -> (TempDir, CacheStore, Scheduler, ConnectionHandler) {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();
        let scheduler = Scheduler::default();
        let resolver = CacheResolver::new(store.clone(), Arc::new(UpperRenderer));
        let handler = ConnectionHandler::new(resolver, scheduler.clone(), None);
        (dir, store, scheduler, handler)
    }

    fn request(body: &str) -> ParsedRequest {
        let raw = format!(
            "POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        ParsedRequest::read_from(&mut Cursor::new(raw.into_bytes())).unwrap()
    }

    fn body_json(response: &Response) -> serde_json::Value {
        serde_json::from_str(response.body()).unwrap()
    }

    #[test]
    fn test_pending_enqueues_job() {
        let (_dir, _store, scheduler, handler) = handler();

        let response = handler.respond(&request(r#"{"path": "/docs/report.pdf"}"#));

        assert_eq!(body_json(&response), serde_json::json!({ "downloading": true }));
        let job = scheduler.next(Duration::from_millis(10)).unwrap();
        assert_eq!(job.source_path(), "/docs/report.pdf");
        assert_eq!(job.key(), "report.pdf");
    }

    #[test]
    fn test_cached_summary_is_rendered() {
        let (_dir, store, scheduler, handler) = handler();
        store.write_artifact("report.pdf", "# title").unwrap();

        let response = handler.respond(&request(r#"{"path": "/other/report.pdf"}"#));

        assert_eq!(body_json(&response), serde_json::json!({ "summary": "# TITLE" }));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cached_error_is_returned() {
        let (_dir, store, scheduler, handler) = handler();
        store.write_error("report.pdf", "too short").unwrap();

        let response = handler.respond(&request(r#"{"path": "report.pdf"}"#));

        assert_eq!(body_json(&response), serde_json::json!({ "error": "too short" }));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_invalid_json_is_echoed() {
        let (_dir, _store, scheduler, handler) = handler();
        let req = request("not json");

        let response = handler.respond(&req);

        assert_eq!(response.body(), req.raw_text());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_missing_path_is_echoed() {
        let (_dir, _store, _scheduler, handler) = handler();
        let req = request(r#"{"file": "report.pdf"}"#);

        assert_eq!(handler.respond(&req).body(), req.raw_text());
    }

    #[test]
    fn test_path_without_file_name_is_echoed() {
        let (_dir, _store, scheduler, handler) = handler();
        let req = request(r#"{"path": "/"}"#);

        assert_eq!(handler.respond(&req).body(), req.raw_text());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let (_dir, _store, scheduler, handler) = handler();

        handler.respond(&request(r#"{"path": "a.pdf", "priority": 3}"#));
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_render_failure_answers_json_error() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();
        store.write_artifact("report.pdf", "# Title").unwrap();
        let scheduler = Scheduler::default();
        let resolver = CacheResolver::new(store, Arc::new(FailingRenderer));
        let handler = ConnectionHandler::new(resolver, scheduler.clone(), None);

        let req = request(r#"{"path": "/docs/report.pdf"}"#);
        let response = handler.respond(&req);

        assert_ne!(response.body(), req.raw_text());
        let body = body_json(&response);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("report.pdf"));
        assert!(message.contains("pandoc"));
        assert_eq!(scheduler.pending(), 0);
    }
}
