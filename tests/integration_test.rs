//! Tests de integración para el servidor de resúmenes
//! tests/integration_test.rs
//!
//! Cada test levanta su propio servidor en un puerto efímero, con una
//! caché en un directorio temporal y colaboradores falsos (sin pandoc,
//! pdftotext ni modelo).

use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use summary_server::cache::{CacheResolver, CacheStore};
use summary_server::config::Config;
use summary_server::jobs::{Scheduler, Worker, WorkerConfig};
use summary_server::pipeline::{PipelineError, Renderer, Summarizer, TextExtractor};
use summary_server::server::Server;
use tempfile::TempDir;

/// Renderer mínimo: `# Title\n\nBody` → `<h1>Title</h1><p>Body</p>`
struct MarkdownRenderer {
    calls: AtomicUsize,
}

impl Renderer for MarkdownRenderer {
    fn render(&self, artifact: &Path) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let markdown = fs::read_to_string(artifact)?;

        let html = markdown
            .split("\n\n")
            .filter(|block| !block.trim().is_empty())
            .map(|block| match block.strip_prefix("# ") {
                Some(title) => format!("<h1>{}</h1>", title.trim()),
                None => format!("<p>{}</p>", block.trim()),
            })
            .collect::<String>();
        Ok(html)
    }
}

struct FixedExtractor(&'static str);

impl TextExtractor for FixedExtractor {
    fn extract(&self, _document: &Path) -> Result<String, PipelineError> {
        Ok(self.0.to_string())
    }
}

struct FixedSummarizer(&'static str);

impl Summarizer for FixedSummarizer {
    fn summarize(&self, _text: &str) -> Result<String, PipelineError> {
        Ok(self.0.to_string())
    }
}

struct TestServer {
    dir: TempDir,
    store: CacheStore,
    scheduler: Scheduler,
    renderer: Arc<MarkdownRenderer>,
    addr: SocketAddr,
}

/// Helper: levanta un servidor en 127.0.0.1:0
fn start_server() -> TestServer {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::open(dir.path()).unwrap();
    let scheduler = Scheduler::default();
    let renderer = Arc::new(MarkdownRenderer {
        calls: AtomicUsize::new(0),
    });

    let mut config = Config::default();
    config.read_timeout_secs = 5;

    let resolver = CacheResolver::new(store.clone(), renderer.clone());
    let server = Server::new(config, resolver, scheduler.clone());

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || server.serve(listener));

    TestServer {
        dir,
        store,
        scheduler,
        renderer,
        addr,
    }
}

/// Helper: envía bytes crudos y retorna la response completa
fn send_raw(addr: SocketAddr, raw: &[u8]) -> Result<String, Box<dyn std::error::Error>> {
    let mut stream = TcpStream::connect(addr)?;

    // Configurar timeouts
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    stream.set_write_timeout(Some(Duration::from_secs(5)))?;

    stream.write_all(raw)?;
    stream.flush()?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response)?;

    Ok(String::from_utf8_lossy(&response).into_owned())
}

/// Helper: envía un body JSON con content-length
fn send_json(addr: SocketAddr, body: &str) -> Result<String, Box<dyn std::error::Error>> {
    let request = format!(
        "POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    send_raw(addr, request.as_bytes())
}

/// Helper: extrae el body de una response
fn extract_body(response: &str) -> &str {
    // Buscar la línea vacía que separa headers del body
    if let Some(pos) = response.find("\r\n\r\n") {
        &response[pos + 4..]
    } else {
        ""
    }
}

fn body_json(response: &str) -> serde_json::Value {
    serde_json::from_str(extract_body(response)).expect("body should be JSON")
}

const REPORT: &str = r#"{"path": "/docs/report.pdf"}"#;

#[test]
fn test_fixed_preamble() {
    let server = start_server();
    let response = send_json(server.addr, REPORT).unwrap();

    assert!(response.starts_with(
        "HTTP/1.1 200 OK\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Content-Type: application/json; charset=utf-8\r\n\r\n"
    ));
}

#[test]
fn test_uncached_request_is_enqueued() {
    let server = start_server();

    let response = send_json(server.addr, REPORT).unwrap();

    assert_eq!(body_json(&response), serde_json::json!({ "downloading": true }));
    let job = server.scheduler.next(Duration::from_secs(1)).unwrap();
    assert_eq!(job.key(), "report.pdf");
    assert_eq!(job.source_path(), "/docs/report.pdf");
}

#[test]
fn test_cached_summary_is_rendered() {
    let server = start_server();
    fs::write(
        server.dir.path().join("summaries/report.pdf.txt"),
        "# Title\n\nBody",
    )
    .unwrap();

    let response = send_json(server.addr, REPORT).unwrap();

    assert_eq!(
        body_json(&response),
        serde_json::json!({ "summary": "<h1>Title</h1><p>Body</p>" })
    );
    assert_eq!(server.scheduler.pending(), 0);
}

#[test]
fn test_cached_error_is_returned() {
    let server = start_server();
    server
        .store
        .write_error("report.pdf", "text-extraction too short")
        .unwrap();

    let response = send_json(server.addr, REPORT).unwrap();

    assert_eq!(
        body_json(&response),
        serde_json::json!({ "error": "text-extraction too short" })
    );
    assert_eq!(server.scheduler.pending(), 0);
}

#[test]
fn test_malformed_json_is_echoed() {
    let server = start_server();
    let request = "POST / HTTP/1.1\r\nContent-Length: 8\r\n\r\nnot json";

    let response = send_raw(server.addr, request.as_bytes()).unwrap();

    assert!(response.contains("200 OK"));
    assert_eq!(extract_body(&response), request);
    assert_eq!(server.scheduler.pending(), 0);
}

#[test]
fn test_repeated_read_is_idempotent() {
    let server = start_server();
    server.store.write_artifact("report.pdf", "# Title\n\nBody").unwrap();

    let first = send_json(server.addr, REPORT).unwrap();
    let second = send_json(server.addr, REPORT).unwrap();

    assert_eq!(extract_body(&first), extract_body(&second));
    assert_eq!(server.renderer.calls.load(Ordering::SeqCst), 2);
    assert_eq!(server.scheduler.pending(), 0);
}

#[test]
fn test_malformed_frame_gets_no_response() {
    let server = start_server();

    let response = send_raw(server.addr, b"POST / HTTP/1.1\r\nno-separator\r\n\r\n").unwrap();
    assert!(response.is_empty());

    // El servidor sigue vivo
    let response = send_json(server.addr, REPORT).unwrap();
    assert!(response.contains("downloading"));
}

#[test]
fn test_body_split_across_writes() {
    let server = start_server();
    let body = r#"{"path": "/docs/ñandú.pdf"}"#;
    let head = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body.len());

    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(head.as_bytes()).unwrap();
    stream.flush().unwrap();
    thread::sleep(Duration::from_millis(50));

    // Cortar en medio de la "ñ" (2 bytes en UTF-8)
    let split = body.find('ñ').unwrap() + 1;
    stream.write_all(&body.as_bytes()[..split]).unwrap();
    stream.flush().unwrap();
    thread::sleep(Duration::from_millis(50));
    stream.write_all(&body.as_bytes()[split..]).unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    assert!(response.contains("downloading"));
    let job = server.scheduler.next(Duration::from_secs(1)).unwrap();
    assert_eq!(job.key(), "ñandú.pdf");
}

#[test]
fn test_end_to_end_with_worker() {
    let server = start_server();
    let worker = Worker::new(
        server.scheduler.clone(),
        server.store.clone(),
        Box::new(FixedExtractor("a document long enough to be summarized")),
        Box::new(FixedSummarizer("# Title\n\nBody")),
        WorkerConfig {
            poll_interval: Duration::from_millis(50),
            min_text_len: 10,
        },
    );
    worker.spawn().unwrap();

    let first = send_json(server.addr, REPORT).unwrap();
    assert_eq!(body_json(&first), serde_json::json!({ "downloading": true }));

    // Esperar a que el worker escriba el resumen
    let deadline = Instant::now() + Duration::from_secs(5);
    while !server.store.has_artifact("report.pdf") {
        assert!(Instant::now() < deadline, "worker never wrote the summary");
        thread::sleep(Duration::from_millis(20));
    }

    let second = send_json(server.addr, REPORT).unwrap();
    assert_eq!(
        body_json(&second),
        serde_json::json!({ "summary": "<h1>Title</h1><p>Body</p>" })
    );
}

#[test]
fn test_end_to_end_short_text_reports_error() {
    let server = start_server();
    let worker = Worker::new(
        server.scheduler.clone(),
        server.store.clone(),
        Box::new(FixedExtractor("tiny")),
        Box::new(FixedSummarizer("unused")),
        WorkerConfig {
            poll_interval: Duration::from_millis(50),
            min_text_len: 10,
        },
    );
    worker.spawn().unwrap();

    send_json(server.addr, REPORT).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !server.store.has_error("report.pdf") {
        assert!(Instant::now() < deadline, "worker never wrote the error");
        thread::sleep(Duration::from_millis(20));
    }

    let response = send_json(server.addr, REPORT).unwrap();
    let body = body_json(&response);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("text-extraction too short. Corrupt file?"));
    assert!(message.ends_with("Extracted: tiny"));
}
