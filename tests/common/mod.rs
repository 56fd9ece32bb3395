//! Shared helpers for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use course_catalog::catalog::{CatalogStore, Course, JsonFileStore};
use course_catalog::config::ServerConfig;
use course_catalog::http::{HandlebarsRenderer, HttpServer};
use course_catalog::lifecycle::{Services, Shutdown};
use course_catalog::observability::{LogEmitter, MemorySink, Observability, Tracer};
use opentelemetry::trace::{Event, Status};
use opentelemetry::Value;
use opentelemetry_sdk::trace::{InMemorySpanExporter, InMemorySpanExporterBuilder, SdkTracerProvider, SpanData};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A running server with in-memory log and span capture.
pub struct TestApp {
    pub addr: SocketAddr,
    pub spans: SpanCapture,
    pub logs: MemorySink,
    pub catalog_path: PathBuf,
    pub services: Services,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.catalog_path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Start a server on an ephemeral port, seeded with `courses`.
pub async fn spawn_app(courses: Vec<Course>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("course_catalog.json");
    let store = Arc::new(JsonFileStore::new(&catalog_path));
    for course in courses {
        store.append_course(course).unwrap();
    }

    let spans = SpanCapture::new();
    let logs = MemorySink::new();
    let observability = Arc::new(Observability::new(
        spans.tracer(),
        LogEmitter::new(vec![Box::new(logs.clone())]),
        store.clone(),
    ));
    let services = Services::from_parts(store, observability);

    let renderer = Arc::new(HandlebarsRenderer::new().unwrap());
    let server = HttpServer::new(&ServerConfig::default(), services.catalog.clone(), renderer);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestApp {
        addr,
        spans,
        logs,
        catalog_path,
        services,
        shutdown,
        _dir: dir,
    }
}

/// Finished spans, exported as soon as each one ends.
#[derive(Clone)]
pub struct SpanCapture {
    exporter: InMemorySpanExporter,
}

impl SpanCapture {
    fn new() -> Self {
        Self {
            exporter: InMemorySpanExporterBuilder::new()
                .keep_records_on_shutdown()
                .build(),
        }
    }

    fn tracer(&self) -> Tracer {
        Tracer::new(
            SdkTracerProvider::builder()
                .with_simple_exporter(self.exporter.clone())
                .build(),
        )
    }

    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }

    pub fn spans_named(&self, name: &str) -> Vec<SpanData> {
        self.finished_spans()
            .into_iter()
            .filter(|s| s.name == name)
            .collect()
    }
}

pub trait SpanDataExt {
    fn attribute(&self, key: &str) -> Option<&Value>;
    fn event(&self, name: &str) -> Option<&Event>;
    fn is_error(&self) -> bool;
}

impl SpanDataExt for SpanData {
    fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .rev()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }

    fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    fn is_error(&self) -> bool {
        matches!(self.status, Status::Error { .. })
    }
}

/// HTTP client that leaves redirects for the test to inspect.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

pub fn course(code: &str, name: &str) -> Course {
    Course {
        code: code.into(),
        name: name.into(),
        instructor: "Dr. X".into(),
        semester: "Fall".into(),
        schedule: "MWF 9:00".into(),
        classroom: "B12".into(),
        prerequisites: "None".into(),
        grading: "A-F".into(),
        description: String::new(),
    }
}
