//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all page handlers
//! - Wire up middleware (HTTP trace layer, timeout, request ID)
//! - Serve until shutdown, then drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::catalog::operations::CatalogService;
use crate::config::ServerConfig;
use crate::http::handlers;
use crate::http::render::Renderer;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::signals::shutdown_signal;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub renderer: Arc<dyn Renderer>,
}

/// Requests still running after the configured timeout get a 408.
fn timeout_layer(config: &ServerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_timeout_secs),
    )
}

/// HTTP server for the course catalog.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, catalog: CatalogService, renderer: Arc<dyn Renderer>) -> Self {
        let state = AppState { catalog, renderer };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/catalog", get(handlers::catalog).post(handlers::catalog))
            .route(
                "/add_course",
                get(handlers::add_course_form).post(handlers::add_course),
            )
            .route("/delete_course/{code}", get(handlers::delete_course))
            .route("/course/{code}", get(handlers::course_details))
            .route("/contact", get(handlers::contact))
            .route("/manual-trace", get(handlers::manual_trace))
            .route("/auto-instrumented", get(handlers::auto_instrumented))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(timeout_layer(config))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until Ctrl+C, SIGTERM, or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
