//! HTTP surface of the pipegen service

mod handlers;

use axum::routing::{get, post};
use axum::Router;
use pipegen_core::{PipelineAgent, ToolRegistry, ToolServer};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::{AgentResponse, GenerateRequest, HealthResponse, ToolsResponse};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    server: Arc<dyn ToolServer>,
    registry: Arc<ToolRegistry>,
    agent: Option<Arc<PipelineAgent>>,
}

impl AppState {
    pub fn new(server: Arc<dyn ToolServer>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            server,
            registry,
            agent: None,
        }
    }

    pub fn with_agent(mut self, agent: Arc<PipelineAgent>) -> Self {
        self.agent = Some(agent);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/generate/pipeline",
            post(handlers::generate_pipeline),
        )
        .route(
            "/api/v1/generate/connector",
            post(handlers::generate_connector),
        )
        .route("/api/v1/query", post(handlers::process_query))
        .route("/api/v1/debug/tools", get(handlers::list_tools))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("pipegen listening on http://{addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
