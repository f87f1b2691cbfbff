use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pipegen_core::error::AgentError;
use pipegen_core::{AgentRun, RequestKind, ToolCallTrace, ToolInfo};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

const SERVICE_NAME: &str = "Harness Pipeline Agent API";

/// Body of the generate and query endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub request: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub success: bool,
    pub output: String,
    pub tool_calls: Vec<ToolCallTrace>,
    pub error: Option<String>,
}

impl From<AgentRun> for AgentResponse {
    fn from(run: AgentRun) -> Self {
        Self {
            success: true,
            output: run.output,
            tool_calls: run.tool_calls,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent_initialized: bool,
    pub mcp_connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolInfo>,
    pub count: usize,
    pub status: String,
}

fn json_error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

pub(super) async fn root() -> impl IntoResponse {
    Json(json!({
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs",
    }))
}

pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let agent_initialized = state.agent.is_some();
    let mcp_connected = state.server.is_ready();
    let status = if agent_initialized && mcp_connected {
        "healthy"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status: status.to_string(),
        agent_initialized,
        mcp_connected,
    })
}

pub(super) async fn generate_pipeline(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Response {
    run_agent(&state, RequestKind::Pipeline, &body.request).await
}

pub(super) async fn generate_connector(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Response {
    run_agent(&state, RequestKind::Connector, &body.request).await
}

pub(super) async fn process_query(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Response {
    run_agent(&state, RequestKind::General, &body.request).await
}

pub(super) async fn list_tools(State(state): State<AppState>) -> Response {
    if state.registry.is_empty() {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Agent not initialized. Tools not available yet.",
        );
    }
    let tools = state.registry.list_adapters();
    Json(ToolsResponse {
        count: tools.len(),
        tools,
        status: "available".to_string(),
    })
    .into_response()
}

async fn run_agent(state: &AppState, kind: RequestKind, request: &str) -> Response {
    info!("Handling {:?} request: {}", kind, preview(request));

    let Some(agent) = state.agent.as_ref() else {
        let err = AgentError::NotInitialized;
        error!("Error handling {:?} request: {}", kind, err);
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string());
    };

    match agent.run(kind, request).await {
        Ok(run) => Json(AgentResponse::from(run)).into_response(),
        Err(e) => {
            error!("Error handling {:?} request: {}", kind, e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// First 100 characters of a request, for logs
fn preview(request: &str) -> String {
    match request.char_indices().nth(100) {
        Some((end, _)) => format!("{}...", &request[..end]),
        None => request.to_string(),
    }
}
