//! HTTP service command

use anyhow::{Context, Result};
use pipegen_core::{ConnectOptions, PipelineAgent, ToolRegistry, ToolServer, ToolServerConnection};
use pipegen_server::config::SettingsLoader;
use pipegen_server::http::{self, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Start the tool server and the agent, then serve HTTP until interrupted
pub async fn serve_command(loader: SettingsLoader) -> Result<()> {
    info!("Starting Harness Pipeline Agent API...");
    let settings = loader.load()?;
    let endpoint = settings.server_endpoint()?;
    let llm_config = settings.llm_config()?;

    let connection = Arc::new(ToolServerConnection::new(ConnectOptions::default()));
    connection
        .connect(&endpoint)
        .await
        .with_context(|| format!("Failed to connect to tool server {}", endpoint.executable))?;
    info!("Discovered {} tools", connection.list_tools().len());

    let server: Arc<dyn ToolServer> = connection.clone();
    let registry = Arc::new(ToolRegistry::for_server(
        server.clone(),
        settings.call_timeout(),
    ));
    let agent = match PipelineAgent::with_llm_config(
        settings.agent_config(),
        &llm_config,
        registry.clone(),
    ) {
        Ok(agent) => agent,
        Err(e) => {
            error!("Failed to initialize agent: {}", e);
            connection.disconnect().await;
            return Err(e.into());
        }
    };
    info!(
        "Agent initialized with {} tools on model {}",
        registry.len(),
        agent.model_name()
    );

    let state = AppState::new(server, registry).with_agent(Arc::new(agent));
    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    let served = http::serve(listener, state, shutdown_signal()).await;

    info!("Shutting down Harness Pipeline Agent API...");
    connection.disconnect().await;
    info!("Agent cleanup completed");
    served.context("HTTP server error")
}

/// Resolves on SIGINT or SIGTERM (Ctrl+C elsewhere)
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut interrupt, mut terminate) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(interrupt), Ok(terminate)) => (interrupt, terminate),
            _ => {
                let _ = tokio::signal::ctrl_c().await;
                info!("Caught CTRL+C");
                return;
            }
        };
        tokio::select! {
            _ = interrupt.recv() => info!("Caught SIGINT"),
            _ = terminate.recv() => info!("Caught SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Caught CTRL+C");
        }
    }
}
