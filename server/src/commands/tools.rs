//! Tools listing command

use anyhow::{Context, Result};
use pipegen_core::{ConnectOptions, ToolRegistry, ToolServerConnection};
use pipegen_server::config::SettingsLoader;
use std::sync::Arc;
use tracing::info;

/// Connect to the tool server, print what the agent would see, disconnect
pub async fn tools_command(loader: SettingsLoader) -> Result<()> {
    let settings = loader.load()?;
    let endpoint = settings.server_endpoint()?;

    info!("Listing available tools");
    let connection = Arc::new(ToolServerConnection::new(ConnectOptions::default()));
    connection
        .connect(&endpoint)
        .await
        .with_context(|| format!("Failed to connect to tool server {}", endpoint.executable))?;

    let registry = ToolRegistry::for_server(connection.clone(), settings.call_timeout());
    println!("Available tools ({})\n", registry.len());
    for info in registry.list_adapters() {
        println!("{}", info.name);
        // First line only
        let first_line = info.description.lines().next().unwrap_or_default();
        println!("   {}\n", first_line);
    }

    connection.disconnect().await;
    Ok(())
}
