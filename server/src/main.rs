//! # pipegen
//!
//! Command-line entry point for the pipegen service.
//!
//! ## Usage
//!
//! - `pipegen` - Start the HTTP API
//! - `pipegen tools` - List the tools the agent can call
//!
//! Settings come from `.env`, the process environment, an optional
//! `pipegen.json` and the flags below.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pipegen_server::config::SettingsLoader;
use std::path::PathBuf;

mod commands;

use commands::{serve_command, tools_command};

/// pipegen - CI/CD pipeline and connector YAML from natural language
#[derive(Parser)]
#[command(name = "pipegen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generates CI/CD pipeline and connector YAML with an LLM and an MCP tool server")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, env = "PIPEGEN_CONFIG")]
    config: Option<PathBuf>,

    /// OpenAI API key override
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(long)]
    port: Option<u16>,

    /// Tool server executable
    #[arg(long)]
    mcp_server_path: Option<String>,

    /// Maximum number of agent steps per request
    #[arg(long)]
    max_steps: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve,

    /// Show available tools
    Tools,
}

/// Build a settings loader from CLI arguments
fn build_settings_loader(cli: &Cli) -> SettingsLoader {
    let mut loader = SettingsLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(host) = &cli.host {
        loader = loader.with_host_override(host.clone());
    }

    if let Some(port) = cli.port {
        loader = loader.with_port_override(port);
    }

    if let Some(path) = &cli.mcp_server_path {
        loader = loader.with_server_path_override(path.clone());
    }

    if let Some(max_steps) = cli.max_steps {
        loader = loader.with_max_steps_override(max_steps);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before settings are read
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let loader = build_settings_loader(&cli);

    match cli.command {
        None | Some(Commands::Serve) => serve_command(loader).await,
        Some(Commands::Tools) => tools_command(loader).await,
    }
}
