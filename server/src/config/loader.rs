//! Settings loader for the pipegen service
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. JSON file: `--config <file|dir>` or `./pipegen.json`
//! 3. Process environment (after `.env` has been loaded by the binary)
//! 4. Command-line flag overrides
//!
//! String values in the file may use `env:VAR_NAME` to read a secret from
//! the environment instead of storing it inline.

use anyhow::{anyhow, Context, Result};
use pipegen_core::config::ModelParams;
use pipegen_core::error::ConfigError;
use pipegen_core::llm::providers::openai::DEFAULT_BASE_URL;
use pipegen_core::{AgentConfig, ResolvedLlmConfig, ServerEndpoint};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pipegen.json";

/// Tool server binary looked up on `PATH` when `MCP_SERVER_PATH` is unset
const DEFAULT_SERVER_BINARY: &str = "harness-mcp-server";

/// Flat settings, named after their environment variables (lowercased)
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub harness_account_id: Option<String>,
    pub harness_api_key: Option<String>,
    pub harness_api_url: String,
    pub mcp_server_path: Option<String>,
    pub harness_default_org_id: Option<String>,
    pub harness_default_project_id: Option<String>,
    pub api_host: String,
    pub api_port: u16,
    /// Per tool call bound in seconds; 0 disables it
    pub tool_call_timeout_secs: u64,
    pub agent_max_steps: usize,
}

impl Settings {
    /// Check required values are present
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("HARNESS_ACCOUNT_ID", &self.harness_account_id),
            ("HARNESS_API_KEY", &self.harness_api_key),
            ("HARNESS_DEFAULT_ORG_ID", &self.harness_default_org_id),
            ("HARNESS_DEFAULT_PROJECT_ID", &self.harness_default_project_id),
        ];
        for (field, value) in required {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                }
                .into());
            }
        }
        if self.agent_max_steps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "AGENT_MAX_STEPS".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// How to launch the tool server
    pub fn server_endpoint(&self) -> Result<ServerEndpoint> {
        let executable = resolve_executable(self.mcp_server_path.as_deref())?;
        let endpoint = ServerEndpoint::new(executable)
            .with_arg("stdio")
            .with_env("HARNESS_ACCOUNT_ID", required(&self.harness_account_id))
            .with_env("HARNESS_API_KEY", required(&self.harness_api_key))
            .with_env("HARNESS_API_URL", self.harness_api_url.clone())
            .with_env("HARNESS_DEFAULT_ORG_ID", required(&self.harness_default_org_id))
            .with_env(
                "HARNESS_DEFAULT_PROJECT_ID",
                required(&self.harness_default_project_id),
            );
        endpoint.validate()?;
        Ok(endpoint)
    }

    pub fn llm_config(&self) -> Result<ResolvedLlmConfig> {
        let config = ResolvedLlmConfig::new(
            self.openai_base_url.clone(),
            required(&self.openai_api_key),
            self.openai_model.clone(),
        )
        .with_params(ModelParams {
            temperature: Some(0.0),
            ..Default::default()
        });
        config
            .validate()
            .map_err(|e| anyhow!("LLM configuration validation failed: {}", e))?;
        Ok(config)
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig::default().with_max_steps(self.agent_max_steps)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        (self.tool_call_timeout_secs > 0)
            .then(|| Duration::from_secs(self.tool_call_timeout_secs))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn required(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Builder for [`Settings`] with command-line overrides
#[derive(Debug, Default)]
pub struct SettingsLoader {
    config_override: Option<PathBuf>,
    env_source: Option<HashMap<String, String>>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    host_override: Option<String>,
    port_override: Option<u16>,
    model_override: Option<String>,
    server_path_override: Option<String>,
    max_steps_override: Option<usize>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Read variables from this map instead of the process environment
    pub fn with_env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    pub fn with_host_override(mut self, host: String) -> Self {
        self.host_override = Some(host);
        self
    }

    pub fn with_port_override(mut self, port: u16) -> Self {
        self.port_override = Some(port);
        self
    }

    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    pub fn with_server_path_override(mut self, path: String) -> Self {
        self.server_path_override = Some(path);
        self
    }

    pub fn with_max_steps_override(mut self, max_steps: usize) -> Self {
        self.max_steps_override = Some(max_steps);
        self
    }

    /// Load, merge and validate settings
    pub fn load(&self) -> Result<Settings> {
        let mut builder = config::Config::builder()
            .set_default("openai_base_url", DEFAULT_BASE_URL)?
            .set_default("openai_model", "gpt-4")?
            .set_default("harness_api_url", "https://app.harness.io")?
            .set_default("api_host", "0.0.0.0")?
            .set_default("api_port", 8000_i64)?
            .set_default("tool_call_timeout_secs", 120_i64)?
            .set_default("agent_max_steps", 15_i64)?;

        if let Some(path) = self.config_file()? {
            tracing::info!("Loading settings from {}", path.display());
            let file_values = self.load_file(&path)?;
            builder = builder.add_source(
                config::File::from_str(&file_values.to_string(), config::FileFormat::Json),
            );
        }

        builder = builder.add_source(
            config::Environment::default()
                .try_parsing(true)
                .source(self.env_source.clone()),
        );

        if let Some(api_key) = &self.api_key_override {
            builder = builder.set_override("openai_api_key", api_key.as_str())?;
        }
        if let Some(base_url) = &self.base_url_override {
            builder = builder.set_override("openai_base_url", base_url.as_str())?;
        }
        if let Some(host) = &self.host_override {
            builder = builder.set_override("api_host", host.as_str())?;
        }
        if let Some(port) = self.port_override {
            builder = builder.set_override("api_port", i64::from(port))?;
        }
        if let Some(model) = &self.model_override {
            builder = builder.set_override("openai_model", model.as_str())?;
        }
        if let Some(path) = &self.server_path_override {
            builder = builder.set_override("mcp_server_path", path.as_str())?;
        }
        if let Some(max_steps) = self.max_steps_override {
            builder = builder.set_override("agent_max_steps", max_steps as i64)?;
        }

        let settings: Settings = builder
            .build()
            .context("Failed to assemble settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Pick the config file, if any
    fn config_file(&self) -> Result<Option<PathBuf>> {
        match &self.config_override {
            Some(path) => {
                let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
                if path.is_file() {
                    Ok(Some(path))
                } else if path.is_dir() {
                    let file = path.join(DEFAULT_CONFIG_FILE);
                    if file.is_file() {
                        Ok(Some(file))
                    } else {
                        Err(anyhow!(
                            "No {} found in directory: {}",
                            DEFAULT_CONFIG_FILE,
                            path.display()
                        ))
                    }
                } else {
                    Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    }
                    .into())
                }
            }
            None => {
                let local = std::env::current_dir()?.join(DEFAULT_CONFIG_FILE);
                Ok(local.is_file().then_some(local))
            }
        }
    }

    /// Read a JSON settings file, resolving `env:` references
    fn load_file(&self, path: &Path) -> Result<serde_json::Value> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut values: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        for (key, value) in values.iter_mut() {
            if let Some(var_name) = value.as_str().and_then(|s| s.strip_prefix("env:")) {
                let resolved = self.lookup_env(var_name).with_context(|| {
                    format!("Environment variable not found: {} (for {})", var_name, key)
                })?;
                *value = serde_json::Value::String(resolved);
            }
        }

        // Keys are matched case-insensitively, like environment variables
        Ok(serde_json::Value::Object(
            values
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        ))
    }

    fn lookup_env(&self, name: &str) -> Option<String> {
        match &self.env_source {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}

/// Resolve the tool server executable path
fn resolve_executable(configured: Option<&str>) -> Result<String> {
    match configured.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => {
            let expanded = shellexpand::tilde(path).into_owned();
            if expanded.contains('/') {
                Ok(expanded)
            } else {
                Ok(which::which(&expanded)
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or(expanded))
            }
        }
        None => which::which(DEFAULT_SERVER_BINARY)
            .map(|p| p.to_string_lossy().into_owned())
            .map_err(|_| {
                anyhow::Error::from(ConfigError::MissingField {
                    field: format!(
                        "MCP_SERVER_PATH ({} was not found on PATH)",
                        DEFAULT_SERVER_BINARY
                    ),
                })
            }),
    }
}
