//! Subprocess-backed tool server connection

use super::catalog::ToolCatalog;
use super::protocol::{self, ListToolsResult, ToolDescriptor};
use super::server::ToolServer;
use super::session::{BoxedReader, BoxedWriter, McpSession};
use crate::config::ServerEndpoint;
use crate::error::{ConnectionError, Error, Result, ToolError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::process::Stdio;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Lifecycle of a [`ToolServerConnection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Ready,
    Closing,
}

/// Time bounds for connecting and tearing down
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub handshake_timeout: Duration,
    pub discovery_timeout: Duration,
    /// Bound for each teardown phase (session close, child exit)
    pub close_timeout: Duration,
    pub client_name: String,
    pub client_version: String,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(30),
            discovery_timeout: Duration::from_secs(10),
            close_timeout: Duration::from_secs(5),
            client_name: "pipegen".to_string(),
            client_version: crate::VERSION.to_string(),
        }
    }
}

impl ConnectOptions {
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }
}

struct Snapshot {
    state: ConnectionState,
    catalog: Arc<ToolCatalog>,
}

#[derive(Default)]
struct Live {
    session: Option<McpSession>,
    child: Option<Child>,
}

/// Owns one tool server subprocess and its JSON-RPC session.
///
/// Catalog lookups never touch the subprocess. Tool calls are serialized
/// over the single session.
pub struct ToolServerConnection {
    options: ConnectOptions,
    snapshot: RwLock<Snapshot>,
    live: Mutex<Live>,
}

impl Default for ToolServerConnection {
    fn default() -> Self {
        Self::new(ConnectOptions::default())
    }
}

impl ToolServerConnection {
    pub fn new(options: ConnectOptions) -> Self {
        Self {
            options,
            snapshot: RwLock::new(Snapshot {
                state: ConnectionState::Disconnected,
                catalog: Arc::new(ToolCatalog::default()),
            }),
            live: Mutex::new(Live::default()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.read_snapshot(|s| s.state)
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// Names of discovered tools, in server order
    pub fn list_tools(&self) -> Vec<String> {
        self.read_snapshot(|s| s.catalog.names())
    }

    pub fn get_schema(&self, name: &str) -> Option<ToolDescriptor> {
        self.read_snapshot(|s| s.catalog.get(name).cloned())
    }

    /// Spawn the server, perform the handshake and discover its tools
    pub async fn connect(&self, endpoint: &ServerEndpoint) -> Result<()> {
        endpoint.validate()?;
        self.begin_connecting()?;
        info!(
            "Starting tool server: {} {}",
            endpoint.executable,
            endpoint.args.join(" ")
        );

        let (child, stdin, stdout) = match spawn_server(endpoint) {
            Ok(parts) => parts,
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                return Err(e);
            }
        };
        self.live.lock().await.child = Some(child);

        self.establish(Box::new(stdout), Box::new(stdin)).await
    }

    /// Connect over already-open streams instead of a subprocess
    pub async fn connect_with_streams<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.begin_connecting()?;
        self.establish(Box::new(reader), Box::new(writer)).await
    }

    /// Invoke a discovered tool. Returns the raw `tools/call` result, `None`
    /// when the server returned null.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Option<Value>> {
        let catalog = self.ready_catalog()?;
        if !catalog.contains(name) {
            return Err(ConnectionError::UnknownTool {
                name: name.to_string(),
                available: catalog.names(),
            }
            .into());
        }

        let mut live = self.live.lock().await;
        if !self.is_ready() {
            return Err(ConnectionError::NotConnected.into());
        }
        let session = live.session.as_mut().ok_or(ConnectionError::NotConnected)?;

        debug!("Calling tool {} with {}", name, arguments);
        let params = json!({"name": name, "arguments": arguments});
        match session.request("tools/call", Some(params)).await {
            Ok(Value::Null) => Ok(None),
            Ok(result) => Ok(Some(result)),
            Err(Error::Connection(ConnectionError::Rpc { code, message })) => {
                Err(ToolError::ExecutionFailed {
                    name: name.to_string(),
                    message: format!("{} (code {})", message, code),
                }
                .into())
            }
            Err(e) if e.is_fatal_connection_error() => {
                error!("Tool server connection lost during '{}': {}", name, e);
                self.set_state(ConnectionState::Disconnected);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Close the session and reap the subprocess. Safe to call repeatedly.
    pub async fn disconnect(&self) {
        let bound = self.options.close_timeout;
        self.set_state(ConnectionState::Closing);

        let mut live = match tokio::time::timeout(bound, self.live.lock()).await {
            Ok(live) => live,
            Err(_) => {
                warn!("Tool call still in flight after {:?}; abandoning teardown", bound);
                self.reset();
                return;
            }
        };

        if let Some(mut session) = live.session.take() {
            match tokio::time::timeout(bound, session.close()).await {
                Ok(Ok(())) => debug!("Tool server session closed"),
                Ok(Err(e)) => warn!("Error closing tool server session: {}", e),
                Err(_) => warn!("Closing tool server session timed out after {:?}", bound),
            }
        }

        if let Some(mut child) = live.child.take() {
            match tokio::time::timeout(bound, child.wait()).await {
                Ok(Ok(status)) => info!("Tool server exited with {}", status),
                Ok(Err(e)) => warn!("Error waiting for tool server: {}", e),
                Err(_) => {
                    warn!("Tool server did not exit within {:?}; killing it", bound);
                    if let Err(e) = child.start_kill() {
                        warn!("Failed to kill tool server: {}", e);
                    } else if tokio::time::timeout(bound, child.wait()).await.is_err() {
                        error!("Tool server still running after kill");
                    }
                }
            }
        }

        drop(live);
        self.reset();
    }

    async fn establish(&self, reader: BoxedReader, writer: BoxedWriter) -> Result<()> {
        let mut session = McpSession::new(reader, writer);

        let outcome = match self.handshake(&mut session).await {
            Ok(()) => self.discover(&mut session).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(catalog) => {
                info!(
                    "Tool server ready with {} tools: {:?}",
                    catalog.len(),
                    catalog.names()
                );
                self.live.lock().await.session = Some(session);
                self.write_snapshot(|s| {
                    s.state = ConnectionState::Ready;
                    s.catalog = Arc::new(catalog);
                });
                Ok(())
            }
            Err(e) => {
                error!("Failed to connect to tool server: {}", e);
                self.live.lock().await.session = Some(session);
                self.disconnect().await;
                Err(e)
            }
        }
    }

    async fn handshake(&self, session: &mut McpSession) -> Result<()> {
        let bound = self.options.handshake_timeout;
        let params =
            protocol::initialize_params(&self.options.client_name, &self.options.client_version);

        let result = tokio::time::timeout(bound, session.request("initialize", Some(params)))
            .await
            .map_err(|_| ConnectionError::HandshakeTimeout { timeout: bound })??;

        if let Some(version) = result.get("protocolVersion").and_then(Value::as_str) {
            if version != protocol::PROTOCOL_VERSION {
                debug!("Tool server speaks protocol {}", version);
            }
        }
        if let Some(server) = result.get("serverInfo") {
            debug!("Tool server info: {}", server);
        }

        session.notify("notifications/initialized", None).await
    }

    async fn discover(&self, session: &mut McpSession) -> Result<ToolCatalog> {
        let bound = self.options.discovery_timeout;
        let descriptors = tokio::time::timeout(bound, list_all_tools(session))
            .await
            .map_err(|_| ConnectionError::DiscoveryTimeout { timeout: bound })??;
        Ok(ToolCatalog::from_descriptors(descriptors))
    }

    fn begin_connecting(&self) -> Result<()> {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        if snapshot.state != ConnectionState::Disconnected {
            return Err(ConnectionError::Protocol {
                message: format!("cannot connect while {:?}", snapshot.state),
            }
            .into());
        }
        snapshot.state = ConnectionState::Connecting;
        Ok(())
    }

    fn ready_catalog(&self) -> Result<Arc<ToolCatalog>> {
        self.read_snapshot(|s| match s.state {
            ConnectionState::Ready => Ok(s.catalog.clone()),
            _ => Err(ConnectionError::NotConnected.into()),
        })
    }

    fn reset(&self) {
        self.write_snapshot(|s| {
            s.state = ConnectionState::Disconnected;
            s.catalog = Arc::new(ToolCatalog::default());
        });
    }

    fn set_state(&self, state: ConnectionState) {
        self.write_snapshot(|s| s.state = state);
    }

    fn read_snapshot<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        f(&snapshot)
    }

    fn write_snapshot(&self, f: impl FnOnce(&mut Snapshot)) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut snapshot)
    }
}

#[async_trait]
impl ToolServer for ToolServerConnection {
    fn list_tools(&self) -> Vec<String> {
        ToolServerConnection::list_tools(self)
    }

    fn get_schema(&self, name: &str) -> Option<ToolDescriptor> {
        ToolServerConnection::get_schema(self, name)
    }

    fn is_ready(&self) -> bool {
        ToolServerConnection::is_ready(self)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Option<Value>> {
        ToolServerConnection::call_tool(self, name, arguments).await
    }

    async fn disconnect(&self) {
        ToolServerConnection::disconnect(self).await
    }
}

async fn list_all_tools(session: &mut McpSession) -> Result<Vec<ToolDescriptor>> {
    let mut tools = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let params = cursor.as_ref().map(|c| json!({"cursor": c}));
        let result = session.request("tools/list", params).await?;
        let page: ListToolsResult =
            serde_json::from_value(result).map_err(|e| ConnectionError::Protocol {
                message: format!("invalid tools/list result: {}", e),
            })?;
        tools.extend(page.tools);
        match page.next_cursor {
            Some(next) if !next.is_empty() && cursor.as_deref() != Some(next.as_str()) => {
                cursor = Some(next)
            }
            _ => return Ok(tools),
        }
    }
}

fn spawn_server(
    endpoint: &ServerEndpoint,
) -> Result<(Child, tokio::process::ChildStdin, tokio::process::ChildStdout)> {
    let mut child = Command::new(&endpoint.executable)
        .args(&endpoint.args)
        .envs(&endpoint.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ConnectionError::ProcessSpawn {
            executable: endpoint.executable.clone(),
            message: e.to_string(),
        })?;

    let missing = |stream: &str| ConnectionError::ProcessSpawn {
        executable: endpoint.executable.clone(),
        message: format!("{} was not captured", stream),
    };
    let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
    let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(drain_stderr(stderr));
    }

    debug!("Tool server spawned with pid {:?}", child.id());
    Ok((child, stdin, stdout))
}

async fn drain_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "pipegen::tool_server", "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, split, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

    #[derive(Clone, Copy)]
    enum Behavior {
        Normal,
        Silent,
        Paginated,
        /// Answers `initialize` but never `tools/list`
        SilentDiscovery,
        /// Writes a non UTF-8 log line before every tool result
        Noisy,
        /// Sends `null` description and schema fields
        NullFields,
    }

    fn fast_options() -> ConnectOptions {
        ConnectOptions::default()
            .with_handshake_timeout(Duration::from_millis(200))
            .with_discovery_timeout(Duration::from_millis(200))
            .with_close_timeout(Duration::from_millis(200))
    }

    fn tool(name: &str) -> Value {
        json!({
            "name": name,
            "description": format!("{} tool", name),
            "inputSchema": {"type": "object", "properties": {"org_id": {"type": "string"}}}
        })
    }

    async fn run_fake_server(stream: DuplexStream, behavior: Behavior) {
        let (read, mut write) = split(stream);
        let mut lines = BufReader::new(read).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let message: Value = serde_json::from_str(&line).unwrap();
            let Some(id) = message.get("id").cloned() else {
                continue;
            };
            if matches!(behavior, Behavior::Silent) {
                continue;
            }
            let params = &message["params"];
            let method = message["method"].as_str().unwrap_or_default();
            if matches!(behavior, Behavior::SilentDiscovery) && method == "tools/list" {
                continue;
            }
            if matches!(behavior, Behavior::Noisy) && method == "tools/call" {
                if write.write_all(b"warn: caf\xe9 unreachable\n").await.is_err() {
                    return;
                }
            }
            let reply = match method {
                "initialize" => json!({
                    "jsonrpc": "2.0", "id": id,
                    "result": {
                        "protocolVersion": protocol::PROTOCOL_VERSION,
                        "capabilities": {"tools": {}},
                        "serverInfo": {"name": "fake", "version": "0.0.1"}
                    }
                }),
                "tools/list" => match (behavior, params.get("cursor")) {
                    (Behavior::NullFields, _) => json!({
                        "jsonrpc": "2.0", "id": id,
                        "result": {"tools": [
                            {"name": "list_pipelines", "description": null, "inputSchema": null},
                            tool("create_pipeline")
                        ]}
                    }),
                    (Behavior::Paginated, None) => json!({
                        "jsonrpc": "2.0", "id": id,
                        "result": {"tools": [tool("list_pipelines")], "nextCursor": "page-2"}
                    }),
                    _ => json!({
                        "jsonrpc": "2.0", "id": id,
                        "result": {"tools": [tool("create_pipeline"), tool("explode"), tool("crash")]}
                    }),
                },
                "tools/call" => match params["name"].as_str().unwrap_or_default() {
                    "explode" => json!({
                        "jsonrpc": "2.0", "id": id,
                        "error": {"code": -32000, "message": "kaboom"}
                    }),
                    "crash" => return,
                    _ => json!({
                        "jsonrpc": "2.0", "id": id,
                        "result": {"content": [{"type": "text", "text": params["arguments"].to_string()}]}
                    }),
                },
                other => json!({
                    "jsonrpc": "2.0", "id": id,
                    "error": {"code": -32601, "message": format!("unknown {}", other)}
                }),
            };
            let mut out = reply.to_string();
            out.push('\n');
            if write.write_all(out.as_bytes()).await.is_err() {
                return;
            }
        }
    }

    async fn connected(behavior: Behavior) -> Result<ToolServerConnection> {
        let (client, server) = duplex(64 * 1024);
        tokio::spawn(run_fake_server(server, behavior));
        let connection = ToolServerConnection::new(fast_options());
        let (read, write) = split(client);
        connection.connect_with_streams(read, write).await?;
        Ok(connection)
    }

    #[tokio::test]
    async fn test_connect_discovers_tools_in_order() {
        let connection = connected(Behavior::Normal).await.unwrap();
        assert_eq!(connection.state(), ConnectionState::Ready);
        assert_eq!(
            connection.list_tools(),
            vec!["create_pipeline", "explode", "crash"]
        );
        let schema = connection.get_schema("create_pipeline").unwrap();
        assert_eq!(schema.description, "create_pipeline tool");
        assert!(connection.get_schema("missing").is_none());
    }

    #[tokio::test]
    async fn test_discovery_follows_pagination() {
        let connection = connected(Behavior::Paginated).await.unwrap();
        assert_eq!(
            connection.list_tools(),
            vec!["list_pipelines", "create_pipeline", "explode", "crash"]
        );
    }

    #[tokio::test]
    async fn test_call_tool_returns_raw_result() {
        let connection = connected(Behavior::Normal).await.unwrap();
        let result = connection
            .call_tool("create_pipeline", json!({"org_id": "default"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], r#"{"org_id":"default"}"#);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_rejected_without_io() {
        let connection = connected(Behavior::Normal).await.unwrap();
        let err = connection
            .call_tool("delete_everything", json!({}))
            .await
            .unwrap_err();
        match err {
            Error::Connection(ConnectionError::UnknownTool { name, available }) => {
                assert_eq!(name, "delete_everything");
                assert_eq!(available, vec!["create_pipeline", "explode", "crash"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(connection.is_ready());
    }

    #[tokio::test]
    async fn test_server_error_keeps_connection_ready() {
        let connection = connected(Behavior::Normal).await.unwrap();
        let err = connection.call_tool("explode", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("kaboom"));
        assert!(connection.is_ready());

        let ok = connection.call_tool("create_pipeline", json!({})).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn test_server_exit_marks_connection_disconnected() {
        let connection = connected(Behavior::Normal).await.unwrap();
        let err = connection.call_tool("crash", json!({})).await.unwrap_err();
        assert!(err.is_fatal_connection_error());
        assert_eq!(connection.state(), ConnectionState::Disconnected);

        let err = connection
            .call_tool("create_pipeline", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_call_before_connect_fails() {
        let connection = ToolServerConnection::new(fast_options());
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert!(connection.list_tools().is_empty());
        let err = connection
            .call_tool("create_pipeline", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let connection = connected(Behavior::Normal).await.unwrap();
        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Disconnected);

        let err = connection
            .call_tool("create_pipeline", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_silent_server_times_out_handshake() {
        let err = connected(Behavior::Silent).await.err().unwrap();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::HandshakeTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_silent_discovery_times_out() {
        let (client, server) = duplex(64 * 1024);
        tokio::spawn(run_fake_server(server, Behavior::SilentDiscovery));
        let connection = ToolServerConnection::new(fast_options());
        let (read, write) = split(client);

        let err = connection.connect_with_streams(read, write).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::DiscoveryTimeout { .. })
        ));
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert!(connection.list_tools().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_safe() {
        let connection = ToolServerConnection::new(fast_options());
        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_non_utf8_output_keeps_connection_ready() {
        let connection = connected(Behavior::Noisy).await.unwrap();
        let result = connection
            .call_tool("create_pipeline", json!({"org_id": "default"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result["content"][0]["text"], r#"{"org_id":"default"}"#);
        assert!(connection.is_ready());

        assert!(connection.call_tool("create_pipeline", json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_null_descriptor_fields_are_defaulted() {
        let connection = connected(Behavior::NullFields).await.unwrap();
        assert_eq!(connection.list_tools(), vec!["list_pipelines", "create_pipeline"]);

        let schema = connection.get_schema("list_pipelines").unwrap();
        assert_eq!(schema.description, "");
        assert_eq!(schema.input_schema, json!({"type": "object", "properties": {}}));
    }

    #[tokio::test]
    async fn test_second_connect_is_rejected_while_ready() {
        let connection = connected(Behavior::Normal).await.unwrap();
        let (client, _server) = duplex(1024);
        let (read, write) = split(client);
        assert!(connection.connect_with_streams(read, write).await.is_err());
        assert!(connection.is_ready());
    }

    #[tokio::test]
    async fn test_blank_executable_is_a_config_error() {
        let connection = ToolServerConnection::new(fast_options());
        let err = connection
            .connect(&ServerEndpoint::new("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_missing_executable_fails_to_spawn() {
        let connection = ToolServerConnection::new(fast_options());
        let err = connection
            .connect(&ServerEndpoint::new("/nonexistent/pipegen-tool-server"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::ProcessSpawn { .. })
        ));
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unresponsive_subprocess_times_out_and_is_reaped() {
        let connection = ToolServerConnection::new(fast_options());
        let endpoint = ServerEndpoint::new("sh")
            .with_arg("-c")
            .with_arg("cat > /dev/null");
        let err = connection.connect(&endpoint).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::HandshakeTimeout { .. })
        ));
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scripted_subprocess_end_to_end() {
        let script = r#"
read line
echo '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","capabilities":{},"serverInfo":{"name":"sh","version":"0"}}}'
read line
read line
echo '{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"list_pipelines","description":"List pipelines","inputSchema":{"type":"object"}}]}}'
read line
echo "{\"jsonrpc\":\"2.0\",\"id\":3,\"result\":{\"content\":[{\"type\":\"text\",\"text\":\"$PIPEGEN_MARKER\"}]}}"
cat > /dev/null
"#;
        let endpoint = ServerEndpoint::new("sh")
            .with_arg("-c")
            .with_arg(script)
            .with_env("PIPEGEN_MARKER", "from-env");
        let connection = ToolServerConnection::new(fast_options());
        connection.connect(&endpoint).await.unwrap();
        assert_eq!(connection.list_tools(), vec!["list_pipelines"]);

        let result = connection
            .call_tool("list_pipelines", json!({}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result["content"][0]["text"], "from-env");

        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }
}
