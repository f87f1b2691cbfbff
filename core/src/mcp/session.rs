//! Newline-delimited JSON-RPC session over a pair of byte streams

use super::protocol::{self, IncomingMessage, MessageKind};
use crate::error::{ConnectionError, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// One client-side JSON-RPC session.
///
/// Requests are strictly sequential: the session writes one request and
/// reads until the matching response arrives. Notifications and stale
/// responses seen in between are skipped; server requests are answered
/// inline (`ping` with an empty result, anything else with method-not-found).
pub struct McpSession {
    reader: BufReader<BoxedReader>,
    writer: BoxedWriter,
    /// Bytes of the line being read; kept across cancelled reads
    line: Vec<u8>,
    next_id: u64,
}

impl McpSession {
    pub fn new(reader: BoxedReader, writer: BoxedWriter) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            line: Vec::new(),
            next_id: 1,
        }
    }

    /// Send a request and wait for its result
    pub async fn request(&mut self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        debug!("-> {} (id {})", method, id);
        self.write_message(&protocol::request(id, method, params))
            .await?;

        loop {
            let message = self.read_message().await?;
            match message.kind() {
                MessageKind::Response if message.has_id(id) => {
                    if let Some(error) = message.error {
                        debug!("<- {} (id {}) error {}", method, id, error.code);
                        return Err(ConnectionError::Rpc {
                            code: error.code,
                            message: error.message,
                        }
                        .into());
                    }
                    debug!("<- {} (id {})", method, id);
                    return Ok(message.result.unwrap_or(Value::Null));
                }
                MessageKind::Response => {
                    debug!("Skipping stale response {:?}", message.id);
                }
                MessageKind::Request => self.answer_server_request(message).await?,
                MessageKind::Notification => {
                    debug!(
                        "Server notification: {}",
                        message.method.as_deref().unwrap_or_default()
                    );
                }
                MessageKind::Invalid => {
                    warn!("Ignoring message without id or method");
                }
            }
        }
    }

    /// Send a notification (no response expected)
    pub async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<()> {
        debug!("-> {} (notification)", method);
        self.write_message(&protocol::notification(method, params))
            .await
    }

    /// Close our end of the stream so the server sees EOF
    pub async fn close(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    async fn answer_server_request(&mut self, message: IncomingMessage) -> Result<()> {
        let id = message.id.unwrap_or(Value::Null);
        let method = message.method.unwrap_or_default();
        let reply = if method == "ping" {
            protocol::response(id, json!({}))
        } else {
            debug!("Rejecting server request '{}'", method);
            protocol::error_response(
                id,
                protocol::METHOD_NOT_FOUND,
                &format!("Method not found: {}", method),
            )
        };
        self.write_message(&reply).await
    }

    async fn write_message(&mut self, message: &Value) -> Result<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_message(&mut self) -> Result<IncomingMessage> {
        loop {
            let read = self.reader.read_until(b'\n', &mut self.line).await?;
            if read == 0 && self.line.is_empty() {
                return Err(ConnectionError::ServerClosed.into());
            }
            let raw = std::mem::take(&mut self.line);

            let Ok(text) = std::str::from_utf8(&raw) else {
                warn!(
                    "Ignoring non UTF-8 line from tool server: {}",
                    String::from_utf8_lossy(&raw).trim_end()
                );
                continue;
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<IncomingMessage>(text) {
                Ok(message) => return Ok(message),
                Err(e) => warn!("Ignoring non JSON-RPC line from tool server: {}", e),
            }
        }
    }
}
