//! JSON-RPC message shapes used on the tool server's stdio

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// MCP protocol revision announced during `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC "method not found"
pub const METHOD_NOT_FOUND: i64 = -32601;

/// A tool as advertised by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,

    /// Human readable description (empty when the server sends none)
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// JSON schema of the accepted arguments
    #[serde(
        rename = "inputSchema",
        default = "empty_object_schema",
        deserialize_with = "null_as_empty_schema"
    )]
    pub input_schema: Value,
}

fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_schema<'de, D>(deserializer: D) -> std::result::Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .filter(|schema| !schema.is_null())
        .unwrap_or_else(empty_object_schema))
}

/// Result payload of `tools/list`
#[derive(Debug, Clone, Deserialize)]
pub struct ListToolsResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<ToolDescriptor>,

    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<String>,
}

/// Error object of a JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Any line the server may write
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// What an incoming line turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Reply to one of our requests
    Response,
    /// Server-initiated request expecting a reply
    Request,
    /// Server-initiated notification
    Notification,
    /// Neither id nor method
    Invalid,
}

impl IncomingMessage {
    pub fn kind(&self) -> MessageKind {
        match (&self.id, &self.method) {
            (Some(_), Some(_)) => MessageKind::Request,
            (None, Some(_)) => MessageKind::Notification,
            (Some(_), None) => MessageKind::Response,
            (None, None) => MessageKind::Invalid,
        }
    }

    /// Whether this message carries the given numeric request id
    pub fn has_id(&self, expected: u64) -> bool {
        match &self.id {
            Some(Value::Number(n)) => n.as_u64() == Some(expected),
            Some(Value::String(s)) => s.parse::<u64>().ok() == Some(expected),
            _ => false,
        }
    }
}

/// Build a JSON-RPC request envelope
pub fn request(id: u64, method: &str, params: Option<Value>) -> Value {
    let mut message = json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "method": method,
    });
    if let Some(params) = params {
        message["params"] = params;
    }
    message
}

/// Build a JSON-RPC notification envelope
pub fn notification(method: &str, params: Option<Value>) -> Value {
    let mut message = json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": method,
    });
    if let Some(params) = params {
        message["params"] = params;
    }
    message
}

/// Build a successful reply to a server-initiated request
pub fn response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result,
    })
}

/// Build an error reply to a server-initiated request
pub fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": {"code": code, "message": message},
    })
}

/// Parameters of the `initialize` request
pub fn initialize_params(client_name: &str, client_version: &str) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {
            "name": client_name,
            "version": client_version,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_descriptor_fields_fall_back_to_defaults() {
        let page: ListToolsResult = serde_json::from_value(json!({
            "tools": [
                {"name": "list_pipelines", "description": null, "inputSchema": null},
                {"name": "get_connector"}
            ],
            "nextCursor": null
        }))
        .unwrap();

        assert_eq!(page.tools.len(), 2);
        for tool in &page.tools {
            assert_eq!(tool.description, "");
            assert_eq!(tool.input_schema, json!({"type": "object", "properties": {}}));
        }
        assert!(page.next_cursor.is_none());

        let empty: ListToolsResult = serde_json::from_value(json!({"tools": null})).unwrap();
        assert!(empty.tools.is_empty());
    }

    #[test]
    fn test_message_classification() {
        let response: IncomingMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"result":{}}"#).unwrap();
        assert_eq!(response.kind(), MessageKind::Response);
        assert!(response.has_id(3));
        assert!(!response.has_id(4));

        let request: IncomingMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"9","method":"ping"}"#).unwrap();
        assert_eq!(request.kind(), MessageKind::Request);
        assert!(request.has_id(9));

        let notification: IncomingMessage = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"notifications/message","params":{}}"#,
        )
        .unwrap();
        assert_eq!(notification.kind(), MessageKind::Notification);
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor: ToolDescriptor =
            serde_json::from_str(r#"{"name":"list_pipelines"}"#).unwrap();
        assert_eq!(descriptor.name, "list_pipelines");
        assert!(descriptor.description.is_empty());
        assert_eq!(descriptor.input_schema["type"], "object");
    }

    #[test]
    fn test_request_omits_missing_params() {
        let message = request(1, "tools/list", None);
        assert!(message.get("params").is_none());
        assert_eq!(message["id"], 1);

        let message = request(2, "tools/call", Some(json!({"name": "x"})));
        assert_eq!(message["params"]["name"], "x");
    }
}
