use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::types::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, McpTool, McpToolCall, ServerCapabilities,
    ServerInfo, ToolListResponse, ToolsCapability, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, MCP_PROTOCOL_VERSION, PARSE_ERROR,
};
use crate::error::Result;
use crate::tools::ToolRegistry;

pub const SERVER_NAME: &str = "argochat-tools";

/// Answer newline-delimited JSON-RPC requests until the reader hits EOF.
///
/// Only protocol messages are written to `writer`; diagnostics go through `tracing`.
pub async fn serve<R, W>(registry: &ToolRegistry, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = handle_line(registry, line).await {
            let mut encoded = serde_json::to_string(&response)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
        }
    }

    tracing::info!("input closed, tool host stopping");
    Ok(())
}

/// Handle one line of input. Notifications produce no response.
pub async fn handle_line(registry: &ToolRegistry, line: &str) -> Option<JsonRpcResponse> {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable request line");
            return Some(JsonRpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ));
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(value.clone()) {
        Ok(request) => request,
        Err(e) => {
            let id = value.get("id").cloned().unwrap_or(Value::Null);
            return Some(JsonRpcResponse::failure(
                id,
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            ));
        }
    };

    let Some(id) = request.id else {
        tracing::debug!(method = %request.method, "notification received");
        return None;
    };

    tracing::debug!(method = %request.method, id = %id, "request received");
    let response = match handle_request(registry, &request.method, request.params).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err((code, message)) => JsonRpcResponse::failure(id, code, message),
    };
    Some(response)
}

async fn handle_request(
    registry: &ToolRegistry,
    method: &str,
    params: Option<Value>,
) -> std::result::Result<Value, (i64, String)> {
    match method {
        "initialize" => to_result(InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
        }),
        "ping" => Ok(json!({})),
        "tools/list" => to_result(ToolListResponse {
            tools: registry.descriptors().into_iter().map(McpTool::from).collect(),
        }),
        "tools/call" => {
            let call: McpToolCall = params
                .ok_or_else(|| (INVALID_PARAMS, "Missing params for tools/call".to_string()))
                .and_then(|p| {
                    serde_json::from_value(p)
                        .map_err(|e| (INVALID_PARAMS, format!("Invalid params: {}", e)))
                })?;
            let arguments = if call.arguments.is_null() {
                json!({})
            } else {
                call.arguments
            };
            let output = registry.dispatch(&call.name, &arguments).await;
            to_result(output)
        }
        other => Err((METHOD_NOT_FOUND, format!("Method not found: {}", other))),
    }
}

fn to_result<T: serde::Serialize>(value: T) -> std::result::Result<Value, (i64, String)> {
    serde_json::to_value(value).map_err(|e| (-32603, format!("Internal error: {}", e)))
}
