use crate::tools::{self, OverseerTool};
use overseer_core::config::Config;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Write};

const PROTOCOL_VERSION: &str = "2024-11-05";

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    fn result(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

#[derive(Debug, Serialize)]
struct ToolContent {
    r#type: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct ToolCallResult {
    content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    is_error: bool,
}

// ---------------------------------------------------------------------------
// Server loop
// ---------------------------------------------------------------------------

/// Serve phase tools over newline-delimited JSON-RPC on stdin/stdout.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let tools = tools::all_tools();
    tracing::info!(tools = tools.len(), "mcp server listening on stdio");

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let raw: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable request");
                let resp = JsonRpcResponse::error(None, -32700, format!("parse error: {e}"));
                write_response(&mut stdout.lock(), &resp)?;
                continue;
            }
        };

        // Notifications carry no id and get no response
        if !raw
            .as_object()
            .map(|o| o.contains_key("id"))
            .unwrap_or(false)
        {
            continue;
        }

        let response = match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(request) => {
                tracing::debug!(method = %request.method, "request");
                handle_request(&request, &tools, config)
            }
            Err(e) => JsonRpcResponse::error(None, -32600, format!("invalid request: {e}")),
        };
        write_response(&mut stdout.lock(), &response)?;
    }

    Ok(())
}

fn write_response(out: &mut impl Write, resp: &JsonRpcResponse) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, resp)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Request dispatch (pub for unit tests)
// ---------------------------------------------------------------------------

pub fn handle_request(
    req: &JsonRpcRequest,
    tools: &[Box<dyn OverseerTool>],
    config: &Config,
) -> JsonRpcResponse {
    let id = req.id.clone();
    match req.method.as_str() {
        "initialize" => JsonRpcResponse::result(
            id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "overseer",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),

        "tools/list" => {
            let tool_list: Vec<Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name(),
                        "description": t.description(),
                        "inputSchema": t.schema()
                    })
                })
                .collect();
            JsonRpcResponse::result(id, serde_json::json!({ "tools": tool_list }))
        }

        "tools/call" => {
            let Some(params) = &req.params else {
                return JsonRpcResponse::error(id, -32602, "missing params".to_string());
            };
            let Some(tool_name) = params["name"].as_str() else {
                return JsonRpcResponse::error(
                    id,
                    -32602,
                    "missing tool name in params".to_string(),
                );
            };
            let Some(tool) = tools.iter().find(|t| t.name() == tool_name) else {
                return JsonRpcResponse::error(id, -32601, format!("tool not found: {tool_name}"));
            };

            let args = params.get("arguments").cloned().unwrap_or(Value::Null);
            let (text, is_error) = match tool.call(args, config) {
                Ok(v) => (
                    serde_json::to_string_pretty(&v)
                        .unwrap_or_else(|e| format!("serialization error: {e}")),
                    false,
                ),
                Err(e) => {
                    tracing::warn!(tool = tool_name, error = %e, "tool call failed");
                    (e, true)
                }
            };

            let call_result = ToolCallResult {
                content: vec![ToolContent {
                    r#type: "text",
                    text,
                }],
                is_error,
            };
            JsonRpcResponse::result(
                id,
                serde_json::to_value(&call_result)
                    .unwrap_or_else(|e| serde_json::json!({"error": e.to_string()})),
            )
        }

        other => JsonRpcResponse::error(id, -32601, format!("method not found: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
