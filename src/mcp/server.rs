//! MCP server setup and lifecycle.
//!
//! Implements a JSON-RPC 2.0 MCP server over stdio. Each request is one line
//! of JSON; each response is written as one line and flushed. Notifications
//! get no response.

use super::dispatch::McpMethod;
use crate::mcp::ToolRegistry;
use crate::services::ResolutionService;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use std::time::Instant;
use tracing::info_span;

/// Maximum request size (1 MiB).
const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// MCP protocol version.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name.
const SERVER_NAME: &str = "brain";

/// JSON-RPC error codes.
mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
}

type DispatchResult = std::result::Result<Value, (i32, String)>;

/// MCP server for brain.
pub struct McpServer {
    /// Tool registry.
    tools: ToolRegistry,
}

impl McpServer {
    /// Creates a server whose tools use `service`.
    #[must_use]
    pub fn new(service: Arc<ResolutionService>) -> Self {
        Self {
            tools: ToolRegistry::new(service),
        }
    }

    /// Serves requests from stdin until it closes.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read or stdout cannot be written.
    pub fn run_stdio(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(BufReader::new(stdin.lock()), stdout.lock())
    }

    /// Serves newline-delimited requests from `reader`, writing responses to
    /// `writer`, until `reader` is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        tracing::info!("MCP server listening on stdio");

        for line in reader.lines() {
            let line = line.map_err(|e| Error::OperationFailed {
                operation: "read_stdin".to_string(),
                cause: e.to_string(),
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let Some(response) = self.handle_request(&line) else {
                continue;
            };

            writeln!(writer, "{response}").map_err(|e| Error::OperationFailed {
                operation: "write_stdout".to_string(),
                cause: e.to_string(),
            })?;
            writer.flush().map_err(|e| Error::OperationFailed {
                operation: "flush_stdout".to_string(),
                cause: e.to_string(),
            })?;
        }

        tracing::info!("MCP server input closed, shutting down");
        Ok(())
    }

    /// Handles one request line. `None` for notifications.
    pub fn handle_request(&self, request: &str) -> Option<String> {
        if request.len() > MAX_REQUEST_BODY_SIZE {
            tracing::warn!(
                request_size = request.len(),
                max_size = MAX_REQUEST_BODY_SIZE,
                "Request exceeds maximum size limit"
            );
            return Some(Self::format_error(
                None,
                codes::INVALID_REQUEST,
                &format!(
                    "Request too large: {} bytes (max: {MAX_REQUEST_BODY_SIZE} bytes)",
                    request.len()
                ),
            ));
        }

        let start = Instant::now();
        let span = info_span!(
            "mcp.request",
            rpc.method = tracing::field::Empty,
            rpc.id = tracing::field::Empty,
            status = tracing::field::Empty
        );
        let _guard = span.enter();

        let parsed: std::result::Result<JsonRpcRequest, _> = serde_json::from_str(request);
        let response = match parsed {
            Ok(req) => {
                span.record("rpc.method", req.method.as_str());
                if let Some(id) = &req.id {
                    span.record("rpc.id", id.to_string().as_str());
                }

                let method = McpMethod::from(req.method.as_str());
                if req.id.is_none() && method.is_notification() {
                    tracing::debug!(method = %method, "Notification received");
                    span.record("status", "notification");
                    return None;
                }

                let result = self.dispatch_method(method, req.params);
                span.record("status", if result.is_ok() { "success" } else { "error" });
                Self::format_response(req.id, result)
            },
            Err(e) => {
                span.record("status", "parse_error");
                Self::format_error(None, codes::PARSE_ERROR, &format!("Parse error: {e}"))
            },
        };

        tracing::debug!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "MCP request handled"
        );
        Some(response)
    }

    /// Dispatches a parsed method.
    fn dispatch_method(&self, method: McpMethod, params: Option<Value>) -> DispatchResult {
        match method {
            McpMethod::Initialize => Ok(Self::handle_initialize()),
            McpMethod::ListTools => Ok(self.handle_list_tools()),
            McpMethod::CallTool => self.handle_call_tool(params),
            McpMethod::Ping => Ok(serde_json::json!({})),
            McpMethod::Unknown(name) => {
                let supported: Vec<&str> =
                    McpMethod::known_methods().iter().map(McpMethod::as_str).collect();
                Err((
                    codes::METHOD_NOT_FOUND,
                    format!(
                        "Method not found: {name} (supported: {})",
                        supported.join(", ")
                    ),
                ))
            },
        }
    }

    /// Handles the initialize method.
    fn handle_initialize() -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    /// Handles tools/list.
    fn handle_list_tools(&self) -> Value {
        serde_json::json!({ "tools": self.tools.list_tools() })
    }

    /// Handles tools/call.
    fn handle_call_tool(&self, params: Option<Value>) -> DispatchResult {
        let params = params.ok_or((codes::INVALID_PARAMS, "Missing params".to_string()))?;

        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or((codes::INVALID_PARAMS, "Missing tool name".to_string()))?;
        let span = info_span!("mcp.tool.call", tool.name = name);
        let _guard = span.enter();

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));

        let result = match self.tools.execute(name, arguments) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Tool call failed");
                super::ToolResult::error(&e.to_string())
            },
        };

        serde_json::to_value(&result).map_err(|e| (codes::INVALID_REQUEST, e.to_string()))
    }

    /// Formats a response.
    fn format_response(id: Option<Value>, result: DispatchResult) -> String {
        match result {
            Ok(value) => {
                let response = JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    id,
                    result: Some(value),
                    error: None,
                };
                serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
            },
            Err((code, message)) => Self::format_error(id, code, &message),
        }
    }

    /// Formats an error response.
    fn format_error(id: Option<Value>, code: i32, message: &str) -> String {
        let response = JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.to_string(),
                data: None,
            }),
        };
        serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
    }
}

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC version (required by protocol but not used in code).
    #[serde(rename = "jsonrpc")]
    _jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}
