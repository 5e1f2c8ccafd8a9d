//! # MCP Handler Module
//!
//! Implements the Model Context Protocol methods on top of the tool
//! [`Dispatcher`]:
//!
//! - `initialize` - handshake, advertises server info and capabilities
//! - `ping` - liveness check
//! - `tools/list` - the registered tool catalog
//! - `tools/call` - runs a tool and returns its content
//!
//! Notifications (requests without an id) never produce a response.

use crate::mcp::{
    dispatcher::Dispatcher,
    protocol::{error_codes, Request, Response, ToolCall, DEFAULT_PROTOCOL_VERSION},
};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Static identity reported during the handshake.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub instructions: String,
}

#[derive(Debug, Clone)]
pub struct McpServer {
    info: ServerInfo,
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(info: ServerInfo, dispatcher: Dispatcher) -> Self {
        Self { info, dispatcher }
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// This is the main dispatcher for all incoming MCP requests.
    pub async fn handle_mcp_request(&self, req: Request) -> Option<Response> {
        if req.is_notification() {
            debug!("Received notification: {}", req.method);
            return None;
        }

        info!("Handling MCP request for method: {}", req.method);

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "ping" => Response::success(req.id, json!({})),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tool_call(req).await,
            _ => Response::error(
                req.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", req.method),
            ),
        };

        Some(response)
    }

    fn handle_initialize(&self, req: &Request) -> Response {
        let protocol_version = req
            .params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        Response::success(
            req.id.clone(),
            json!({
                "protocolVersion": protocol_version,
                "serverInfo": {
                    "name": self.info.name,
                    "version": self.info.version,
                },
                "capabilities": { "tools": { "listChanged": false } },
                "instructions": self.info.instructions,
            }),
        )
    }

    /// Handles the 'tools/list' request by returning every registered tool in order.
    fn handle_tools_list(&self, req: &Request) -> Response {
        let tools: Vec<Value> = self
            .dispatcher
            .registry()
            .list()
            .iter()
            .map(|tool| tool.advertisement())
            .collect();
        Response::success(req.id.clone(), json!({ "tools": tools }))
    }

    /// Handles a 'tools/call' request. Only a malformed envelope is a protocol
    /// error; everything the tool itself reports travels as content.
    async fn handle_tool_call(&self, req: Request) -> Response {
        let params = match req.params.as_ref() {
            Some(p) => p,
            None => {
                return Response::error(
                    req.id,
                    error_codes::INVALID_PARAMS,
                    "Missing 'params' object".into(),
                )
            }
        };

        let name = match params.get("name").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => {
                return Response::error(
                    req.id,
                    error_codes::INVALID_PARAMS,
                    "Missing 'name' field in params".into(),
                )
            }
        };

        let call = ToolCall {
            id: req.id.clone(),
            name,
            arguments: params.get("arguments").cloned().unwrap_or(Value::Null),
        };

        let response = self.dispatcher.dispatch(call).await;
        match serde_json::to_value(&response) {
            Ok(result) => Response::success(response.id, result),
            Err(e) => Response::error(
                response.id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to encode tool response: {}", e),
            ),
        }
    }
}
