//! MCP server implementation for the review-pilot tool catalog.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Routing tool calls and resource reads
//! 3. **Shutdown**: Graceful connection termination
//!
//! # Routing
//!
//! Catalog lookups (`tools/list`, `resources/list`, `resources/read`) are
//! answered inline. `tools/call` is validated inline — unknown tool and
//! schema violations never reach a handler — and then dispatched on a
//! spawned task, so slow handlers (upstream report calls, health probes)
//! never block the read loop. Responses are correlated by request id only
//! and may be written in completion order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION,
    SERVER_NAME,
};
use crate::mcp::registry;
use crate::mcp::transport::{OutboundSink, StdioTransport};
use crate::resources;
use crate::schema;
use crate::tools::{self, ToolCallResult, ToolDeps};

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
    /// Resource-related capabilities.
    pub resources: ResourceCapabilities,
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session. It cannot.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

/// Resource-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceCapabilities {
    /// Whether the resource list can change during the session. It cannot.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for the initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by the client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<Value>,
}

/// Parameters for the tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Parameters for the resources/read request.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceReadParams {
    /// URI of the resource to read.
    pub uri: String,
}

/// Resolves a tool call end to end: catalog lookup, schema validation,
/// handler dispatch. Unknown names and invalid arguments are answered
/// without the handler table ever being invoked.
pub async fn execute_tool_call(params: ToolCallParams, deps: Arc<ToolDeps>) -> ToolCallResult {
    let Some(descriptor) = registry::find_tool(&params.name) else {
        return ToolCallResult::error(format!("Unknown tool: {}", params.name));
    };

    if let Err(e) = schema::validate(&descriptor.input_schema, &params.arguments) {
        return ToolCallResult::error(format!("Invalid arguments for {}: {e}", params.name));
    }

    tools::dispatch(&params.name, &params.arguments, &deps).await
}

/// The MCP server for the review-pilot tool catalog.
pub struct McpServer {
    /// Current server state.
    state: ServerState,
    /// The transport reading half.
    transport: StdioTransport,
    /// Outbound message sink (cloned into spawned tool calls).
    sink: OutboundSink,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// Shared handler dependencies.
    deps: Arc<ToolDeps>,
}

impl McpServer {
    /// Creates a new MCP server with the given handler dependencies and
    /// outbound sink.
    #[must_use]
    pub fn new(deps: ToolDeps, sink: OutboundSink) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport: StdioTransport::new(),
            sink,
            protocol_version: None,
            deps: Arc::new(deps),
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result)? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result)? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from a transport read.
    ///
    /// Returns `true` if the server should shut down.
    fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        self.handle_line(&line);

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a single line of input. A malformed line is reported and the
    /// loop continues; it never terminates the server.
    fn handle_line(&mut self, line: &str) {
        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => self.handle_request(req),
            Ok(IncomingMessage::Notification(ref notif)) => self.handle_notification(notif),
            Err(error) => self.sink.send_error(&error),
        }
    }

    /// Routes an incoming request.
    fn handle_request(&mut self, req: JsonRpcRequest) {
        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => {
                // Spawns on success; the response is sent from the task.
                match self.handle_tools_call(&req) {
                    Ok(()) => return,
                    Err(error) => Err(error),
                }
            }
            "resources/list" => self.handle_resources_list(&req),
            "resources/read" => self.handle_resources_read(&req),
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => self.sink.send_response(&resp),
            Err(error) => self.sink.send_error(&error),
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            self.state = ServerState::Running;
            tracing::debug!(
                protocol_version = self.protocol_version.as_deref(),
                "Client initialised, server running"
            );
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                JsonRpcErrorData::with_message(
                    ErrorCode::InvalidRequest,
                    "Server already initialised",
                ),
            ));
        }

        let _params: InitializeParams = Self::required_params(req, "initialize")?;

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();

        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let tools: Vec<Value> = registry::tool_descriptors()
            .iter()
            .map(registry::ToolDescriptor::to_definition)
            .collect();

        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({ "tools": tools }),
        ))
    }

    /// Handles the tools/call request. The call itself runs on a spawned
    /// task; only the parameter envelope is checked inline.
    fn handle_tools_call(&self, req: &JsonRpcRequest) -> Result<(), JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = Self::required_params(req, "tool call")?;

        let id = req.id.clone();
        let deps = Arc::clone(&self.deps);
        let sink = self.sink.clone();

        let call = tokio::spawn(execute_tool_call(params, deps));
        tokio::spawn(async move {
            // A panicking handler is converted here instead of killing the loop.
            let result = match call.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, "Tool handler task failed");
                    ToolCallResult::error("Internal error: tool handler failed")
                }
            };

            match serde_json::to_value(&result) {
                Ok(value) => sink.send_response(&JsonRpcResponse::success(id, value)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialise tool call result");
                    sink.send_error(&JsonRpcError::internal_error(
                        id,
                        "Internal error: failed to serialise result",
                    ));
                }
            }
        });

        Ok(())
    }

    /// Handles the resources/list request.
    fn handle_resources_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let resources: Vec<Value> = registry::resource_descriptors()
            .iter()
            .map(registry::ResourceDescriptor::to_definition)
            .collect();

        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({ "resources": resources }),
        ))
    }

    /// Handles the resources/read request.
    fn handle_resources_read(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ResourceReadParams = Self::required_params(req, "resource read")?;

        let Some(descriptor) = registry::find_resource(&params.uri) else {
            return Err(JsonRpcError::invalid_params(
                req.id.clone(),
                format!("Unknown resource: {}", params.uri),
            ));
        };

        // Catalog membership guarantees a template exists.
        let text = resources::render(descriptor.uri).unwrap_or_default();

        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({
                "contents": [{
                    "uri": descriptor.uri,
                    "mimeType": descriptor.mime_type,
                    "text": text,
                }]
            }),
        ))
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Deserialises the request's params, which must be present.
    fn required_params<T: serde::de::DeserializeOwned>(
        req: &JsonRpcRequest,
        what: &str,
    ) -> Result<T, JsonRpcError> {
        req.params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(req.id.clone(), format!("Invalid {what} params: {e}"))
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), format!("Missing {what} params"))
            })
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tools::ToolContent;

    fn test_deps() -> Arc<ToolDeps> {
        Arc::new(ToolDeps::from_config(&Config::default()))
    }

    fn call(name: &str, arguments: Value) -> ToolCallParams {
        ToolCallParams {
            name: name.to_string(),
            arguments,
        }
    }

    fn text_of(result: &ToolCallResult) -> &str {
        let ToolContent::Text { text } = &result.content[0];
        text
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_result() {
        let result = execute_tool_call(call("delete_everything", json!({})), test_deps()).await;
        assert!(result.is_error);
        assert!(text_of(&result).contains("Unknown tool: delete_everything"));
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_the_handler() {
        // Missing 'to'; with no credential configured, reaching the handler
        // would fail with a credential error instead of a validation error.
        let result = execute_tool_call(
            call("generate_report", json!({ "from": "2025-01-01" })),
            test_deps(),
        )
        .await;

        assert!(result.is_error);
        let text = text_of(&result);
        assert!(text.contains("missing required parameter: to"));
        assert!(!text.contains("credential"));
    }

    #[tokio::test]
    async fn enum_violation_is_reported_with_allowed_values() {
        let result = execute_tool_call(
            call("send_review_command", json!({ "command": "format disk" })),
            test_deps(),
        )
        .await;

        assert!(result.is_error);
        assert!(text_of(&result).contains("generate docstrings"));
    }

    #[tokio::test]
    async fn valid_command_call_round_trips() {
        let result = execute_tool_call(
            call(
                "send_review_command",
                json!({ "command": "remember rule", "context": "enforce camelCase" }),
            ),
            test_deps(),
        )
        .await;

        assert!(!result.is_error);
        assert!(text_of(&result).contains("enforce camelCase"));
    }

    #[tokio::test]
    async fn extra_undeclared_arguments_are_tolerated() {
        let result = execute_tool_call(
            call(
                "analyze_pull_request",
                json!({
                    "repository": "acme/widgets",
                    "pullRequestNumber": 3,
                    "futureOption": true
                }),
            ),
            test_deps(),
        )
        .await;

        assert!(!result.is_error);
    }

    #[test]
    fn capabilities_advertise_tools_and_resources() {
        let caps = serde_json::to_value(ServerCapabilities::default()).unwrap();
        assert!(caps.get("tools").is_some());
        assert!(caps.get("resources").is_some());
    }
}
