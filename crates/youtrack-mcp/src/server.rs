//! MCP server implementation.
//!
//! The server handles the MCP protocol lifecycle:
//! 1. Initialize - exchange capabilities
//! 2. Handle tool calls - each call runs as its own task
//! 3. Shutdown - on EOF, wait for in-flight calls and flush responses

use std::io;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use youtrack_core::Error;

use crate::handlers::ToolHandler;
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability, ToolsListResult, MCP_VERSION,
    SERVER_NAME,
};
use crate::transport::{self, IncomingMessage, MessageReader, MessageWriter};

/// MCP server for mcp-youtrack.
pub struct McpServer {
    handler: Arc<ToolHandler>,
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(handler: ToolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
            initialized: false,
        }
    }

    /// Run the MCP server over stdin/stdout.
    pub async fn run(&mut self) -> youtrack_core::Result<()> {
        let (reader, writer) = transport::stdio();
        self.serve(reader, writer).await
    }

    /// Serve requests from `reader` until EOF, writing responses to `writer`.
    pub async fn serve<R, W>(
        &mut self,
        reader: MessageReader<R>,
        writer: MessageWriter<W>,
    ) -> youtrack_core::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        tracing::info!("Starting MCP server");

        let mut reader = reader;
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        // Single writer so concurrent responses never interleave
        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(response) = rx.recv().await {
                if let Err(e) = writer.write_response(&response).await {
                    tracing::error!("Failed to write response: {}", e);
                    break;
                }
            }
        });

        let mut calls = JoinSet::new();
        let mut outcome = Ok(());

        loop {
            let response = match reader.read_message().await {
                Ok(Some(IncomingMessage::Request(req))) if req.method == "tools/call" => {
                    let handler = Arc::clone(&self.handler);
                    let tx = tx.clone();
                    calls.spawn(async move {
                        let response = handle_tools_call(&handler, req.id, req.params).await;
                        let _ = tx.send(response);
                    });
                    None
                }
                Ok(Some(msg)) => self.handle_message(msg).await,
                Ok(None) => {
                    tracing::info!("EOF received, shutting down");
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::InvalidData => Some(JsonRpcResponse::error(
                    RequestId::Null,
                    JsonRpcError::parse_error(&e.to_string()),
                )),
                Err(e) => {
                    tracing::error!("Transport error: {}", e);
                    outcome = Err(Error::Other(e.into()));
                    break;
                }
            };

            if let Some(response) = response {
                if tx.send(response).is_err() {
                    tracing::error!("Response writer stopped");
                    break;
                }
            }

            while let Some(joined) = calls.try_join_next() {
                log_join(joined);
            }
        }

        while let Some(joined) = calls.join_next().await {
            log_join(joined);
        }

        drop(tx);
        if let Err(e) = writer_task.await {
            tracing::error!("Response writer failed: {}", e);
        }

        tracing::info!("MCP server stopped");
        outcome
    }

    /// Handle an incoming message.
    async fn handle_message(&mut self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(&notif.method);
                None
            }
        }
    }

    /// Handle a JSON-RPC request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {} (id: {:?})", req.method, req.id);

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "tools/list" => self.handle_tools_list(req.id),
            "tools/call" => handle_tools_call(&self.handler, req.id, req.params).await,
            "ping" => JsonRpcResponse::success(req.id, serde_json::json!({})),
            method => {
                tracing::warn!("Unknown method: {}", method);
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    /// Handle notifications (no response).
    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                tracing::info!("Client initialized");
            }
            "notifications/cancelled" => {
                tracing::debug!("Request cancelled by client");
            }
            _ => {
                tracing::debug!("Ignoring notification: {}", method);
            }
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init_params) => {
                    tracing::info!(
                        "Client: {} v{} (protocol: {})",
                        init_params.client_info.name,
                        init_params.client_info.version,
                        init_params.protocol_version
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to parse initialize params: {}", e);
                }
            }
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::from_result(id, &result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.handler.available_tools(),
        };
        JsonRpcResponse::from_result(id, &result)
    }
}

/// Handle tools/call request.
async fn handle_tools_call(
    handler: &ToolHandler,
    id: RequestId,
    params: Option<Value>,
) -> JsonRpcResponse {
    let params: ToolCallParams = match params {
        Some(p) => match serde_json::from_value(p) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params(&e.to_string()));
            }
        },
        None => {
            return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
        }
    };

    match handler.execute(&params.name, params.arguments).await {
        Ok(result) => JsonRpcResponse::from_result(id, &result),
        Err(error) => JsonRpcResponse::error(id, error),
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!("Tool call task failed: {}", e);
    }
}
