//! Tool handlers for MCP server.
//!
//! This module validates tool arguments and dispatches to [`Tools`],
//! turning records into text content.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{JsonRpcError, ToolCallResult, ToolDefinition};
use crate::tools::Tools;

/// Tool handler that executes tools against the tracker.
pub struct ToolHandler {
    tools: Tools,
}

impl ToolHandler {
    pub fn new(tools: Tools) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    /// Get available tool definitions.
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "get_issues".to_string(),
                description: "Search YouTrack issues using YouTrack query syntax".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "YouTrack search query, e.g. 'project: DEMO #Unresolved'"
                        }
                    },
                    "required": ["query"]
                }),
            },
            ToolDefinition {
                name: "comment_issue".to_string(),
                description: "Add a comment to a YouTrack issue".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "issue_id": {
                            "type": "string",
                            "description": "Issue id, e.g. 'DEMO-123'"
                        },
                        "text": {
                            "type": "string",
                            "description": "Comment text"
                        }
                    },
                    "required": ["issue_id", "text"]
                }),
            },
            ToolDefinition {
                name: "update_field".to_string(),
                description: "Update a custom field on a YouTrack issue".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "issue_id": {
                            "type": "string",
                            "description": "Issue id, e.g. 'DEMO-123'"
                        },
                        "field_id": {
                            "type": "string",
                            "description": "Custom field id or name, e.g. 'State'"
                        },
                        "field_value": {
                            "description": "New value; a plain string is resolved by name for enum, state and user fields"
                        }
                    },
                    "required": ["issue_id", "field_id", "field_value"]
                }),
            },
            ToolDefinition {
                name: "get_issue_details".to_string(),
                description: "Get full details of a YouTrack issue, including links".to_string(),
                input_schema: issue_id_schema(),
            },
            ToolDefinition {
                name: "get_issue_custom_fields".to_string(),
                description: "Get the custom fields of a YouTrack issue".to_string(),
                input_schema: issue_id_schema(),
            },
            ToolDefinition {
                name: "get_issue_comments".to_string(),
                description: "Get the comments of a YouTrack issue".to_string(),
                input_schema: issue_id_schema(),
            },
            ToolDefinition {
                name: "set_issue_tags".to_string(),
                description: "Attach existing tags to a YouTrack issue by name".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "issue_id": {
                            "type": "string",
                            "description": "Issue id, e.g. 'DEMO-123'"
                        },
                        "tags": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Tag names"
                        }
                    },
                    "required": ["issue_id", "tags"]
                }),
            },
        ]
    }

    /// Execute a tool by name.
    ///
    /// Argument problems and unknown tools are protocol errors; tracker
    /// failures come back as an error result.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolCallResult, JsonRpcError> {
        tracing::info!("Executing tool: {}", name);

        let result = match name {
            "get_issues" => {
                let params: GetIssuesParams = parse_args(arguments)?;
                require("query", &params.query)?;
                respond(self.tools.get_issues(&params.query).await)
            }
            "comment_issue" => {
                let params: CommentIssueParams = parse_args(arguments)?;
                require("issue_id", &params.issue_id)?;
                require("text", &params.text)?;
                respond(self.tools.comment_issue(&params.issue_id, &params.text).await)
            }
            "update_field" => {
                let params: UpdateFieldParams = parse_args(arguments)?;
                require("issue_id", &params.issue_id)?;
                require("field_id", &params.field_id)?;
                respond(
                    self.tools
                        .update_field(&params.issue_id, &params.field_id, params.field_value)
                        .await,
                )
            }
            "get_issue_details" => {
                let params = issue_id_args(arguments)?;
                respond(self.tools.get_issue_details(&params.issue_id).await)
            }
            "get_issue_custom_fields" => {
                let params = issue_id_args(arguments)?;
                respond(self.tools.get_issue_custom_fields(&params.issue_id).await)
            }
            "get_issue_comments" => {
                let params = issue_id_args(arguments)?;
                respond(self.tools.get_issue_comments(&params.issue_id).await)
            }
            "set_issue_tags" => {
                let params: SetIssueTagsParams = parse_args(arguments)?;
                require("issue_id", &params.issue_id)?;
                respond(self.tools.set_issue_tags(&params.issue_id, &params.tags).await)
            }
            _ => return Err(JsonRpcError::invalid_params(&format!("Unknown tool: {}", name))),
        };

        Ok(result)
    }
}

fn issue_id_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "issue_id": {
                "type": "string",
                "description": "Issue id, e.g. 'DEMO-123'"
            }
        },
        "required": ["issue_id"]
    })
}

fn parse_args<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T, JsonRpcError> {
    let arguments = arguments.unwrap_or_else(|| Value::Object(Default::default()));
    serde_json::from_value(arguments).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))
}

fn issue_id_args(arguments: Option<Value>) -> Result<IssueIdParams, JsonRpcError> {
    let params: IssueIdParams = parse_args(arguments)?;
    require("issue_id", &params.issue_id)?;
    Ok(params)
}

fn require(name: &str, value: &str) -> Result<(), JsonRpcError> {
    if value.trim().is_empty() {
        return Err(JsonRpcError::invalid_params(&format!(
            "`{}` must not be empty",
            name
        )));
    }
    Ok(())
}

fn respond<T: Serialize>(result: youtrack_core::Result<T>) -> ToolCallResult {
    match result {
        Ok(record) => ToolCallResult::json(&record),
        Err(e) => {
            tracing::warn!("Tool failed: {}", e);
            ToolCallResult::error(e.to_string())
        }
    }
}

/// Parameters for get_issues tool.
#[derive(Debug, Deserialize)]
struct GetIssuesParams {
    query: String,
}

/// Parameters for comment_issue tool.
#[derive(Debug, Deserialize)]
struct CommentIssueParams {
    issue_id: String,
    text: String,
}

/// Parameters for update_field tool.
#[derive(Debug, Deserialize)]
struct UpdateFieldParams {
    issue_id: String,
    field_id: String,
    field_value: Value,
}

/// Parameters for tools taking only an issue id.
#[derive(Debug, Deserialize)]
struct IssueIdParams {
    issue_id: String,
}

#[derive(Debug, Deserialize)]
struct SetIssueTagsParams {
    issue_id: String,
    tags: Vec<String>,
}
