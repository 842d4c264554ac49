//! Data sources the shell can run against.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use youtrack_core::{IssueTracker, Result};
use youtrack_mcp::Tools;

/// Operations the shell needs, returning JSON ready for printing.
#[async_trait]
pub trait ShellBackend: Send + Sync {
    /// Short label shown in the banner.
    fn mode(&self) -> &'static str;

    async fn issues(&self, query: &str) -> Result<Value>;
    async fn issue(&self, issue_id: &str) -> Result<Value>;
    async fn fields(&self, issue_id: &str) -> Result<Value>;
    async fn comments(&self, issue_id: &str) -> Result<Value>;
    async fn comment(&self, issue_id: &str, text: &str) -> Result<Value>;
    async fn update(&self, issue_id: &str, field: &str, value: Value) -> Result<Value>;
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Calls the tracker directly and prints its native records.
pub struct DirectBackend {
    tracker: Arc<dyn IssueTracker>,
}

impl DirectBackend {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl ShellBackend for DirectBackend {
    fn mode(&self) -> &'static str {
        "direct"
    }

    async fn issues(&self, query: &str) -> Result<Value> {
        to_json(self.tracker.search_issues(query).await?)
    }

    async fn issue(&self, issue_id: &str) -> Result<Value> {
        to_json(self.tracker.get_issue(issue_id).await?)
    }

    async fn fields(&self, issue_id: &str) -> Result<Value> {
        to_json(self.tracker.get_custom_fields(issue_id).await?)
    }

    async fn comments(&self, issue_id: &str) -> Result<Value> {
        to_json(self.tracker.get_comments(issue_id).await?)
    }

    async fn comment(&self, issue_id: &str, text: &str) -> Result<Value> {
        to_json(self.tracker.add_comment(issue_id, text).await?)
    }

    async fn update(&self, issue_id: &str, field: &str, value: Value) -> Result<Value> {
        to_json(self.tracker.update_custom_field(issue_id, field, value).await?)
    }
}

/// Goes through the MCP tool layer, printing exactly what a host would see.
pub struct ToolsBackend {
    tools: Tools,
}

impl ToolsBackend {
    pub fn new(tools: Tools) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ShellBackend for ToolsBackend {
    fn mode(&self) -> &'static str {
        "tools"
    }

    async fn issues(&self, query: &str) -> Result<Value> {
        to_json(self.tools.get_issues(query).await?)
    }

    async fn issue(&self, issue_id: &str) -> Result<Value> {
        to_json(self.tools.get_issue_details(issue_id).await?)
    }

    async fn fields(&self, issue_id: &str) -> Result<Value> {
        to_json(self.tools.get_issue_custom_fields(issue_id).await?)
    }

    async fn comments(&self, issue_id: &str) -> Result<Value> {
        to_json(self.tools.get_issue_comments(issue_id).await?)
    }

    async fn comment(&self, issue_id: &str, text: &str) -> Result<Value> {
        to_json(self.tools.comment_issue(issue_id, text).await?)
    }

    async fn update(&self, issue_id: &str, field: &str, value: Value) -> Result<Value> {
        to_json(self.tools.update_field(issue_id, field, value).await?)
    }
}
