//! Tracker trait implemented by issue-tracker clients.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{Comment, CustomField, Issue, IssueLink, Tag};

/// Operations the tool layer needs from an issue tracker.
///
/// Every method is a single pass-through to the remote API. Implementations
/// must not cache or retry; errors are returned as reported by the tracker.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Get the tracker name (e.g., "youtrack")
    fn name(&self) -> &str;

    /// Search issues using the tracker's native query syntax.
    async fn search_issues(&self, query: &str) -> Result<Vec<Issue>>;

    /// Get a single issue by id (readable or internal).
    async fn get_issue(&self, issue_id: &str) -> Result<Issue>;

    /// Get the custom fields attached to an issue.
    async fn get_custom_fields(&self, issue_id: &str) -> Result<Vec<CustomField>>;

    /// Get the comments on an issue, in creation order.
    async fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>>;

    /// Add a comment to an issue.
    async fn add_comment(&self, issue_id: &str, text: &str) -> Result<Comment>;

    /// Set the value of one custom field, addressed by field id or name.
    ///
    /// The value is not validated locally; the tracker decides whether it
    /// fits the field type.
    async fn update_custom_field(
        &self,
        issue_id: &str,
        field_id: &str,
        value: Value,
    ) -> Result<CustomField>;

    /// Get links from an issue to other issues.
    async fn get_issue_links(&self, issue_id: &str) -> Result<Vec<IssueLink>>;

    /// Get all tags visible to the current user.
    async fn get_tags(&self) -> Result<Vec<Tag>>;

    /// Attach an existing tag to an issue.
    async fn add_issue_tag(&self, issue_id: &str, tag: &Tag) -> Result<()>;
}
