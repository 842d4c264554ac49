//! YouTrack tools exposed over MCP.
//!
//! Each tool calls the shared [`IssueTracker`] and shapes the result into a
//! plain serializable record. Tracker errors are returned unchanged.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use youtrack_core::{
    Comment, CustomField, Issue, IssueLink, IssueTracker, Project, Result, Tag, User,
};

/// Value of `result` in [`StatusRecord`] and [`TagUpdateRecord`].
pub const SUCCESS: &str = "success";

/// Issue summary returned by `get_issues`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Human-readable id, e.g. `DEMO-123`
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
}

/// Acknowledgement returned by mutating tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub result: String,
    pub issue_id: String,
}

/// Custom field with its value reduced to plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub value: Value,
}

/// Comment as returned by `get_issue_comments`.
///
/// `timestamp` is the creation time. Deleted comments are still listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub author: Option<User>,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub deleted: bool,
}

/// Issue on the other end of a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedIssueRecord {
    pub id: String,
    pub summary: Option<String>,
}

/// One link type of an issue and the issues it points to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    pub direction: Option<String>,
    pub issues: Vec<LinkedIssueRecord>,
}

/// Full issue record returned by `get_issue_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDetails {
    pub id: String,
    pub internal_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub wikified_description: Option<String>,
    pub project: Option<Project>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub resolved: Option<DateTime<Utc>>,
    pub reporter: Option<User>,
    pub updater: Option<User>,
    pub comments_count: Option<u32>,
    pub tags: Vec<String>,
    pub custom_fields: Vec<CustomFieldRecord>,
    pub links: Vec<LinkRecord>,
}

/// Outcome of `set_issue_tags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagUpdateRecord {
    pub result: String,
    pub issue_id: String,
    pub added_tags: Vec<String>,
    pub skipped_tags: Vec<String>,
}

/// Tool layer over a shared tracker handle.
#[derive(Clone)]
pub struct Tools {
    tracker: Arc<dyn IssueTracker>,
}

impl Tools {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }

    /// Underlying tracker.
    pub fn tracker(&self) -> &Arc<dyn IssueTracker> {
        &self.tracker
    }

    /// Search issues with a YouTrack query.
    pub async fn get_issues(&self, query: &str) -> Result<Vec<IssueRecord>> {
        let issues = self.tracker.search_issues(query).await?;
        tracing::debug!(query, count = issues.len(), "issues found");

        Ok(issues
            .into_iter()
            .map(|issue| IssueRecord {
                id: issue.display_id().to_string(),
                summary: issue.summary,
                description: issue.description,
            })
            .collect())
    }

    /// Add a comment. Every call creates a new comment.
    pub async fn comment_issue(&self, issue_id: &str, text: &str) -> Result<StatusRecord> {
        let comment = self.tracker.add_comment(issue_id, text).await?;
        tracing::info!(issue_id, comment_id = %comment.id, "comment added");
        Ok(success(issue_id))
    }

    /// Set a custom field. The value is forwarded without local validation.
    pub async fn update_field(
        &self,
        issue_id: &str,
        field_id: &str,
        field_value: Value,
    ) -> Result<StatusRecord> {
        self.tracker
            .update_custom_field(issue_id, field_id, field_value)
            .await?;
        tracing::info!(issue_id, field_id, "field updated");
        Ok(success(issue_id))
    }

    pub async fn get_issue_details(&self, issue_id: &str) -> Result<IssueDetails> {
        let issue = self.tracker.get_issue(issue_id).await?;

        let links = match self.tracker.get_issue_links(issue_id).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(issue_id, "failed to load issue links: {}", e);
                Vec::new()
            }
        };

        Ok(details_record(issue, links))
    }

    pub async fn get_issue_custom_fields(&self, issue_id: &str) -> Result<Vec<CustomFieldRecord>> {
        let fields = self.tracker.get_custom_fields(issue_id).await?;
        Ok(fields.into_iter().map(field_record).collect())
    }

    pub async fn get_issue_comments(&self, issue_id: &str) -> Result<Vec<CommentRecord>> {
        let comments = self.tracker.get_comments(issue_id).await?;
        Ok(comments.into_iter().map(comment_record).collect())
    }

    /// Attach existing tags by name.
    ///
    /// Tags already on the issue, and names the tracker doesn't know, are
    /// reported as skipped.
    pub async fn set_issue_tags(&self, issue_id: &str, tags: &[String]) -> Result<TagUpdateRecord> {
        let issue = self.tracker.get_issue(issue_id).await?;
        let available = self.tracker.get_tags().await?;

        let mut present: HashSet<String> = issue.tags.into_iter().map(|t| t.name).collect();
        let mut added_tags = Vec::new();
        let mut skipped_tags = Vec::new();

        for name in tags {
            if present.contains(name) {
                skipped_tags.push(name.clone());
                continue;
            }

            match available.iter().find(|t: &&Tag| &t.name == name) {
                Some(tag) => {
                    self.tracker.add_issue_tag(issue_id, tag).await?;
                    present.insert(name.clone());
                    added_tags.push(name.clone());
                }
                None => {
                    tracing::warn!(issue_id, tag = %name, "tag does not exist");
                    skipped_tags.push(name.clone());
                }
            }
        }

        Ok(TagUpdateRecord {
            result: SUCCESS.to_string(),
            issue_id: issue_id.to_string(),
            added_tags,
            skipped_tags,
        })
    }
}

fn success(issue_id: &str) -> StatusRecord {
    StatusRecord {
        result: SUCCESS.to_string(),
        issue_id: issue_id.to_string(),
    }
}

fn details_record(issue: Issue, links: Vec<IssueLink>) -> IssueDetails {
    IssueDetails {
        id: issue.display_id().to_string(),
        internal_id: issue.id,
        summary: issue.summary,
        description: issue.description,
        wikified_description: issue.wikified_description,
        project: issue.project,
        created: issue.created,
        updated: issue.updated,
        resolved: issue.resolved,
        reporter: issue.reporter,
        updater: issue.updater,
        comments_count: issue.comments_count,
        tags: issue.tags.into_iter().map(|t| t.name).collect(),
        custom_fields: issue.custom_fields.into_iter().map(field_record).collect(),
        links: links.into_iter().map(link_record).collect(),
    }
}

fn field_record(field: CustomField) -> CustomFieldRecord {
    CustomFieldRecord {
        id: field.id,
        name: field.name,
        field_type: field.field_type,
        value: shape_field_value(field.value),
    }
}

fn comment_record(comment: Comment) -> CommentRecord {
    CommentRecord {
        id: comment.id,
        author: comment.author,
        text: comment.text,
        timestamp: comment.created,
        updated: comment.updated,
        deleted: comment.deleted.unwrap_or(false),
    }
}

fn link_record(link: IssueLink) -> LinkRecord {
    LinkRecord {
        link_type: link.link_type,
        direction: link.direction,
        issues: link
            .issues
            .into_iter()
            .map(|linked| LinkedIssueRecord {
                id: linked.id_readable.unwrap_or(linked.id),
                summary: linked.summary,
            })
            .collect(),
    }
}

/// Reduce a raw field value to what a reader needs.
///
/// Multi-value fields are shaped element by element.
pub fn shape_field_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(shape_field_value).collect()),
        Value::Object(map) => shape_entity(map),
        other => other,
    }
}

fn shape_entity(mut map: Map<String, Value>) -> Value {
    // Users
    if let Some(login) = map.remove("login") {
        let name = map
            .remove("fullName")
            .or_else(|| map.remove("name"))
            .unwrap_or(Value::Null);
        return pick([("name", name), ("login", login)]);
    }

    // Periods
    if let Some(presentation) = map.remove("presentation") {
        return presentation;
    }

    // Text field values
    if let Some(text) = map.remove("text") {
        return text;
    }

    // Enum, state, version and other bundle elements
    if let Some(name) = map.remove("name") {
        let id = map.remove("id").unwrap_or(Value::Null);
        return pick([("name", name), ("id", id)]);
    }

    map.remove("$type");
    Value::Object(map)
}

fn pick<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}
