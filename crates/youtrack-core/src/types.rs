//! Tracker entities returned by [`IssueTracker`](crate::IssueTracker) implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tracker user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub name: Option<String>,
}

/// Project an issue belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: Option<String>,
    pub short_name: Option<String>,
}

/// Issue tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// Custom field attached to an issue.
///
/// `value` is kept in the tracker's JSON representation because its shape
/// depends on `field_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: String,
    pub name: String,
    /// Tracker type name, e.g. `StateIssueCustomField`
    pub field_type: Option<String>,
    pub value: Value,
}

/// Issue as returned by the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Internal database id (e.g. `2-123`)
    pub id: String,
    /// Human-readable id (e.g. `DEMO-123`)
    pub id_readable: Option<String>,
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
    pub tags: Vec<Tag>,
    pub custom_fields: Vec<CustomField>,
}

impl Issue {
    /// Readable id if the tracker returned one, internal id otherwise.
    pub fn display_id(&self) -> &str {
        self.id_readable.as_deref().unwrap_or(&self.id)
    }
}

/// Issue comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: Option<User>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub deleted: Option<bool>,
}

/// Issue referenced from a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedIssue {
    pub id: String,
    pub id_readable: Option<String>,
    pub summary: Option<String>,
}

/// Link from one issue to a group of other issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLink {
    /// `OUTWARD`, `INWARD`, or `BOTH`
    pub direction: Option<String>,
    /// Link type name, e.g. `Relates`
    pub link_type: Option<String>,
    pub issues: Vec<LinkedIssue>,
}
