//! YouTrack REST API response and payload types.
//!
//! These types mirror the JSON returned by `/api/...` endpoints for the
//! `fields` selections requested by the client. They are deserialized and
//! then mapped to the core types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Users, projects, tags
// =============================================================================

/// YouTrack user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtUser {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// YouTrack project reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtProject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
}

/// YouTrack tag.
#[derive(Debug, Clone, Deserialize)]
pub struct YtTag {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Issues
// =============================================================================

/// YouTrack issue.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtIssue {
    pub id: String,
    #[serde(default)]
    pub id_readable: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub wikified_description: Option<String>,
    #[serde(default)]
    pub project: Option<YtProject>,
    /// Epoch milliseconds
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default)]
    pub resolved: Option<i64>,
    #[serde(default)]
    pub reporter: Option<YtUser>,
    #[serde(default)]
    pub updater: Option<YtUser>,
    #[serde(default)]
    pub comments_count: Option<u32>,
    #[serde(default)]
    pub tags: Vec<YtTag>,
    #[serde(default)]
    pub custom_fields: Vec<YtCustomField>,
}

/// Custom field value on an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct YtCustomField {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Entity type, e.g. `StateIssueCustomField`
    #[serde(default, rename = "$type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
}

// =============================================================================
// Comments
// =============================================================================

/// YouTrack issue comment.
#[derive(Debug, Clone, Deserialize)]
pub struct YtComment {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author: Option<YtUser>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default)]
    pub deleted: Option<bool>,
}

/// Payload for `POST /issues/{id}/comments`.
#[derive(Debug, Serialize)]
pub struct CreateCommentPayload {
    pub text: String,
}

// =============================================================================
// Custom field update
// =============================================================================

/// Payload for `POST /issues/{id}/customFields/{fieldId}`.
#[derive(Debug, Serialize)]
pub struct UpdateCustomFieldPayload {
    pub id: String,
    #[serde(rename = "$type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    pub value: serde_json::Value,
}

// =============================================================================
// Links
// =============================================================================

/// Link type.
#[derive(Debug, Clone, Deserialize)]
pub struct YtLinkType {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Issue referenced from a link.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtLinkedIssue {
    pub id: String,
    #[serde(default)]
    pub id_readable: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Group of linked issues sharing a link type and direction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtIssueLink {
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub link_type: Option<YtLinkType>,
    #[serde(default)]
    pub issues: Vec<YtLinkedIssue>,
}

/// Payload for `POST /issues/{id}/tags`.
#[derive(Debug, Serialize)]
pub struct TagRefPayload {
    pub id: String,
}
