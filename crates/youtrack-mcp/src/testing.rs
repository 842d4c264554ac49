//! Shared test doubles for the tool layer, handler and server tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use youtrack_core::{
    Comment, CustomField, Issue, IssueLink, IssueTracker, Result, Tag, User,
};

mockall::mock! {
    pub Tracker {}

    #[async_trait]
    impl IssueTracker for Tracker {
        fn name(&self) -> &str;
        async fn search_issues(&self, query: &str) -> Result<Vec<Issue>>;
        async fn get_issue(&self, issue_id: &str) -> Result<Issue>;
        async fn get_custom_fields(&self, issue_id: &str) -> Result<Vec<CustomField>>;
        async fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>>;
        async fn add_comment(&self, issue_id: &str, text: &str) -> Result<Comment>;
        async fn update_custom_field(
            &self,
            issue_id: &str,
            field_id: &str,
            value: serde_json::Value,
        ) -> Result<CustomField>;
        async fn get_issue_links(&self, issue_id: &str) -> Result<Vec<IssueLink>>;
        async fn get_tags(&self) -> Result<Vec<Tag>>;
        async fn add_issue_tag(&self, issue_id: &str, tag: &Tag) -> Result<()>;
    }
}

pub fn user(login: &str, name: &str) -> User {
    User {
        login: login.to_string(),
        name: Some(name.to_string()),
    }
}

pub fn tag(id: &str, name: &str) -> Tag {
    Tag {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn state_field(state: &str) -> CustomField {
    CustomField {
        id: "92-1".to_string(),
        name: "State".to_string(),
        field_type: Some("StateIssueCustomField".to_string()),
        value: json!({"name": state, "id": "87-1", "$type": "StateBundleElement"}),
    }
}

pub fn issue(readable: &str, summary: &str) -> Issue {
    Issue {
        id: "2-123".to_string(),
        id_readable: Some(readable.to_string()),
        summary: Some(summary.to_string()),
        description: Some("Steps to reproduce".to_string()),
        wikified_description: None,
        project: None,
        created: Utc.timestamp_millis_opt(1_672_574_400_000).single(),
        updated: None,
        resolved: None,
        reporter: Some(user("jdoe", "John Doe")),
        updater: None,
        comments_count: Some(0),
        tags: vec![],
        custom_fields: vec![state_field("Open")],
    }
}

pub fn comment(id: &str, text: &str) -> Comment {
    Comment {
        id: id.to_string(),
        text: text.to_string(),
        author: Some(user("jdoe", "John Doe")),
        created: Utc.timestamp_millis_opt(1_672_574_400_000).single(),
        updated: None,
        deleted: Some(false),
    }
}
