//! Common test utilities.
//!
//! `FakeTracker` keeps issues, comments and tags in memory and behaves like
//! a small YouTrack instance: unknown ids fail with `NotFound`, comments
//! accumulate, and field updates are visible on the next read.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use youtrack_core::{
    Comment, CustomField, Error, Issue, IssueLink, IssueTracker, Project, Result, Tag, User,
};

#[derive(Default)]
struct State {
    issues: Vec<Issue>,
    comments: Vec<(String, Comment)>,
    tags: Vec<Tag>,
    next_id: u32,
}

#[derive(Default)]
pub struct FakeTracker {
    state: Mutex<State>,
}

impl FakeTracker {
    /// Tracker holding `DEMO-123` "Fix bug" (unresolved) and `DEMO-100`
    /// "Old task" (resolved).
    pub fn demo() -> Self {
        let tracker = Self::default();
        {
            let mut state = tracker.state.lock().unwrap();
            state.issues.push(demo_issue("2-123", "DEMO-123", "Fix bug", false));
            state.issues.push(demo_issue("2-100", "DEMO-100", "Old task", true));
            state.tags.push(Tag {
                id: "6-1".to_string(),
                name: "backend".to_string(),
            });
        }
        tracker
    }

    /// Comments stored for an issue, in creation order.
    pub fn comment_texts(&self, issue_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .comments
            .iter()
            .filter(|(id, _)| id == issue_id)
            .map(|(_, c)| c.text.clone())
            .collect()
    }
}

fn demo_issue(id: &str, readable: &str, summary: &str, resolved: bool) -> Issue {
    let created = Utc.timestamp_millis_opt(1_672_574_400_000).single();
    Issue {
        id: id.to_string(),
        id_readable: Some(readable.to_string()),
        summary: Some(summary.to_string()),
        description: Some(format!("{} description", summary)),
        wikified_description: None,
        project: Some(Project {
            id: "0-1".to_string(),
            name: Some("Demo".to_string()),
            short_name: Some("DEMO".to_string()),
        }),
        created,
        updated: created,
        resolved: if resolved { created } else { None },
        reporter: Some(User {
            login: "jdoe".to_string(),
            name: Some("John Doe".to_string()),
        }),
        updater: None,
        comments_count: Some(0),
        tags: vec![],
        custom_fields: vec![CustomField {
            id: "92-1".to_string(),
            name: "State".to_string(),
            field_type: Some("StateIssueCustomField".to_string()),
            value: json!({"name": if resolved { "Fixed" } else { "Open" }, "id": "87-1"}),
        }],
    }
}

fn matches(issue: &Issue, query: &str) -> bool {
    let mut words = query.split_whitespace();
    while let Some(word) = words.next() {
        let ok = match word {
            "project:" => {
                let wanted = words.next().unwrap_or_default();
                issue
                    .project
                    .as_ref()
                    .and_then(|p| p.short_name.as_deref())
                    == Some(wanted)
            }
            "#Unresolved" => issue.resolved.is_none(),
            "#Resolved" => issue.resolved.is_some(),
            text => issue
                .summary
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&text.to_lowercase()),
        };
        if !ok {
            return false;
        }
    }
    true
}

fn not_found(issue_id: &str) -> Error {
    Error::NotFound(format!("Issue {} not found", issue_id))
}

impl State {
    fn issue_mut(&mut self, issue_id: &str) -> Result<&mut Issue> {
        self.issues
            .iter_mut()
            .find(|i| i.id == issue_id || i.id_readable.as_deref() == Some(issue_id))
            .ok_or_else(|| not_found(issue_id))
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search_issues(&self, query: &str) -> Result<Vec<Issue>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .issues
            .iter()
            .filter(|i| matches(i, query))
            .cloned()
            .collect())
    }

    async fn get_issue(&self, issue_id: &str) -> Result<Issue> {
        let mut state = self.state.lock().unwrap();
        state.issue_mut(issue_id).map(|i| i.clone())
    }

    async fn get_custom_fields(&self, issue_id: &str) -> Result<Vec<CustomField>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.issue_mut(issue_id)?.custom_fields.clone())
    }

    async fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>> {
        let mut state = self.state.lock().unwrap();
        let readable = state.issue_mut(issue_id)?.display_id().to_string();
        Ok(state
            .comments
            .iter()
            .filter(|(id, _)| *id == readable)
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn add_comment(&self, issue_id: &str, text: &str) -> Result<Comment> {
        let mut state = self.state.lock().unwrap();
        let issue = state.issue_mut(issue_id)?;
        let readable = issue.display_id().to_string();
        issue.comments_count = Some(issue.comments_count.unwrap_or(0) + 1);

        state.next_id += 1;
        let comment = Comment {
            id: format!("4-{}", state.next_id),
            text: text.to_string(),
            author: Some(User {
                login: "bot".to_string(),
                name: Some("Bot".to_string()),
            }),
            created: Some(Utc::now()),
            updated: None,
            deleted: Some(false),
        };
        state.comments.push((readable, comment.clone()));
        Ok(comment)
    }

    async fn update_custom_field(
        &self,
        issue_id: &str,
        field_id: &str,
        value: Value,
    ) -> Result<CustomField> {
        let mut state = self.state.lock().unwrap();
        let issue = state.issue_mut(issue_id)?;
        let field = issue
            .custom_fields
            .iter_mut()
            .find(|f| f.id == field_id || f.name == field_id)
            .ok_or_else(|| {
                Error::NotFound(format!("Field {} not found on issue {}", field_id, issue_id))
            })?;

        field.value = match value {
            Value::String(name) => json!({"name": name, "id": "87-2"}),
            other => other,
        };
        Ok(field.clone())
    }

    async fn get_issue_links(&self, issue_id: &str) -> Result<Vec<IssueLink>> {
        let mut state = self.state.lock().unwrap();
        state.issue_mut(issue_id)?;
        Ok(vec![])
    }

    async fn get_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.state.lock().unwrap().tags.clone())
    }

    async fn add_issue_tag(&self, issue_id: &str, tag: &Tag) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.issue_mut(issue_id)?.tags.push(tag.clone());
        Ok(())
    }
}
