//! YouTrack REST API client implementation.
//!
//! Talks to `<instance>/api` with a permanent token sent as bearer token.
//! Every trait method performs the request(s) it needs and returns; there is
//! no caching and no retry.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use youtrack_core::{
    Comment, CustomField, Error, Issue, IssueLink, IssueTracker, LinkedIssue, Project, Result,
    Tag, TrackerConfig, User,
};

use crate::types::{
    CreateCommentPayload, TagRefPayload, UpdateCustomFieldPayload, YtComment, YtCustomField,
    YtIssue, YtIssueLink, YtProject, YtTag, YtUser,
};

/// Field selection for custom field values.
const CUSTOM_FIELD_FIELDS: &str =
    "id,name,$type,value(id,name,login,fullName,presentation,text,minutes,$type)";

/// Field selection for issues.
const ISSUE_FIELDS: &str = "id,idReadable,summary,description,wikifiedDescription,\
project(id,name,shortName),created,updated,resolved,\
reporter(login,name,fullName),updater(login,name,fullName),commentsCount,tags(id,name),\
customFields(id,name,$type,value(id,name,login,fullName,presentation,text,minutes,$type))";

/// Field selection for comments.
const COMMENT_FIELDS: &str = "id,text,created,updated,deleted,author(login,name,fullName)";

/// Field selection for issue links.
const LINK_FIELDS: &str = "direction,linkType(id,name),issues(id,idReadable,summary)";

/// Field selection for tags.
const TAG_FIELDS: &str = "id,name";

/// YouTrack API client.
pub struct YouTrackClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl YouTrackClient {
    /// Create a client for the instance described by `config`.
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        let base_url = format!("{}/api", config.url.trim_end_matches('/'));
        Self::build(base_url, config.token.clone(), config.timeout)
    }

    /// Create a client with an explicit API base URL (for testing with httpmock).
    /// The base URL is used as-is (no `/api` suffix appended).
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self::build(base_url, token.into(), Duration::from_secs(30))
    }

    fn build(base_url: String, token: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("mcp-youtrack")
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    /// Build request with auth header.
    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    /// Make an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!(url = url, "YouTrack GET request");

        let response = self
            .request(reqwest::Method::GET, url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Make an authenticated POST request.
    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        debug!(url = url, "YouTrack POST request");

        let response = self
            .request(reqwest::Method::POST, url)
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle response and map errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            warn!(
                status = status_code,
                message = message,
                "YouTrack API error response"
            );
            return Err(Error::from_status(status_code, message));
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }

    /// URL of `issues/{issue_id}` followed by `rest`.
    ///
    /// The id is always sent as one percent-encoded path segment.
    fn issue_url(&self, issue_id: &str, rest: &[&str]) -> Result<String> {
        if matches!(issue_id.trim(), "" | "." | "..") {
            return Err(Error::InvalidInput(format!(
                "Invalid issue id: {:?}",
                issue_id
            )));
        }

        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid YouTrack URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid YouTrack URL {}", self.base_url)))?
            .pop_if_empty()
            .push("issues")
            .push(issue_id)
            .extend(rest);

        Ok(url.into())
    }
}

/// Extract a readable message from a YouTrack error body.
///
/// YouTrack answers with `{"error": "...", "error_description": "..."}`;
/// anything else is returned verbatim.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    json.get("error_description")
        .or_else(|| json.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

// =============================================================================
// Custom field update shaping
// =============================================================================

/// How a plain value is wrapped for a given custom field type.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ValueShape {
    /// Bundle element referenced by `name`
    Named { multi: bool },
    /// User referenced by `login`
    User { multi: bool },
    /// Sent as given
    Raw,
}

fn value_shape(field_type: &str) -> ValueShape {
    match field_type {
        "StateIssueCustomField"
        | "StateMachineIssueCustomField"
        | "SingleEnumIssueCustomField"
        | "SingleBuildIssueCustomField"
        | "SingleVersionIssueCustomField"
        | "SingleOwnedIssueCustomField"
        | "SingleGroupIssueCustomField" => ValueShape::Named { multi: false },
        "MultiEnumIssueCustomField"
        | "MultiBuildIssueCustomField"
        | "MultiVersionIssueCustomField"
        | "MultiOwnedIssueCustomField"
        | "MultiGroupIssueCustomField" => ValueShape::Named { multi: true },
        "SingleUserIssueCustomField" => ValueShape::User { multi: false },
        "MultiUserIssueCustomField" => ValueShape::User { multi: true },
        _ => ValueShape::Raw,
    }
}

/// Wrap plain strings into the entity references YouTrack expects for the
/// field type. Values that are already objects pass through untouched.
fn shape_update_value(field_type: Option<&str>, value: Value) -> Value {
    let shape = field_type.map(value_shape).unwrap_or(ValueShape::Raw);

    let (key, multi) = match shape {
        ValueShape::Named { multi } => ("name", multi),
        ValueShape::User { multi } => ("login", multi),
        ValueShape::Raw => return value,
    };

    let reference = |v: Value| match v {
        Value::String(s) => {
            let mut object = serde_json::Map::new();
            object.insert(key.to_string(), Value::String(s));
            Value::Object(object)
        }
        other => other,
    };

    match value {
        Value::String(_) if multi => Value::Array(vec![reference(value)]),
        Value::String(_) => reference(value),
        Value::Array(items) if multi => Value::Array(items.into_iter().map(reference).collect()),
        other => other,
    }
}

// =============================================================================
// Mapping functions: YouTrack types -> core types
// =============================================================================

fn map_timestamp(millis: Option<i64>) -> Option<DateTime<Utc>> {
    millis.and_then(DateTime::from_timestamp_millis)
}

fn map_user(user: Option<&YtUser>) -> Option<User> {
    user.map(|u| User {
        login: u
            .login
            .clone()
            .or_else(|| u.name.clone())
            .unwrap_or_default(),
        name: u.full_name.clone().or_else(|| u.name.clone()),
    })
}

fn map_project(project: &YtProject) -> Project {
    Project {
        id: project.id.clone(),
        name: project.name.clone(),
        short_name: project.short_name.clone(),
    }
}

fn map_tag(tag: &YtTag) -> Tag {
    Tag {
        id: tag.id.clone(),
        name: tag.name.clone().unwrap_or_default(),
    }
}

fn map_custom_field(field: &YtCustomField) -> CustomField {
    CustomField {
        id: field.id.clone(),
        name: field.name.clone().unwrap_or_else(|| field.id.clone()),
        field_type: field.field_type.clone(),
        value: field.value.clone(),
    }
}

fn map_issue(issue: &YtIssue) -> Issue {
    Issue {
        id: issue.id.clone(),
        id_readable: issue.id_readable.clone(),
        summary: issue.summary.clone(),
        description: issue.description.clone(),
        wikified_description: issue.wikified_description.clone(),
        project: issue.project.as_ref().map(map_project),
        created: map_timestamp(issue.created),
        updated: map_timestamp(issue.updated),
        resolved: map_timestamp(issue.resolved),
        reporter: map_user(issue.reporter.as_ref()),
        updater: map_user(issue.updater.as_ref()),
        comments_count: issue.comments_count,
        tags: issue.tags.iter().map(map_tag).collect(),
        custom_fields: issue.custom_fields.iter().map(map_custom_field).collect(),
    }
}

fn map_comment(comment: &YtComment) -> Comment {
    Comment {
        id: comment.id.clone(),
        text: comment.text.clone().unwrap_or_default(),
        author: map_user(comment.author.as_ref()),
        created: map_timestamp(comment.created),
        updated: map_timestamp(comment.updated),
        deleted: comment.deleted,
    }
}

fn map_link(link: &YtIssueLink) -> IssueLink {
    IssueLink {
        direction: link.direction.clone(),
        link_type: link.link_type.as_ref().and_then(|t| t.name.clone()),
        issues: link
            .issues
            .iter()
            .map(|i| LinkedIssue {
                id: i.id.clone(),
                id_readable: i.id_readable.clone(),
                summary: i.summary.clone(),
            })
            .collect(),
    }
}

// =============================================================================
// Trait implementation
// =============================================================================

#[async_trait]
impl IssueTracker for YouTrackClient {
    fn name(&self) -> &str {
        "youtrack"
    }

    async fn search_issues(&self, query: &str) -> Result<Vec<Issue>> {
        let url = format!("{}/issues", self.base_url);
        let issues: Vec<YtIssue> = self
            .get(&url, &[("query", query), ("fields", ISSUE_FIELDS)])
            .await?;

        debug!(query = query, count = issues.len(), "YouTrack search");
        Ok(issues.iter().map(map_issue).collect())
    }

    async fn get_issue(&self, issue_id: &str) -> Result<Issue> {
        let issue: YtIssue = self
            .get(&self.issue_url(issue_id, &[])?, &[("fields", ISSUE_FIELDS)])
            .await?;
        Ok(map_issue(&issue))
    }

    async fn get_custom_fields(&self, issue_id: &str) -> Result<Vec<CustomField>> {
        let url = self.issue_url(issue_id, &["customFields"])?;
        let fields: Vec<YtCustomField> = self.get(&url, &[("fields", CUSTOM_FIELD_FIELDS)]).await?;
        Ok(fields.iter().map(map_custom_field).collect())
    }

    async fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>> {
        let url = self.issue_url(issue_id, &["comments"])?;
        let comments: Vec<YtComment> = self.get(&url, &[("fields", COMMENT_FIELDS)]).await?;
        Ok(comments.iter().map(map_comment).collect())
    }

    async fn add_comment(&self, issue_id: &str, text: &str) -> Result<Comment> {
        let url = self.issue_url(issue_id, &["comments"])?;
        let payload = CreateCommentPayload {
            text: text.to_string(),
        };
        let comment: YtComment = self
            .post(&url, &[("fields", COMMENT_FIELDS)], &payload)
            .await?;

        debug!(issue = issue_id, comment = comment.id, "Comment created");
        Ok(map_comment(&comment))
    }

    async fn update_custom_field(
        &self,
        issue_id: &str,
        field_id: &str,
        value: Value,
    ) -> Result<CustomField> {
        let fields = self.get_custom_fields(issue_id).await?;
        let target = fields
            .iter()
            .find(|f| f.id == field_id || f.name == field_id)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Field {} not found on issue {}",
                    field_id, issue_id
                ))
            })?;

        let payload = UpdateCustomFieldPayload {
            id: target.id.clone(),
            field_type: target.field_type.clone(),
            value: shape_update_value(target.field_type.as_deref(), value),
        };

        debug!(
            issue = issue_id,
            field = target.name,
            field_type = ?target.field_type,
            "Updating custom field"
        );

        let url = self.issue_url(issue_id, &["customFields", target.id.as_str()])?;
        let updated: YtCustomField = self
            .post(&url, &[("fields", CUSTOM_FIELD_FIELDS)], &payload)
            .await?;
        Ok(map_custom_field(&updated))
    }

    async fn get_issue_links(&self, issue_id: &str) -> Result<Vec<IssueLink>> {
        let url = self.issue_url(issue_id, &["links"])?;
        let links: Vec<YtIssueLink> = self.get(&url, &[("fields", LINK_FIELDS)]).await?;
        Ok(links.iter().map(map_link).collect())
    }

    async fn get_tags(&self) -> Result<Vec<Tag>> {
        let url = format!("{}/tags", self.base_url);
        let tags: Vec<YtTag> = self.get(&url, &[("fields", TAG_FIELDS)]).await?;
        Ok(tags.iter().map(map_tag).collect())
    }

    async fn add_issue_tag(&self, issue_id: &str, tag: &Tag) -> Result<()> {
        let url = self.issue_url(issue_id, &["tags"])?;
        let payload = TagRefPayload { id: tag.id.clone() };
        let _: YtTag = self.post(&url, &[("fields", TAG_FIELDS)], &payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // Unit tests
    // =========================================================================

    #[test]
    fn test_new_appends_api_suffix() {
        let config = TrackerConfig {
            url: "https://yt.example.com/".to_string(),
            token: "perm:test".to_string(),
            timeout: Duration::from_secs(5),
        };
        let client = YouTrackClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://yt.example.com/api");
        assert_eq!(
            client.issue_url("DEMO-1", &[]).unwrap(),
            "https://yt.example.com/api/issues/DEMO-1"
        );
        assert_eq!(
            client.issue_url("DEMO-1", &["customFields", "92-1"]).unwrap(),
            "https://yt.example.com/api/issues/DEMO-1/customFields/92-1"
        );
    }

    #[test]
    fn test_issue_url_encodes_id() {
        let client = YouTrackClient::with_base_url("https://yt.example.com/api", "t").unwrap();

        assert_eq!(
            client.issue_url("DEMO-1#NOPE-9", &[]).unwrap(),
            "https://yt.example.com/api/issues/DEMO-1%23NOPE-9"
        );
        assert_eq!(
            client.issue_url("DEMO-1?fields=id", &["comments"]).unwrap(),
            "https://yt.example.com/api/issues/DEMO-1%3Ffields=id/comments"
        );
        assert_eq!(
            client.issue_url("DEMO-1/comments", &[]).unwrap(),
            "https://yt.example.com/api/issues/DEMO-1%2Fcomments"
        );
    }

    #[test]
    fn test_issue_url_rejects_dot_segments() {
        let client = YouTrackClient::with_base_url("https://yt.example.com/api", "t").unwrap();

        for id in ["", " ", ".", ".."] {
            assert!(matches!(
                client.issue_url(id, &[]),
                Err(Error::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_error_message_extracts_description() {
        let body = r#"{"error":"Not Found","error_description":"Entity with id DEMO-9 not found"}"#;
        assert_eq!(error_message(body), "Entity with id DEMO-9 not found");
        assert_eq!(error_message(r#"{"error":"invalid_grant"}"#), "invalid_grant");
        assert_eq!(error_message("<html>oops</html>"), "<html>oops</html>");
    }

    #[test]
    fn test_shape_state_value() {
        let shaped = shape_update_value(Some("StateIssueCustomField"), json!("In Progress"));
        assert_eq!(shaped, json!({"name": "In Progress"}));
    }

    #[test]
    fn test_shape_multi_enum_value() {
        let shaped = shape_update_value(Some("MultiEnumIssueCustomField"), json!("Backend"));
        assert_eq!(shaped, json!([{"name": "Backend"}]));

        let shaped = shape_update_value(
            Some("MultiEnumIssueCustomField"),
            json!(["Backend", {"name": "UI"}]),
        );
        assert_eq!(shaped, json!([{"name": "Backend"}, {"name": "UI"}]));
    }

    #[test]
    fn test_shape_user_value() {
        let shaped = shape_update_value(Some("SingleUserIssueCustomField"), json!("jdoe"));
        assert_eq!(shaped, json!({"login": "jdoe"}));
    }

    #[test]
    fn test_shape_passes_through_other_values() {
        assert_eq!(
            shape_update_value(Some("SimpleIssueCustomField"), json!(42)),
            json!(42)
        );
        assert_eq!(
            shape_update_value(Some("StateIssueCustomField"), json!({"name": "Open"})),
            json!({"name": "Open"})
        );
        assert_eq!(shape_update_value(None, json!("x")), json!("x"));
    }

    #[test]
    fn test_map_timestamp() {
        let ts = map_timestamp(Some(1_672_574_400_000)).unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-01-01T12:00:00+00:00");
        assert!(map_timestamp(None).is_none());
    }

    #[test]
    fn test_map_user_prefers_full_name() {
        let user = YtUser {
            login: Some("jdoe".to_string()),
            name: Some("jdoe".to_string()),
            full_name: Some("John Doe".to_string()),
        };
        let mapped = map_user(Some(&user)).unwrap();
        assert_eq!(mapped.login, "jdoe");
        assert_eq!(mapped.name.as_deref(), Some("John Doe"));
        assert!(map_user(None).is_none());
    }

    #[test]
    fn test_map_link() {
        let link: YtIssueLink = serde_json::from_value(json!({
            "direction": "OUTWARD",
            "linkType": {"id": "1-1", "name": "Relates"},
            "issues": [{"id": "2-7", "idReadable": "DEMO-7", "summary": "Other"}]
        }))
        .unwrap();

        let mapped = map_link(&link);
        assert_eq!(mapped.link_type.as_deref(), Some("Relates"));
        assert_eq!(mapped.issues[0].id_readable.as_deref(), Some("DEMO-7"));
    }

    // =========================================================================
    // Integration tests with httpmock
    // =========================================================================

    mod integration {
        use super::*;
        use httpmock::prelude::*;

        fn create_client(server: &MockServer) -> YouTrackClient {
            YouTrackClient::with_base_url(server.base_url(), "perm:test").unwrap()
        }

        fn sample_issue_json() -> Value {
            json!({
                "id": "2-123",
                "idReadable": "DEMO-123",
                "summary": "Fix bug",
                "description": "Crash on save",
                "project": {"id": "0-1", "name": "Demo", "shortName": "DEMO"},
                "created": 1672574400000i64,
                "updated": 1672660800000i64,
                "reporter": {"login": "jdoe", "fullName": "John Doe"},
                "commentsCount": 1,
                "tags": [{"id": "6-1", "name": "bug"}],
                "customFields": [
                    {"id": "92-1", "name": "State", "$type": "StateIssueCustomField",
                     "value": {"id": "87-1", "name": "Open", "$type": "StateBundleElement"}}
                ]
            })
        }

        fn state_field_json(state: &str) -> Value {
            json!({
                "id": "92-1",
                "name": "State",
                "$type": "StateIssueCustomField",
                "value": {"id": "87-2", "name": state, "$type": "StateBundleElement"}
            })
        }

        #[tokio::test]
        async fn test_search_issues() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/issues")
                    .query_param("query", "project: DEMO #Unresolved")
                    .query_param_exists("fields")
                    .header("Authorization", "Bearer perm:test");
                then.status(200).json_body(json!([sample_issue_json()]));
            });

            let client = create_client(&server);
            let issues = client
                .search_issues("project: DEMO #Unresolved")
                .await
                .unwrap();

            mock.assert();
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].display_id(), "DEMO-123");
            assert_eq!(issues[0].summary.as_deref(), Some("Fix bug"));
            assert_eq!(issues[0].reporter.as_ref().unwrap().login, "jdoe");
            assert_eq!(issues[0].tags[0].name, "bug");
        }

        #[tokio::test]
        async fn test_search_issues_empty() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues");
                then.status(200).json_body(json!([]));
            });

            let client = create_client(&server);
            let issues = client.search_issues("project: NONE").await.unwrap();
            assert!(issues.is_empty());
        }

        #[tokio::test]
        async fn test_search_issues_bad_query() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues");
                then.status(400).json_body(json!({
                    "error": "bad_request",
                    "error_description": "Cannot parse search query"
                }));
            });

            let client = create_client(&server);
            match client.search_issues("project: (").await.unwrap_err() {
                Error::Api { status, message } => {
                    assert_eq!(status, 400);
                    assert_eq!(message, "Cannot parse search query");
                }
                other => panic!("Expected Api error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_get_issue() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-123");
                then.status(200).json_body(sample_issue_json());
            });

            let client = create_client(&server);
            let issue = client.get_issue("DEMO-123").await.unwrap();

            assert_eq!(issue.id, "2-123");
            assert_eq!(issue.comments_count, Some(1));
            assert_eq!(issue.project.unwrap().short_name.as_deref(), Some("DEMO"));
            assert_eq!(
                issue.created.unwrap().to_rfc3339(),
                "2023-01-01T12:00:00+00:00"
            );
        }

        #[tokio::test]
        async fn test_get_issue_not_found() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-999");
                then.status(404).json_body(json!({
                    "error": "Not Found",
                    "error_description": "Entity with id DEMO-999 not found"
                }));
            });

            let client = create_client(&server);
            let err = client.get_issue("DEMO-999").await.unwrap_err();
            assert!(matches!(err, Error::NotFound(_)));
            assert!(err.to_string().contains("DEMO-999"));
        }

        #[tokio::test]
        async fn test_unauthorized() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-1/comments");
                then.status(401).json_body(json!({"error": "Unauthorized"}));
            });

            let client = create_client(&server);
            let err = client.get_comments("DEMO-1").await.unwrap_err();
            assert!(matches!(err, Error::Auth(_)));
        }

        #[tokio::test]
        async fn test_get_custom_fields() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-123/customFields");
                then.status(200).json_body(json!([
                    state_field_json("Open"),
                    {"id": "92-2", "name": "Assignee", "$type": "SingleUserIssueCustomField",
                     "value": null}
                ]));
            });

            let client = create_client(&server);
            let fields = client.get_custom_fields("DEMO-123").await.unwrap();

            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].name, "State");
            assert_eq!(fields[0].value["name"], "Open");
            assert!(fields[1].value.is_null());
        }

        #[tokio::test]
        async fn test_get_comments() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-123/comments");
                then.status(200).json_body(json!([
                    {"id": "4-1", "text": "First", "created": 1672574400000i64,
                     "author": {"login": "jdoe", "fullName": "John Doe"}},
                    {"id": "4-2", "text": "Second", "created": 1672578000000i64,
                     "author": {"login": "asmith"}, "deleted": false}
                ]));
            });

            let client = create_client(&server);
            let comments = client.get_comments("DEMO-123").await.unwrap();

            assert_eq!(comments.len(), 2);
            assert_eq!(comments[0].text, "First");
            assert_eq!(comments[1].author.as_ref().unwrap().login, "asmith");
            assert_eq!(comments[1].deleted, Some(false));
        }

        #[tokio::test]
        async fn test_add_comment() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/issues/DEMO-123/comments")
                    .body_includes("\"text\":\"looks good\"");
                then.status(200).json_body(json!({
                    "id": "4-9",
                    "text": "looks good",
                    "created": 1672574400000i64,
                    "author": {"login": "bot"}
                }));
            });

            let client = create_client(&server);
            let comment = client.add_comment("DEMO-123", "looks good").await.unwrap();

            mock.assert();
            assert_eq!(comment.id, "4-9");
            assert_eq!(comment.text, "looks good");
        }

        #[tokio::test]
        async fn test_update_custom_field_by_name() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-123/customFields");
                then.status(200).json_body(json!([state_field_json("Open")]));
            });

            let update = server.mock(|when, then| {
                when.method(POST)
                    .path("/issues/DEMO-123/customFields/92-1")
                    .body_includes("\"$type\":\"StateIssueCustomField\"")
                    .body_includes("\"value\":{\"name\":\"In Progress\"}");
                then.status(200).json_body(state_field_json("In Progress"));
            });

            let client = create_client(&server);
            let field = client
                .update_custom_field("DEMO-123", "State", json!("In Progress"))
                .await
                .unwrap();

            update.assert();
            assert_eq!(field.value["name"], "In Progress");
        }

        #[tokio::test]
        async fn test_update_unknown_field() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-123/customFields");
                then.status(200).json_body(json!([state_field_json("Open")]));
            });

            let client = create_client(&server);
            let err = client
                .update_custom_field("DEMO-123", "Sprint", json!("42"))
                .await
                .unwrap_err();

            assert!(matches!(err, Error::NotFound(_)));
            assert!(err.to_string().contains("Sprint"));
        }

        #[tokio::test]
        async fn test_get_issue_links() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-123/links");
                then.status(200).json_body(json!([
                    {"direction": "BOTH", "linkType": {"name": "Relates"},
                     "issues": [{"id": "2-7", "idReadable": "DEMO-7", "summary": "Other"}]},
                    {"direction": "OUTWARD", "linkType": {"name": "Depend"}, "issues": []}
                ]));
            });

            let client = create_client(&server);
            let links = client.get_issue_links("DEMO-123").await.unwrap();

            assert_eq!(links.len(), 2);
            assert_eq!(links[0].issues.len(), 1);
            assert_eq!(links[1].direction.as_deref(), Some("OUTWARD"));
        }

        #[tokio::test]
        async fn test_tags() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/tags");
                then.status(200)
                    .json_body(json!([{"id": "6-1", "name": "bug"}, {"id": "6-2", "name": "ux"}]));
            });

            let add = server.mock(|when, then| {
                when.method(POST)
                    .path("/issues/DEMO-123/tags")
                    .body_includes("\"id\":\"6-2\"");
                then.status(200).json_body(json!({"id": "6-2", "name": "ux"}));
            });

            let client = create_client(&server);
            let tags = client.get_tags().await.unwrap();
            assert_eq!(tags.len(), 2);

            client.add_issue_tag("DEMO-123", &tags[1]).await.unwrap();
            add.assert();
        }

        #[tokio::test]
        async fn test_malformed_body() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-1");
                then.status(200).body("not json");
            });

            let client = create_client(&server);
            let err = client.get_issue("DEMO-1").await.unwrap_err();
            assert!(matches!(err, Error::InvalidData(_)));
        }

        #[tokio::test]
        async fn test_unknown_id_with_url_syntax_fails() {
            let server = MockServer::start();

            let issue_mock = server.mock(|when, then| {
                when.method(GET).path("/issues/DEMO-1");
                then.status(200).json_body(sample_issue_json());
            });
            let comment_mock = server.mock(|when, then| {
                when.method(POST).path("/issues/DEMO-1/comments");
                then.status(200).json_body(json!({"id": "4-1", "text": "hi"}));
            });

            let client = create_client(&server);

            assert!(client.get_issue("DEMO-1#NOPE-9").await.is_err());
            assert!(client.get_issue("DEMO-1?x=1").await.is_err());
            assert!(client.add_comment("DEMO-1#NOPE-9", "hi").await.is_err());
            assert!(client
                .update_custom_field("DEMO-1#NOPE-9", "State", json!("Open"))
                .await
                .is_err());

            issue_mock.assert_hits(0);
            comment_mock.assert_hits(0);
        }

        #[tokio::test]
        async fn test_connection_refused() {
            let client = YouTrackClient::with_base_url("http://127.0.0.1:1", "t").unwrap();
            let err = client.search_issues("x").await.unwrap_err();
            assert!(matches!(err, Error::Http(_)));
        }
    }
}
