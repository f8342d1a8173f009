use super::*;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Method, StatusCode, Url};
use serde_json::{json, Value};

/// Jira Cloud REST (v3) client
pub struct JiraClient {
    config: JiraConfig,
    client: reqwest::Client,
    auth_header: String,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build Jira HTTP client ({}), using defaults", e);
                reqwest::Client::new()
            });
        let auth_header = basic_auth_header(&config.email, &config.api_token);

        Self {
            config,
            client,
            auth_header,
        }
    }

    /// Build `{base}/rest/api/3/{segments..}`. Each segment is percent-encoded
    /// on its own, so a `/` or `?` inside a key cannot change the path.
    fn url(&self, segments: &[&str]) -> TrackerResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| TrackerError::Request(format!("Invalid JIRA_BASE_URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| TrackerError::Request("JIRA_BASE_URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["rest", "api", "3"])
            .extend(segments);
        Ok(url)
    }

    async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> TrackerResult<Value> {
        let url = self.url(segments)?;
        tracing::debug!("Jira {} {}", method, url.path());

        let mut request = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TrackerError::Timeout(self.config.timeout)
            } else {
                TrackerError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // Issue updates answer 204 with an empty body
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = response
            .text()
            .await
            .map_err(|e| TrackerError::Request(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| TrackerError::Parse(e.to_string()))
    }

    /// Fetch an issue; fails if it does not exist or is not visible
    pub async fn get_issue(&self, issue_key: &str) -> TrackerResult<Value> {
        if !is_issue_key(issue_key) {
            return Err(TrackerError::InvalidKey(issue_key.to_string()));
        }
        self.request(Method::GET, &["issue", issue_key], None).await
    }

    /// Fetch project details; used to check the configured project exists
    pub async fn get_project(&self, project_key: &str) -> TrackerResult<Value> {
        if !is_project_key(project_key) {
            return Err(TrackerError::InvalidKey(project_key.to_string()));
        }
        self.request(Method::GET, &["project", project_key], None)
            .await
    }
}

fn basic_auth_header(email: &str, token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", email, token)))
}

/// Keep custom fields that look like story point fields
fn story_fields(fields: Vec<TrackerField>) -> Vec<TrackerField> {
    fields
        .into_iter()
        .filter(|f| f.custom && f.name.to_lowercase().contains("story"))
        .collect()
}

#[async_trait]
impl IssueTracker for JiraClient {
    fn mode(&self) -> SyncMode {
        SyncMode::Real
    }

    async fn update_story_points(&self, update: StoryPointsUpdate) -> TrackerResult<SyncReceipt> {
        // Verify the issue first so a typo'd key yields a clear error
        self.get_issue(&update.story_id).await?;

        let field_id = update
            .field_id
            .clone()
            .unwrap_or_else(|| self.config.story_points_field.clone());
        let story_points = update.story_points();
        let mut fields = serde_json::Map::new();
        fields.insert(field_id.clone(), json!(story_points));
        let payload = json!({ "fields": fields });

        let response = self
            .request(Method::PUT, &["issue", update.story_id.as_str()], Some(payload))
            .await?;

        tracing::info!(
            "Synced {} story points to Jira issue {} (room {})",
            story_points,
            update.story_id,
            update.room_id
        );

        Ok(SyncReceipt {
            mode: SyncMode::Real,
            message: format!(
                "Successfully updated story points for {}",
                update.story_id
            ),
            room_id: update.room_id,
            story_id: update.story_id,
            average_points: update.average_points,
            story_points,
            field_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tracker_response: Some(response),
        })
    }

    async fn test_connection(&self) -> TrackerResult<()> {
        self.request(Method::GET, &["myself"], None).await?;
        if let Some(key) = &self.config.project_key {
            self.get_project(key).await?;
        }
        Ok(())
    }

    async fn custom_fields(&self) -> TrackerResult<Vec<TrackerField>> {
        let value = self.request(Method::GET, &["field"], None).await?;
        let fields: Vec<TrackerField> =
            serde_json::from_value(value).map_err(|e| TrackerError::Parse(e.to_string()))?;
        Ok(story_fields(fields))
    }
}
