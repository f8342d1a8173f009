//! Outbound sync of final estimates to a Jira issue tracker.
//!
//! A real REST client is used when credentials are configured; otherwise a
//! simulated tracker stands in and no network call is made.

mod client;
mod simulation;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub use client::JiraClient;
pub use simulation::SimulatedTracker;

/// Custom field most Jira Cloud instances use for story points
pub const DEFAULT_STORY_POINTS_FIELD: &str = "customfield_10016";

pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Jira not configured. Set JIRA_BASE_URL, JIRA_EMAIL, and JIRA_API_TOKEN environment variables.")]
    NotConfigured,

    #[error("Jira API Error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Jira request failed: {0}")]
    Request(String),

    #[error("Jira request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to parse Jira response: {0}")]
    Parse(String),

    #[error("Not a valid Jira key: {0}")]
    InvalidKey(String),
}

/// Jira project key, e.g. `PROJ` or `WEB_2`
pub fn is_project_key(key: &str) -> bool {
    let mut bytes = key.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Jira issue key (`PROJ-123`) or numeric issue id
pub fn is_issue_key(key: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if all_digits(key) {
        return true;
    }
    match key.rsplit_once('-') {
        Some((project, number)) => is_project_key(project) && all_digits(number),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Simulation,
    Real,
}

/// Estimate to write into an issue
#[derive(Debug, Clone)]
pub struct StoryPointsUpdate {
    pub room_id: String,
    pub story_id: String,
    pub average_points: f64,
    pub field_id: Option<String>,
}

impl StoryPointsUpdate {
    /// Whole story points sent to the tracker (halves round up)
    pub fn story_points(&self) -> i64 {
        (self.average_points + 0.5).floor() as i64
    }
}

/// What the tracker reported back after a sync
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncReceipt {
    pub mode: SyncMode,
    pub room_id: String,
    pub story_id: String,
    pub average_points: f64,
    pub story_points: i64,
    pub field_id: String,
    pub timestamp: String,
    pub message: String,
    /// Raw body of the update call (real mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_response: Option<serde_json::Value>,
}

/// A custom field that may hold story points
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackerField {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub custom: bool,
}

/// Issue trackers that can receive estimates
#[async_trait]
pub trait IssueTracker: Send + Sync {
    fn mode(&self) -> SyncMode;

    /// Write the rounded estimate into the issue's story points field
    async fn update_story_points(&self, update: StoryPointsUpdate) -> TrackerResult<SyncReceipt>;

    /// Check credentials against the tracker
    async fn test_connection(&self) -> TrackerResult<()>;

    /// Custom fields whose name mentions "story"
    async fn custom_fields(&self) -> TrackerResult<Vec<TrackerField>>;
}

/// Jira connection settings
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub project_key: Option<String>,
    pub story_points_field: String,
    pub timeout: Duration,
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl JiraConfig {
    /// Load from JIRA_* environment variables.
    /// Returns None unless base URL, email and API token are all set and valid.
    pub fn from_env() -> Option<Self> {
        let base_url = env_value("JIRA_BASE_URL");
        let email = env_value("JIRA_EMAIL");
        let api_token = env_value("JIRA_API_TOKEN");

        let (Some(base_url), Some(email), Some(api_token)) = (base_url, email, api_token) else {
            return None;
        };

        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            api_token,
            project_key: env_value("JIRA_PROJECT_KEY"),
            story_points_field: env_value("JIRA_STORY_POINTS_FIELD")
                .unwrap_or_else(|| DEFAULT_STORY_POINTS_FIELD.to_string()),
            timeout: env_value("JIRA_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
        };

        match config.validate() {
            Ok(()) => Some(config),
            Err(e) => {
                tracing::error!("Invalid Jira configuration: {}", e);
                None
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("JIRA_BASE_URL is not an http(s) URL: {}", self.base_url));
        }
        if !self.email.contains('@') {
            return Err(format!("JIRA_EMAIL is not an email address: {}", self.email));
        }
        if let Some(key) = &self.project_key {
            if !is_project_key(key) {
                return Err(format!("JIRA_PROJECT_KEY is not a project key: {}", key));
            }
        }
        Ok(())
    }
}

/// Pick the tracker implementation for the given configuration
pub fn build_tracker(config: Option<JiraConfig>) -> Arc<dyn IssueTracker> {
    match config {
        Some(config) => {
            tracing::info!("Jira sync enabled for {}", config.base_url);
            Arc::new(JiraClient::new(config))
        }
        None => {
            tracing::warn!(
                "Jira sync running in simulation mode - set JIRA_BASE_URL, JIRA_EMAIL, and JIRA_API_TOKEN for real sync"
            );
            Arc::new(SimulatedTracker::new())
        }
    }
}
