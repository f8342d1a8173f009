use super::*;

/// Stand-in tracker used when no Jira credentials are configured.
/// Sync requests are logged and acknowledged without any network call.
#[derive(Debug, Default)]
pub struct SimulatedTracker;

impl SimulatedTracker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IssueTracker for SimulatedTracker {
    fn mode(&self) -> SyncMode {
        SyncMode::Simulation
    }

    async fn update_story_points(&self, update: StoryPointsUpdate) -> TrackerResult<SyncReceipt> {
        let field_id = update
            .field_id
            .clone()
            .unwrap_or_else(|| DEFAULT_STORY_POINTS_FIELD.to_string());
        let story_points = update.story_points();

        tracing::info!(
            story_id = %update.story_id,
            room_id = %update.room_id,
            average_points = update.average_points,
            story_points,
            "Jira sync simulated (no config), would be sent to Jira API"
        );

        Ok(SyncReceipt {
            mode: SyncMode::Simulation,
            message: "Story synced to Jira (simulation mode)".to_string(),
            room_id: update.room_id,
            story_id: update.story_id,
            average_points: update.average_points,
            story_points,
            field_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tracker_response: None,
        })
    }

    async fn test_connection(&self) -> TrackerResult<()> {
        Err(TrackerError::NotConfigured)
    }

    async fn custom_fields(&self) -> TrackerResult<Vec<TrackerField>> {
        Err(TrackerError::NotConfigured)
    }
}
