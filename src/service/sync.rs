use super::RoomService;
use crate::error::{PokerError, PokerResult};
use crate::jira::{is_issue_key, StoryPointsUpdate, SyncReceipt, TrackerField};
use crate::types::*;

impl RoomService {
    /// Push a final estimate to the issue tracker.
    ///
    /// The story id falls back to the room's current story.
    pub async fn sync_estimate(
        &self,
        room_id: &str,
        actor: Option<&str>,
        req: SyncEstimateRequest,
    ) -> PokerResult<SyncReceipt> {
        let room = self.require_room(room_id).await?;
        self.require_moderator(&room, actor, "sync estimates")
            .await?;

        let story_id = req
            .story_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                room.current_story
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .ok_or_else(|| PokerError::validation("Story ID and average points are required"))?;

        if !is_issue_key(&story_id) {
            return Err(PokerError::validation(format!(
                "'{}' is not a Jira issue key (expected e.g. PROJ-123)",
                story_id
            )));
        }

        if !req.average_points.is_finite() {
            return Err(PokerError::validation("averagePoints must be a finite number"));
        }

        let update = StoryPointsUpdate {
            room_id: room_id.to_string(),
            story_id,
            average_points: req.average_points,
            field_id: req.field_id.filter(|f| !f.trim().is_empty()),
        };

        match self.tracker.update_story_points(update).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                tracing::error!("Jira sync failed for room {}: {}", room_id, e);
                Err(e.into())
            }
        }
    }

    pub async fn tracker_connection(&self) -> PokerResult<()> {
        Ok(self.tracker.test_connection().await?)
    }

    pub async fn tracker_fields(&self) -> PokerResult<Vec<TrackerField>> {
        Ok(self.tracker.custom_fields().await?)
    }
}
