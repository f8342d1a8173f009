//! Room and vote business logic on top of the record store.

mod membership;
mod results;
mod round;
mod sync;
mod voting;

pub use results::compute_results;

use crate::error::{PokerError, PokerResult};
use crate::jira::IssueTracker;
use crate::state::Store;
use crate::types::*;
use std::sync::Arc;

/// Longest accepted room id or display name
pub const MAX_NAME_LEN: usize = 64;

#[derive(Clone)]
pub struct RoomService {
    store: Arc<Store>,
    tracker: Arc<dyn IssueTracker>,
}

impl RoomService {
    pub fn new(store: Arc<Store>, tracker: Arc<dyn IssueTracker>) -> Self {
        Self { store, tracker }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn tracker(&self) -> &dyn IssueTracker {
        self.tracker.as_ref()
    }

    async fn require_room(&self, room_id: &str) -> PokerResult<Room> {
        self.store
            .get_room(room_id)
            .await
            .ok_or_else(|| PokerError::room_not_found(room_id))
    }

    /// Participant that exists and belongs to the given room
    async fn require_member(&self, room_id: &str, participant_id: &str) -> PokerResult<Participant> {
        self.store
            .get_participant(participant_id)
            .await
            .filter(|p| p.room_id == room_id)
            .ok_or_else(|| PokerError::participant_not_found(participant_id))
    }

    /// Resolve the acting participant and make sure they moderate the room
    async fn require_moderator(
        &self,
        room: &Room,
        actor: Option<&str>,
        action: &str,
    ) -> PokerResult<Participant> {
        let actor = actor.ok_or_else(|| {
            PokerError::Forbidden(format!("A moderator participant id is required to {}", action))
        })?;

        match self.store.get_participant(actor).await {
            Some(p) if p.room_id == room.id && p.is_active && p.is_moderator => Ok(p),
            _ => Err(PokerError::Forbidden(format!(
                "Only the moderator can {}",
                action
            ))),
        }
    }
}

/// Trim and check a display name
fn validate_name(name: &str) -> PokerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PokerError::validation("Name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(PokerError::validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn validate_round(round: RoundNo) -> PokerResult<RoundNo> {
    if round == 0 {
        return Err(PokerError::validation("Round numbers start at 1"));
    }
    Ok(round)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::jira::SimulatedTracker;

    pub fn service() -> RoomService {
        RoomService::new(Arc::new(Store::new()), Arc::new(SimulatedTracker::new()))
    }

    /// Room "R" with moderator A and voters B and C
    pub async fn seeded() -> (RoomService, Participant, Participant, Participant) {
        let service = service();
        service
            .create_room(CreateRoomRequest {
                id: Some("R".to_string()),
                moderator_id: "mod-token".to_string(),
                current_story: None,
                current_story_title: None,
                is_revealed: false,
            })
            .await
            .unwrap();

        let a = join(&service, "R", "A", true).await;
        let b = join(&service, "R", "B", false).await;
        let c = join(&service, "R", "C", false).await;
        (service, a, b, c)
    }

    pub async fn join(service: &RoomService, room: &str, name: &str, moderator: bool) -> Participant {
        service
            .join_room(
                room,
                JoinRoomRequest {
                    name: name.to_string(),
                    is_moderator: moderator,
                    is_active: true,
                },
            )
            .await
            .unwrap()
    }

    pub async fn vote(service: &RoomService, who: &Participant, value: &str) -> Vote {
        service
            .submit_vote(
                &who.room_id,
                SubmitVoteRequest {
                    participant_id: who.id.clone(),
                    value: value.to_string(),
                    round: DEFAULT_ROUND,
                },
            )
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Alice ").unwrap(), "Alice");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_validate_round() {
        assert!(validate_round(0).is_err());
        assert_eq!(validate_round(3).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_require_moderator() {
        let (service, a, b, _) = test_support::seeded().await;
        let room = service.require_room("R").await.unwrap();

        assert!(service
            .require_moderator(&room, Some(&a.id), "reveal votes")
            .await
            .is_ok());

        let err = service
            .require_moderator(&room, Some(&b.id), "reveal votes")
            .await
            .unwrap_err();
        assert!(matches!(err, PokerError::Forbidden(_)));
        assert!(err.to_string().contains("reveal votes"));

        assert!(matches!(
            service.require_moderator(&room, None, "reveal votes").await,
            Err(PokerError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_moderator_of_other_room_is_rejected() {
        let (service, _, _, _) = test_support::seeded().await;
        service
            .create_room(CreateRoomRequest {
                id: Some("OTHER".to_string()),
                moderator_id: "m2".to_string(),
                current_story: None,
                current_story_title: None,
                is_revealed: false,
            })
            .await
            .unwrap();
        let outsider = test_support::join(&service, "OTHER", "Zed", true).await;

        let room = service.require_room("R").await.unwrap();
        assert!(matches!(
            service
                .require_moderator(&room, Some(&outsider.id), "start a new round")
                .await,
            Err(PokerError::Forbidden(_))
        ));
    }
}
