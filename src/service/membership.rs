use super::{validate_name, RoomService, MAX_NAME_LEN};
use crate::error::{PokerError, PokerResult};
use crate::types::*;
use rand::Rng;

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;

/// Generate a random short room code
fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

fn validate_room_id(id: &str) -> PokerResult<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(PokerError::validation("Room id must not be empty"));
    }
    if id.chars().count() > MAX_NAME_LEN || id.contains('/') {
        return Err(PokerError::validation(format!(
            "Room id must be at most {} characters and must not contain '/'",
            MAX_NAME_LEN
        )));
    }
    Ok(id.to_string())
}

impl RoomService {
    /// Create a room under the caller's id, or under a generated code when
    /// the caller did not pick one
    pub async fn create_room(&self, req: CreateRoomRequest) -> PokerResult<Room> {
        let moderator_id = req.moderator_id.trim().to_string();
        if moderator_id.is_empty() {
            return Err(PokerError::validation("moderatorId is required"));
        }

        let new_room = |id: String| NewRoom {
            id,
            moderator_id: moderator_id.clone(),
            current_story: req.current_story.clone(),
            current_story_title: req.current_story_title.clone(),
            is_revealed: req.is_revealed,
        };

        let room = match req.id.as_deref() {
            Some(id) => {
                let id = validate_room_id(id)?;
                self.store.create_room(new_room(id)).await?
            }
            None => loop {
                match self.store.create_room(new_room(generate_room_code())).await {
                    Ok(room) => break room,
                    // Collision - try again (extremely rare with ~887M combinations)
                    Err(PokerError::Conflict(_)) => continue,
                    Err(e) => return Err(e),
                }
            },
        };

        tracing::info!("Created room {} (moderator {})", room.id, room.moderator_id);
        Ok(room)
    }

    /// Room with active participants and all votes
    pub async fn room_details(&self, room_id: &str) -> PokerResult<RoomWithParticipants> {
        self.store
            .get_room_with_participants(room_id)
            .await
            .ok_or_else(|| PokerError::room_not_found(room_id))
    }

    pub async fn join_room(&self, room_id: &str, req: JoinRoomRequest) -> PokerResult<Participant> {
        self.require_room(room_id).await?;
        let name = validate_name(&req.name)?;

        let participant = self
            .store
            .add_participant(NewParticipant {
                room_id: room_id.to_string(),
                name,
                is_moderator: req.is_moderator,
                is_active: req.is_active,
            })
            .await;

        tracing::info!(
            "{} joined room {} as {} ({})",
            participant.name,
            room_id,
            if participant.is_moderator {
                "moderator"
            } else {
                "voter"
            },
            participant.id
        );
        Ok(participant)
    }

    pub async fn list_participants(&self, room_id: &str) -> PokerResult<Vec<Participant>> {
        self.require_room(room_id).await?;
        Ok(self.store.get_participants_by_room(room_id).await)
    }

    /// Rename a participant or toggle whether they count as present
    pub async fn update_participant(
        &self,
        room_id: &str,
        participant_id: &str,
        mut update: ParticipantUpdate,
    ) -> PokerResult<Participant> {
        self.require_room(room_id).await?;
        self.require_member(room_id, participant_id).await?;

        if let Some(name) = update.name.as_deref() {
            update.name = Some(validate_name(name)?);
        }

        self.store
            .update_participant(participant_id, update)
            .await
            .ok_or_else(|| PokerError::participant_not_found(participant_id))
    }

    /// Remove a participant from the room along with all of their votes
    pub async fn leave_room(&self, room_id: &str, participant_id: &str) -> PokerResult<Participant> {
        self.require_member(room_id, participant_id).await?;

        let removed = self
            .store
            .remove_participant(participant_id)
            .await
            .ok_or_else(|| PokerError::participant_not_found(participant_id))?;

        tracing::info!("{} left room {} ({})", removed.name, room_id, removed.id);
        Ok(removed)
    }
}
