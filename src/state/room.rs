use super::{sort_participants, Store};
use crate::error::{PokerError, PokerResult};
use crate::types::*;

impl Store {
    /// Insert a room under the caller's id. An existing id is never overwritten.
    pub async fn create_room(&self, new: NewRoom) -> PokerResult<Room> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&new.id) {
            return Err(PokerError::Conflict(format!(
                "Room {} already exists",
                new.id
            )));
        }

        let room = Room {
            id: new.id,
            moderator_id: new.moderator_id,
            current_story: new.current_story,
            current_story_title: new.current_story_title,
            is_revealed: new.is_revealed,
            created_at: chrono::Utc::now(),
        };
        rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    pub async fn get_room(&self, id: &str) -> Option<Room> {
        self.rooms.read().await.get(id).cloned()
    }

    /// Room with its active participants and the votes of all rounds
    pub async fn get_room_with_participants(&self, id: &str) -> Option<RoomWithParticipants> {
        let rooms = self.rooms.read().await;
        let room = rooms.get(id)?.clone();
        let participants = self.participants.read().await;
        let votes = self.votes.read().await;

        let mut room_participants: Vec<Participant> = participants
            .values()
            .filter(|p| p.room_id == id && p.is_active)
            .cloned()
            .collect();
        sort_participants(&mut room_participants);

        let mut room_votes: Vec<Vote> = votes
            .values()
            .filter(|v| v.room_id == id)
            .cloned()
            .collect();
        room_votes.sort_by_key(|v| v.id);

        Some(RoomWithParticipants {
            room,
            participants: room_participants,
            votes: room_votes,
        })
    }

    /// Merge the present fields of `update` into the room
    pub async fn update_room(&self, id: &str, update: RoomUpdate) -> Option<Room> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(id)?;

        if let Some(story) = update.current_story {
            room.current_story = story;
        }
        if let Some(title) = update.current_story_title {
            room.current_story_title = title;
        }
        if let Some(revealed) = update.is_revealed {
            room.is_revealed = revealed;
        }

        Some(room.clone())
    }
}
