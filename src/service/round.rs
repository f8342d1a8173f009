use super::{validate_round, RoomService};
use crate::error::{PokerError, PokerResult};
use crate::types::*;

impl RoomService {
    /// Apply a moderator's room update.
    ///
    /// Changing the story hides the votes again unless the same update
    /// reveals them. Revealing needs at least one active voter.
    pub async fn update_room(
        &self,
        room_id: &str,
        actor: Option<&str>,
        mut update: RoomUpdate,
    ) -> PokerResult<Room> {
        let room = self.require_room(room_id).await?;
        self.require_moderator(&room, actor, "update the room").await?;

        if update.is_empty() {
            return Ok(room);
        }

        if update.touches_story() && update.is_revealed != Some(true) {
            update.is_revealed = Some(false);
        }

        if update.is_revealed == Some(true) {
            let voters = self
                .store
                .get_participants_by_room(room_id)
                .await
                .iter()
                .filter(|p| p.is_voter())
                .count();
            if voters == 0 {
                return Err(PokerError::validation(
                    "Cannot reveal votes without at least one non-moderator participant",
                ));
            }
        }

        let revealed = update.is_revealed;
        let room = self
            .store
            .update_room(room_id, update)
            .await
            .ok_or_else(|| PokerError::room_not_found(room_id))?;

        match revealed {
            Some(true) => tracing::info!("Votes revealed in room {}", room_id),
            Some(false) => tracing::info!("Votes hidden in room {}", room_id),
            None => {}
        }
        Ok(room)
    }

    /// Point the room at a new story. Votes are left alone.
    pub async fn set_story(
        &self,
        room_id: &str,
        actor: Option<&str>,
        story: Option<String>,
        title: Option<String>,
    ) -> PokerResult<Room> {
        let room = self
            .update_room(
                room_id,
                actor,
                RoomUpdate {
                    current_story: Some(story),
                    current_story_title: Some(title),
                    is_revealed: None,
                },
            )
            .await?;

        tracing::info!(
            "Room {} now estimating {}",
            room_id,
            room.current_story.as_deref().unwrap_or("<no story>")
        );
        Ok(room)
    }

    pub async fn reveal(&self, room_id: &str, actor: Option<&str>) -> PokerResult<Room> {
        self.update_room(
            room_id,
            actor,
            RoomUpdate {
                is_revealed: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    /// Clear a round's votes and hide results. The round defaults to 1 and is
    /// never advanced automatically. Returns the number of votes cleared.
    pub async fn new_round(
        &self,
        room_id: &str,
        actor: Option<&str>,
        round: Option<RoundNo>,
    ) -> PokerResult<usize> {
        let room = self.require_room(room_id).await?;
        self.require_moderator(&room, actor, "start a new round")
            .await?;
        let round = validate_round(round.unwrap_or(DEFAULT_ROUND))?;

        let cleared = self.store.clear_votes(room_id, round).await;
        self.store
            .update_room(
                room_id,
                RoomUpdate {
                    is_revealed: Some(false),
                    ..Default::default()
                },
            )
            .await
            .ok_or_else(|| PokerError::room_not_found(room_id))?;

        tracing::info!(
            "New round in room {}: cleared {} votes of round {}",
            room_id,
            cleared,
            round
        );
        Ok(cleared)
    }
}
