use super::{sort_participants, Store};
use crate::types::*;

impl Store {
    /// Add a participant under a freshly generated id
    pub async fn add_participant(&self, new: NewParticipant) -> Participant {
        let participant = Participant {
            id: ulid::Ulid::new().to_string(),
            room_id: new.room_id,
            name: new.name,
            is_moderator: new.is_moderator,
            is_active: new.is_active,
            joined_at: chrono::Utc::now(),
        };

        self.participants
            .write()
            .await
            .insert(participant.id.clone(), participant.clone());
        participant
    }

    pub async fn get_participant(&self, id: &str) -> Option<Participant> {
        self.participants.read().await.get(id).cloned()
    }

    /// Active participants of a room
    pub async fn get_participants_by_room(&self, room_id: &str) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self
            .participants
            .read()
            .await
            .values()
            .filter(|p| p.room_id == room_id && p.is_active)
            .cloned()
            .collect();
        sort_participants(&mut participants);
        participants
    }

    pub async fn update_participant(
        &self,
        id: &str,
        update: ParticipantUpdate,
    ) -> Option<Participant> {
        let mut participants = self.participants.write().await;
        let participant = participants.get_mut(id)?;

        if let Some(name) = update.name {
            participant.name = name;
        }
        if let Some(active) = update.is_active {
            participant.is_active = active;
        }

        Some(participant.clone())
    }

    /// Delete a participant together with every vote they cast, in any room
    /// or round. Returns the removed record.
    pub async fn remove_participant(&self, id: &str) -> Option<Participant> {
        let mut participants = self.participants.write().await;
        let mut votes = self.votes.write().await;

        let removed = participants.remove(id);
        let before = votes.len();
        votes.retain(|_, v| v.participant_id != id);

        tracing::debug!(
            "Removed participant {} and {} of their votes",
            id,
            before - votes.len()
        );
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::new_room;

    fn joiner(room_id: &str, name: &str, is_moderator: bool) -> NewParticipant {
        NewParticipant {
            room_id: room_id.to_string(),
            name: name.to_string(),
            is_moderator,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_add_participant_generates_unique_ids() {
        let store = Store::new();
        store.create_room(new_room("r1")).await.unwrap();

        let a = store.add_participant(joiner("r1", "Alice", true)).await;
        let b = store.add_participant(joiner("r1", "Bob", false)).await;

        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
        assert!(a.is_moderator);
        assert_eq!(store.get_participant(&b.id).await, Some(b));
    }

    #[tokio::test]
    async fn test_participants_by_room_filters_room_and_active() {
        let store = Store::new();
        store.create_room(new_room("r1")).await.unwrap();
        store.create_room(new_room("r2")).await.unwrap();

        let alice = store.add_participant(joiner("r1", "Alice", false)).await;
        let bob = store.add_participant(joiner("r1", "Bob", false)).await;
        store.add_participant(joiner("r2", "Carol", false)).await;

        store
            .update_participant(
                &bob.id,
                ParticipantUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let in_room = store.get_participants_by_room("r1").await;
        assert_eq!(in_room.len(), 1);
        assert_eq!(in_room[0].id, alice.id);
    }

    #[tokio::test]
    async fn test_update_participant_renames() {
        let store = Store::new();
        let p = store.add_participant(joiner("r1", "Alice", false)).await;

        let updated = store
            .update_participant(
                &p.id,
                ParticipantUpdate {
                    name: Some("Alicia".to_string()),
                    is_active: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Alicia");
        assert!(updated.is_active);

        assert!(store
            .update_participant("nobody", ParticipantUpdate::default())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_remove_participant_cascades_votes() {
        let store = Store::new();
        let alice = store.add_participant(joiner("r1", "Alice", false)).await;
        let bob = store.add_participant(joiner("r1", "Bob", false)).await;

        for round in 1..=2 {
            store
                .submit_vote(NewVote {
                    room_id: "r1".to_string(),
                    participant_id: alice.id.clone(),
                    value: "3".to_string(),
                    round,
                })
                .await;
        }
        // Same participant id in another room is swept as well
        store
            .submit_vote(NewVote {
                room_id: "r2".to_string(),
                participant_id: alice.id.clone(),
                value: "5".to_string(),
                round: 1,
            })
            .await;
        store
            .submit_vote(NewVote {
                room_id: "r1".to_string(),
                participant_id: bob.id.clone(),
                value: "8".to_string(),
                round: 1,
            })
            .await;

        let removed = store.remove_participant(&alice.id).await;
        assert_eq!(removed.map(|p| p.id), Some(alice.id.clone()));
        assert!(store.get_participant(&alice.id).await.is_none());

        let votes = store.votes.read().await;
        assert_eq!(votes.len(), 1);
        assert!(votes.values().all(|v| v.participant_id == bob.id));
    }

    #[tokio::test]
    async fn test_remove_unknown_participant_is_noop() {
        let store = Store::new();
        assert!(store.remove_participant("ghost").await.is_none());
    }
}
