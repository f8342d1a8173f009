use super::Store;
use crate::types::*;

impl Store {
    /// Record a vote, replacing any earlier vote of the same participant in
    /// the same room and round. Empty values are stored too (withdrawal).
    pub async fn submit_vote(&self, new: NewVote) -> Vote {
        let mut votes = self.votes.write().await;

        votes.retain(|_, v| {
            !(v.room_id == new.room_id
                && v.participant_id == new.participant_id
                && v.round == new.round)
        });

        let vote = Vote {
            id: self.allocate_vote_id(),
            room_id: new.room_id,
            participant_id: new.participant_id,
            value: new.value,
            round: new.round,
            created_at: chrono::Utc::now(),
        };
        votes.insert(vote.id, vote.clone());
        vote
    }

    /// Record a vote only while the participant is an active member of the
    /// room. The participants read lock is held until the vote is stored, so
    /// a concurrent removal either runs first or sweeps the new vote.
    pub async fn submit_member_vote(&self, new: NewVote) -> Option<Vote> {
        let participants = self.participants.read().await;
        let is_member = participants
            .get(&new.participant_id)
            .is_some_and(|p| p.room_id == new.room_id && p.is_active);
        if !is_member {
            return None;
        }

        let vote = self.submit_vote(new).await;
        drop(participants);
        Some(vote)
    }

    /// Votes of one round in a room, oldest first
    pub async fn get_votes_by_room(&self, room_id: &str, round: RoundNo) -> Vec<Vote> {
        let mut votes: Vec<Vote> = self
            .votes
            .read()
            .await
            .values()
            .filter(|v| v.room_id == room_id && v.round == round)
            .cloned()
            .collect();
        votes.sort_by_key(|v| v.id);
        votes
    }

    pub async fn get_participant_vote(
        &self,
        room_id: &str,
        participant_id: &str,
        round: RoundNo,
    ) -> Option<Vote> {
        self.votes
            .read()
            .await
            .values()
            .find(|v| v.room_id == room_id && v.participant_id == participant_id && v.round == round)
            .cloned()
    }

    /// Delete every vote of a room's round. Returns how many were removed.
    pub async fn clear_votes(&self, room_id: &str, round: RoundNo) -> usize {
        let mut votes = self.votes.write().await;
        let before = votes.len();
        votes.retain(|_, v| !(v.room_id == room_id && v.round == round));
        before - votes.len()
    }
}
