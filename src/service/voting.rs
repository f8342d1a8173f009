use super::{validate_round, RoomService};
use crate::error::{PokerError, PokerResult};
use crate::types::*;

impl RoomService {
    /// Cast, change or withdraw (empty value) a participant's vote for a round
    pub async fn submit_vote(&self, room_id: &str, req: SubmitVoteRequest) -> PokerResult<Vote> {
        self.require_room(room_id).await?;
        let round = validate_round(req.round)?;

        if !req.value.is_empty() && !is_card(&req.value) {
            return Err(PokerError::validation(format!(
                "'{}' is not a card in the deck ({})",
                req.value,
                CARD_DECK.join(", ")
            )));
        }

        let participant = self.require_member(room_id, &req.participant_id).await?;
        if !participant.is_active {
            return Err(PokerError::validation(format!(
                "{} is not active in this room",
                participant.name
            )));
        }

        // Membership is checked again under the store locks; the participant
        // may have left since the lookup above
        let vote = self
            .store
            .submit_member_vote(NewVote {
                room_id: room_id.to_string(),
                participant_id: participant.id,
                value: req.value,
                round,
            })
            .await
            .ok_or_else(|| PokerError::participant_not_found(&req.participant_id))?;

        if vote.is_cast() {
            tracing::debug!("{} voted in room {} round {}", participant.name, room_id, round);
        } else {
            tracing::debug!(
                "{} withdrew their vote in room {} round {}",
                participant.name,
                room_id,
                round
            );
        }
        Ok(vote)
    }

    pub async fn list_votes(&self, room_id: &str, round: RoundNo) -> PokerResult<Vec<Vote>> {
        self.require_room(room_id).await?;
        let round = validate_round(round)?;
        Ok(self.store.get_votes_by_room(room_id, round).await)
    }

    pub async fn participant_vote(
        &self,
        room_id: &str,
        participant_id: &str,
        round: RoundNo,
    ) -> PokerResult<Option<Vote>> {
        self.require_room(room_id).await?;
        let round = validate_round(round)?;
        Ok(self
            .store
            .get_participant_vote(room_id, participant_id, round)
            .await)
    }

    /// Who is expected to vote in a round and who already has.
    /// Moderators are not voters; empty votes do not count as voted.
    pub async fn voting_status(&self, room_id: &str, round: RoundNo) -> PokerResult<VotingStatus> {
        let room = self.require_room(room_id).await?;
        let round = validate_round(round)?;
        let participants = self.store.get_participants_by_room(room_id).await;
        let votes = self.store.get_votes_by_room(room_id, round).await;

        let voters: Vec<VoterStatus> = participants
            .iter()
            .filter(|p| p.is_voter())
            .map(|p| VoterStatus {
                participant_id: p.id.clone(),
                name: p.name.clone(),
                has_voted: votes
                    .iter()
                    .any(|v| v.participant_id == p.id && v.is_cast()),
            })
            .collect();

        Ok(VotingStatus {
            round,
            is_revealed: room.is_revealed,
            voter_count: voters.len(),
            voted_count: voters.iter().filter(|v| v.has_voted).count(),
            voters,
        })
    }
}
