use super::{validate_round, RoomService};
use crate::error::PokerResult;
use crate::types::*;

/// Numeric weight of a card, if it has one
fn numeric_value(value: &str) -> Option<f64> {
    if value == PASS_CARD || value == INFINITY_CARD {
        return None;
    }
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to one decimal place, halves going up
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Aggregate one round's votes.
///
/// Only non-empty votes of active, non-moderator participants are counted.
/// "pass", "infinity" and non-numeric values count as participation but are
/// left out of the average and the consensus.
pub fn compute_results(participants: &[Participant], votes: &[Vote]) -> RoomResults {
    // A vote whose participant cannot be found has no known role and is dropped
    let counted: Vec<(&Vote, &Participant)> = votes
        .iter()
        .filter(|v| v.is_cast())
        .filter_map(|v| {
            let participant = participants.iter().find(|p| p.id == v.participant_id)?;
            participant.is_voter().then_some((v, participant))
        })
        .collect();

    let vote_results: Vec<VoteResult> = counted
        .iter()
        .map(|(vote, participant)| VoteResult {
            participant_id: vote.participant_id.clone(),
            participant_name: participant.name.clone(),
            value: vote.value.clone(),
        })
        .collect();

    let numeric: Vec<f64> = counted
        .iter()
        .filter_map(|(vote, _)| numeric_value(&vote.value))
        .collect();

    let average = if numeric.is_empty() {
        0.0
    } else {
        numeric.iter().sum::<f64>() / numeric.len() as f64
    };

    let mut distinct = numeric.clone();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();

    RoomResults {
        average: round_to_tenth(average),
        participants: vote_results.len(),
        consensus: Consensus::from_distinct_values(distinct.len()),
        votes: vote_results,
    }
}

impl RoomService {
    /// Aggregated results of a room's round
    pub async fn results(&self, room_id: &str, round: RoundNo) -> PokerResult<RoomResults> {
        self.require_room(room_id).await?;
        let round = validate_round(round)?;
        let participants = self.store.get_participants_by_room(room_id).await;
        let votes = self.store.get_votes_by_room(room_id, round).await;

        Ok(compute_results(&participants, &votes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{seeded, vote};
    use chrono::Utc;

    fn participant(id: &str, moderator: bool, active: bool) -> Participant {
        Participant {
            id: id.to_string(),
            room_id: "R".to_string(),
            name: id.to_uppercase(),
            is_moderator: moderator,
            is_active: active,
            joined_at: Utc::now(),
        }
    }

    fn cast(id: VoteId, participant: &str, value: &str) -> Vote {
        Vote {
            id,
            room_id: "R".to_string(),
            participant_id: participant.to_string(),
            value: value.to_string(),
            round: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value("5"), Some(5.0));
        assert_eq!(numeric_value("0.5"), Some(0.5));
        assert_eq!(numeric_value("0"), Some(0.0));
        assert_eq!(numeric_value("pass"), None);
        assert_eq!(numeric_value("infinity"), None);
        assert_eq!(numeric_value("inf"), None);
        assert_eq!(numeric_value("NaN"), None);
        assert_eq!(numeric_value("coffee"), None);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(6.5), 6.5);
        assert_eq!(round_to_tenth(0.75), 0.8);
        assert_eq!(round_to_tenth(16.0 / 3.0), 5.3);
        assert_eq!(round_to_tenth(0.0), 0.0);
    }

    #[test]
    fn test_empty_round() {
        let results = compute_results(&[participant("b", false, true)], &[]);
        assert_eq!(results.average, 0.0);
        assert_eq!(results.participants, 0);
        assert_eq!(results.consensus, Consensus::High);
        assert!(results.votes.is_empty());
    }

    #[test]
    fn test_moderator_and_inactive_votes_excluded() {
        let participants = vec![
            participant("a", true, true),
            participant("b", false, true),
            participant("c", false, false),
        ];
        let votes = vec![cast(1, "a", "13"), cast(2, "b", "3"), cast(3, "c", "8")];

        let results = compute_results(&participants, &votes);
        assert_eq!(results.participants, 1);
        assert_eq!(results.average, 3.0);
        assert_eq!(results.votes[0].participant_name, "B");
    }

    #[test]
    fn test_votes_of_departed_participants_excluded() {
        let participants = vec![participant("b", false, true)];
        let votes = vec![cast(1, "b", "5"), cast(2, "gone", "8")];

        let results = compute_results(&participants, &votes);
        assert_eq!(results.participants, 1);
        assert_eq!(results.average, 5.0);
    }

    #[test]
    fn test_consensus_counts_distinct_numeric_values() {
        let participants: Vec<_> = ["b", "c", "d", "e", "f"]
            .iter()
            .map(|id| participant(id, false, true))
            .collect();

        // Non-numeric cards do not add distinct values
        let votes = vec![
            cast(1, "b", "5"),
            cast(2, "c", "5"),
            cast(3, "d", "pass"),
            cast(4, "e", "infinity"),
        ];
        let results = compute_results(&participants, &votes);
        assert_eq!(results.consensus, Consensus::High);
        assert_eq!(results.participants, 4);
        assert_eq!(results.average, 5.0);

        let votes = vec![
            cast(1, "b", "1"),
            cast(2, "c", "2"),
            cast(3, "d", "3"),
            cast(4, "e", "3"),
        ];
        assert_eq!(
            compute_results(&participants, &votes).consensus,
            Consensus::Medium
        );

        let votes = vec![
            cast(1, "b", "1"),
            cast(2, "c", "2"),
            cast(3, "d", "3"),
            cast(4, "e", "5"),
            cast(5, "f", "8"),
        ];
        let results = compute_results(&participants, &votes);
        assert_eq!(results.consensus, Consensus::Low);
        assert_eq!(results.average, 3.8);
    }

    #[test]
    fn test_only_non_numeric_votes() {
        let participants = vec![participant("b", false, true), participant("c", false, true)];
        let votes = vec![cast(1, "b", "pass"), cast(2, "c", "infinity")];

        let results = compute_results(&participants, &votes);
        assert_eq!(results.participants, 2);
        assert_eq!(results.average, 0.0);
        assert_eq!(results.consensus, Consensus::High);
    }

    #[tokio::test]
    async fn test_example_scenario() {
        let (service, a, b, c) = seeded().await;
        vote(&service, &a, "1").await;
        vote(&service, &b, "5").await;
        vote(&service, &c, "8").await;

        let results = service.results("R", DEFAULT_ROUND).await.unwrap();
        assert_eq!(results.average, 6.5);
        assert_eq!(results.participants, 2);
        assert_eq!(results.consensus, Consensus::Medium);
        assert_eq!(
            results.votes,
            vec![
                VoteResult {
                    participant_id: b.id.clone(),
                    participant_name: "B".to_string(),
                    value: "5".to_string(),
                },
                VoteResult {
                    participant_id: c.id.clone(),
                    participant_name: "C".to_string(),
                    value: "8".to_string(),
                },
            ]
        );

        // C changes their mind
        vote(&service, &c, "5").await;
        let results = service.results("R", DEFAULT_ROUND).await.unwrap();
        assert_eq!(results.average, 5.0);
        assert_eq!(results.participants, 2);
        assert_eq!(results.consensus, Consensus::High);

        // C withdraws
        vote(&service, &c, "").await;
        let results = service.results("R", DEFAULT_ROUND).await.unwrap();
        assert_eq!(results.average, 5.0);
        assert_eq!(results.participants, 1);
        assert_eq!(results.consensus, Consensus::High);
        assert_eq!(results.votes.len(), 1);
        assert_eq!(results.votes[0].participant_id, b.id);
    }

    #[tokio::test]
    async fn test_pass_counts_toward_participants_only() {
        let (service, _, b, c) = seeded().await;
        vote(&service, &b, "pass").await;
        vote(&service, &c, "3").await;

        let results = service.results("R", DEFAULT_ROUND).await.unwrap();
        assert_eq!(results.participants, 2);
        assert_eq!(results.average, 3.0);
        assert_eq!(results.consensus, Consensus::High);
    }

    #[tokio::test]
    async fn test_results_for_missing_room() {
        let (service, _, _, _) = seeded().await;
        assert!(service.results("nope", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_results_reject_round_zero() {
        let (service, _, _, _) = seeded().await;
        assert!(matches!(
            service.results("R", 0).await,
            Err(crate::error::PokerError::Validation(_))
        ));
    }
}
