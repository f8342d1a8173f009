//! Room, participant and vote endpoints.

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Serialize;

use super::{Actor, ApiState, MessageResponse, RoundQuery};
use crate::error::{PokerError, PokerResult};
use crate::types::*;

/// POST /api/rooms
pub async fn create_room(
    State(service): State<ApiState>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> PokerResult<Json<Room>> {
    let Json(req) = payload?;
    Ok(Json(service.create_room(req).await?))
}

/// GET /api/rooms/{room_id}
pub async fn get_room(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
) -> PokerResult<Json<RoomWithParticipants>> {
    Ok(Json(service.room_details(&room_id).await?))
}

/// PATCH /api/rooms/{room_id}
///
/// Moderator-only. Accepts `currentStory`, `currentStoryTitle` and
/// `isRevealed`; anything else is rejected.
pub async fn update_room(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
    actor: Actor,
    payload: Result<Json<RoomUpdate>, JsonRejection>,
) -> PokerResult<Json<Room>> {
    let Json(update) = payload?;
    Ok(Json(
        service.update_room(&room_id, actor.id(), update).await?,
    ))
}

/// GET /api/rooms/{room_id}/participants
pub async fn list_participants(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
) -> PokerResult<Json<Vec<Participant>>> {
    Ok(Json(service.list_participants(&room_id).await?))
}

/// POST /api/rooms/{room_id}/participants
pub async fn join_room(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
    payload: Result<Json<JoinRoomRequest>, JsonRejection>,
) -> PokerResult<Json<Participant>> {
    let Json(req) = payload?;
    Ok(Json(service.join_room(&room_id, req).await?))
}

/// PATCH /api/rooms/{room_id}/participants/{participant_id}
pub async fn update_participant(
    State(service): State<ApiState>,
    Path((room_id, participant_id)): Path<(RoomId, ParticipantId)>,
    payload: Result<Json<ParticipantUpdate>, JsonRejection>,
) -> PokerResult<Json<Participant>> {
    let Json(update) = payload?;
    Ok(Json(
        service
            .update_participant(&room_id, &participant_id, update)
            .await?,
    ))
}

/// DELETE /api/rooms/{room_id}/participants/{participant_id}
pub async fn remove_participant(
    State(service): State<ApiState>,
    Path((room_id, participant_id)): Path<(RoomId, ParticipantId)>,
) -> PokerResult<Json<MessageResponse>> {
    service.leave_room(&room_id, &participant_id).await?;
    Ok(MessageResponse::new("Participant removed successfully"))
}

/// POST /api/rooms/{room_id}/votes
pub async fn submit_vote(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
    payload: Result<Json<SubmitVoteRequest>, JsonRejection>,
) -> PokerResult<Json<Vote>> {
    let Json(req) = payload?;
    Ok(Json(service.submit_vote(&room_id, req).await?))
}

/// GET /api/rooms/{room_id}/votes?round=N
pub async fn list_votes(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
    query: Result<Query<RoundQuery>, QueryRejection>,
) -> PokerResult<Json<Vec<Vote>>> {
    let Query(query) = query?;
    Ok(Json(service.list_votes(&room_id, query.round()).await?))
}

/// GET /api/rooms/{room_id}/votes/{participant_id}?round=N
///
/// Answers `null` when the participant has no vote in that round.
pub async fn participant_vote(
    State(service): State<ApiState>,
    Path((room_id, participant_id)): Path<(RoomId, ParticipantId)>,
    query: Result<Query<RoundQuery>, QueryRejection>,
) -> PokerResult<Json<Option<Vote>>> {
    let Query(query) = query?;
    Ok(Json(
        service
            .participant_vote(&room_id, &participant_id, query.round())
            .await?,
    ))
}

/// GET /api/rooms/{room_id}/status?round=N
pub async fn voting_status(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
    query: Result<Query<RoundQuery>, QueryRejection>,
) -> PokerResult<Json<VotingStatus>> {
    let Query(query) = query?;
    Ok(Json(service.voting_status(&room_id, query.round()).await?))
}

/// GET /api/rooms/{room_id}/results?round=N
pub async fn results(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
    query: Result<Query<RoundQuery>, QueryRejection>,
) -> PokerResult<Json<RoomResults>> {
    let Query(query) = query?;
    Ok(Json(service.results(&room_id, query.round()).await?))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoundResponse {
    pub message: String,
    pub round: RoundNo,
    pub cleared_votes: usize,
}

/// POST /api/rooms/{room_id}/new-round
///
/// Body is optional; `{"round": N}` picks the round to clear.
pub async fn new_round(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
    actor: Actor,
    body: Bytes,
) -> PokerResult<Json<NewRoundResponse>> {
    let req: NewRoundRequest = if body.iter().all(u8::is_ascii_whitespace) {
        NewRoundRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| PokerError::validation(format!("Invalid new round request: {}", e)))?
    };

    let round = req.round.unwrap_or(DEFAULT_ROUND);
    let cleared = service
        .new_round(&room_id, actor.id(), Some(round))
        .await?;

    Ok(Json(NewRoundResponse {
        message: "New round started".to_string(),
        round,
        cleared_votes: cleared,
    }))
}
