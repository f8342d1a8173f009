//! HTTP API.
//!
//! Clients poll `GET /api/rooms/{id}` (and results) at a short interval; every
//! user action is a plain request that mutates state synchronously.

pub mod rooms;
pub mod tracker;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use crate::service::RoomService;
use crate::types::{RoundNo, CARD_DECK, DEFAULT_ROUND};

/// Header carrying the id of the participant performing a moderator action
pub const PARTICIPANT_HEADER: &str = "x-participant-id";

pub type ApiState = Arc<RoomService>;

/// Participant id taken from the `X-Participant-Id` header, if any
#[derive(Debug, Clone, Default)]
pub struct Actor(pub Option<String>);

impl Actor {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(PARTICIPANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Ok(Actor(id))
    }
}

/// `?round=N` query, defaulting to round 1
#[derive(Debug, Clone, Deserialize)]
pub struct RoundQuery {
    #[serde(default)]
    pub round: Option<RoundNo>,
}

impl RoundQuery {
    pub fn round(&self) -> RoundNo {
        self.round.unwrap_or(DEFAULT_ROUND)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/deck
pub async fn deck() -> Json<&'static [&'static str]> {
    Json(CARD_DECK)
}

/// Build the API router around a room service
pub fn router(service: RoomService) -> Router {
    let state: ApiState = Arc::new(service);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/deck", get(deck))
        .route("/api/rooms", post(rooms::create_room))
        .route(
            "/api/rooms/{room_id}",
            get(rooms::get_room).patch(rooms::update_room),
        )
        .route(
            "/api/rooms/{room_id}/participants",
            get(rooms::list_participants).post(rooms::join_room),
        )
        .route(
            "/api/rooms/{room_id}/participants/{participant_id}",
            axum::routing::patch(rooms::update_participant).delete(rooms::remove_participant),
        )
        .route(
            "/api/rooms/{room_id}/votes",
            get(rooms::list_votes).post(rooms::submit_vote),
        )
        .route(
            "/api/rooms/{room_id}/votes/{participant_id}",
            get(rooms::participant_vote),
        )
        .route("/api/rooms/{room_id}/status", get(rooms::voting_status))
        .route("/api/rooms/{room_id}/results", get(rooms::results))
        .route("/api/rooms/{room_id}/new-round", post(rooms::new_round))
        .route("/api/rooms/{room_id}/sync-jira", post(tracker::sync_jira))
        .route("/api/jira/test", get(tracker::test_connection))
        .route("/api/jira/fields", get(tracker::list_fields))
        .with_state(state)
}
