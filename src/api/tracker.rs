//! Issue tracker endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::{Actor, ApiState};
use crate::error::PokerResult;
use crate::jira::{SyncMode, SyncReceipt, TrackerField};
use crate::types::*;

#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub mode: SyncMode,
    pub result: SyncReceipt,
}

/// POST /api/rooms/{room_id}/sync-jira
pub async fn sync_jira(
    State(service): State<ApiState>,
    Path(room_id): Path<RoomId>,
    actor: Actor,
    payload: Result<Json<SyncEstimateRequest>, JsonRejection>,
) -> PokerResult<Json<SyncResponse>> {
    let Json(req) = payload?;
    let receipt = service.sync_estimate(&room_id, actor.id(), req).await?;

    let message = match receipt.mode {
        SyncMode::Simulation => "Story synced to Jira (simulation mode)",
        SyncMode::Real => "Story synced to Jira successfully",
    };
    Ok(Json(SyncResponse {
        message: message.to_string(),
        mode: receipt.mode,
        result: receipt,
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionResponse {
    pub connected: bool,
    pub mode: SyncMode,
    pub message: String,
}

/// GET /api/jira/test
///
/// Failures keep the `{connected, message}` shape so clients can show them.
pub async fn test_connection(State(service): State<ApiState>) -> Response {
    let mode = service.tracker().mode();
    match service.tracker_connection().await {
        Ok(()) => Json(ConnectionResponse {
            connected: true,
            mode,
            message: "Jira connection successful".to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Jira connection test failed: {}", e);
            (
                e.status(),
                Json(ConnectionResponse {
                    connected: false,
                    mode,
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldsResponse {
    pub fields: Vec<TrackerField>,
    pub message: String,
}

/// GET /api/jira/fields
pub async fn list_fields(State(service): State<ApiState>) -> PokerResult<Json<FieldsResponse>> {
    let fields = service.tracker_fields().await?;
    Ok(Json(FieldsResponse {
        fields,
        message: "Custom fields retrieved successfully".to_string(),
    }))
}
