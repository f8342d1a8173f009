//! Error type shared by the store, the service layer and the HTTP boundary.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::jira::TrackerError;

pub type PokerResult<T> = Result<T, PokerError>;

#[derive(Debug, thiserror::Error)]
pub enum PokerError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Upstream(#[from] TrackerError),
}

impl PokerError {
    pub fn room_not_found(id: &str) -> Self {
        PokerError::NotFound {
            entity: "Room",
            id: id.to_string(),
        }
    }

    pub fn participant_not_found(id: &str) -> Self {
        PokerError::NotFound {
            entity: "Participant",
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        PokerError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PokerError::NotFound { .. } => StatusCode::NOT_FOUND,
            PokerError::Validation(_) => StatusCode::BAD_REQUEST,
            PokerError::Conflict(_) => StatusCode::CONFLICT,
            PokerError::Forbidden(_) => StatusCode::FORBIDDEN,
            PokerError::Upstream(TrackerError::NotConfigured) => StatusCode::BAD_REQUEST,
            PokerError::Upstream(TrackerError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
            PokerError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            PokerError::NotFound { .. } => "NOT_FOUND",
            PokerError::Validation(_) => "VALIDATION_ERROR",
            PokerError::Conflict(_) => "CONFLICT",
            PokerError::Forbidden(_) => "FORBIDDEN",
            PokerError::Upstream(TrackerError::NotConfigured) => "TRACKER_NOT_CONFIGURED",
            PokerError::Upstream(TrackerError::InvalidKey(_)) => "VALIDATION_ERROR",
            PokerError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }
}

impl From<JsonRejection> for PokerError {
    fn from(rejection: JsonRejection) -> Self {
        PokerError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for PokerError {
    fn from(rejection: QueryRejection) -> Self {
        PokerError::Validation(rejection.body_text())
    }
}

impl IntoResponse for PokerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = json!({
            "message": self.to_string(),
            "code": self.code(),
        });

        (status, Json(body)).into_response()
    }
}
