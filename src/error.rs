use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors surfaced by the duel service. Everything a mutating caller can
/// receive lives here; unattended tasks (sweep, scheduled bot answers) log
/// these and skip instead of propagating.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("match is not active")]
    NotActive,

    #[error("match has no open turn")]
    NoOpenTurn,

    #[error("answer already recorded for this turn")]
    AlreadyAnswered,

    #[error("turn deadline has passed")]
    DeadlinePassed,

    #[error("participant is not a member of this match")]
    NotAMember,

    #[error("cannot challenge yourself")]
    SelfChallenge,

    #[error("challenged opponent not found")]
    OpponentNotFound,

    #[error("match not found")]
    MatchNotFound,

    #[error("no question available: {0}")]
    QuestionUnavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotActive | AppError::AlreadyAnswered => StatusCode::CONFLICT,
            AppError::NoOpenTurn | AppError::SelfChallenge => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DeadlinePassed => StatusCode::GONE,
            AppError::NotAMember => StatusCode::FORBIDDEN,
            AppError::OpponentNotFound | AppError::MatchNotFound => StatusCode::NOT_FOUND,
            AppError::QuestionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error: {:#}", self);
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
