use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::core::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Input Errors
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("missing user header")]
    MissingUser,

    // Domain Errors
    #[error("name already registered: {0}")]
    DuplicateName(String),
    #[error("participant not found: {0}")]
    ParticipantNotFound(String),
    #[error("message not found: {0}")]
    MessageNotFound(String),
    #[error("only the sender may delete a message")]
    Forbidden,

    // Storage
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::MissingUser => StatusCode::UNPROCESSABLE_ENTITY,
            Error::DuplicateName(_) => StatusCode::CONFLICT,
            Error::ParticipantNotFound(_) | Error::MessageNotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            Error::StoreUnavailable(e) => {
                error!("Store failure: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "message": error_message
            }
        }));

        (status, body).into_response()
    }
}

// Malformed or mistyped bodies are validation failures, not 400s
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}
