use crate::core::models::{CreateParticipantInput, Participant};
use crate::core::{AppState, Result};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use tracing::info;

/// POST /participants
pub async fn create_participant(
    State(state): State<AppState>,
    input: std::result::Result<Json<CreateParticipantInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Participant>)> {
    let Json(input) = input?;
    let name = input.validate()?;
    info!("POST /participants - {}", name);

    let participant = state.directory.register(&name).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// GET /participants
pub async fn list_participants(State(state): State<AppState>) -> Result<Json<Vec<Participant>>> {
    Ok(Json(state.directory.list().await?))
}
