use crate::core::{AppState, Ctx, Result};
use axum::{extract::State, http::StatusCode};
use tracing::debug;

/// POST /status
///
/// Presence ping. Keeps the caller from being swept.
pub async fn update_status(State(state): State<AppState>, ctx: Ctx) -> Result<StatusCode> {
    debug!("POST /status - {}", ctx.user());
    state.directory.touch(ctx.user()).await?;
    Ok(StatusCode::OK)
}
