use crate::core::models::{CreateMessageInput, Message};
use crate::core::{AppState, Ctx, Error, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    /// Kept as text: anything that is not a positive integer means "no limit"
    pub limit: Option<String>,
}

impl ListMessagesQuery {
    pub fn limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|l| l.trim().parse().ok())
    }
}

/// POST /messages
pub async fn post_message(
    State(state): State<AppState>,
    ctx: Ctx,
    input: std::result::Result<Json<CreateMessageInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>)> {
    let Json(input) = input?;
    let draft = input.validate(ctx.user())?;

    if !state.directory.contains(ctx.user()).await? {
        return Err(Error::Validation(format!("unknown sender {}", ctx.user())));
    }

    let message = state.log.append(draft).await?;
    info!(
        "POST /messages - {} -> {} ({:?})",
        message.from, message.to, message.kind
    );
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages?limit=N
pub async fn list_messages(
    State(state): State<AppState>,
    ctx: Ctx,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<Message>>> {
    debug!("GET /messages - {} (limit {:?})", ctx.user(), query.limit);
    let messages = state.log.list_for(ctx.user(), query.limit()).await?;
    Ok(Json(messages))
}

/// DELETE /messages/:id
pub async fn delete_message(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.log.delete(&id, ctx.user()).await?;
    Ok(StatusCode::OK)
}
