//! Chat Handlers and Router
//!
//! Participants, messages and presence pings.

use crate::core::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub mod messages;
pub mod participants;
pub mod presence;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/participants",
            get(participants::list_participants).post(participants::create_participant),
        )
        .route(
            "/messages",
            get(messages::list_messages).post(messages::post_message),
        )
        .route("/messages/{id}", delete(messages::delete_message))
        .route("/status", post(presence::update_status))
}
