//! Core Service Layer
//!
//! Shared infrastructure for the chat server: data model, clock,
//! configuration, errors and the document store.

pub mod clock;
pub mod config;
pub mod ctx;
pub mod error;
pub mod models;
pub mod store;

// Re-exports for convenience
pub use config::{AppState, ChatServerConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
