//! Chat Service Layer
//!
//! Participant directory, message log, per-viewer visibility and the
//! presence sweeper, plus the HTTP handlers that drive them.

pub mod directory;
pub mod handlers;
pub mod log;
pub mod sweeper;
pub mod visibility;

pub use handlers::router;
