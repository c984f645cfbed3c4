//! Which log entries a viewer may read

use crate::core::models::{Message, MessageKind};

/// A message is visible to `viewer` when it is broadcast, addressed to or
/// sent by `viewer`, or is a status announcement.
pub fn is_visible(message: &Message, viewer: &str) -> bool {
    message.is_broadcast()
        || message.to == viewer
        || message.from == viewer
        || message.kind == MessageKind::Status
}
