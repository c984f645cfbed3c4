//! Chat data model
//!
//! Participants and messages as stored in the document store and returned
//! over HTTP, plus the request inputs and their validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Recipient value meaning "visible to every participant"
pub const BROADCAST: &str = "all";

/// Text of the status message appended when a participant registers
pub const JOINED_TEXT: &str = "joined";

/// Text of the status message appended when a participant is swept
pub const LEFT_TEXT: &str = "left";

/// A registered participant and the last time it proved to be alive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    #[serde(rename = "lastStatus", with = "chrono::serde::ts_milliseconds")]
    pub last_seen: DateTime<Utc>,
}

impl Participant {
    pub fn new(name: impl Into<String>, last_seen: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            last_seen,
        }
    }

    /// True when more than `threshold` has elapsed since `last_seen`.
    pub fn is_idle(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        now - self.last_seen > threshold
    }
}

/// Kind of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// Arrival/departure announcements generated by the server
    #[serde(rename = "status")]
    Status,
    /// Ordinary chat line
    #[serde(rename = "message")]
    Chat,
    /// Line addressed to a single participant
    #[serde(rename = "private_message")]
    Direct,
}

/// A message in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Wall-clock display stamp (`HH:MM:SS`)
    pub time: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn is_broadcast(&self) -> bool {
        self.to == BROADCAST
    }
}

/// A message that has not been appended to the log yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub from: String,
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
    /// Left unset for client messages; the log stamps them on append
    pub sent_at: Option<DateTime<Utc>>,
}

impl MessageDraft {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            text: text.into(),
            kind,
            sent_at: None,
        }
    }

    /// Broadcast status announcement on behalf of `name`
    pub fn status(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, BROADCAST, text, MessageKind::Status)
    }

    pub fn sent_at(mut self, at: DateTime<Utc>) -> Self {
        self.sent_at = Some(at);
        self
    }
}

/// Body of `POST /participants`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateParticipantInput {
    pub name: Option<String>,
}

impl CreateParticipantInput {
    /// Returns the trimmed participant name.
    pub fn validate(self) -> Result<String> {
        required("name", self.name)
    }
}

/// Body of `POST /messages`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessageInput {
    pub to: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<MessageKind>,
}

impl CreateMessageInput {
    /// Builds a draft sent by `from`. Clients cannot post status messages.
    pub fn validate(self, from: &str) -> Result<MessageDraft> {
        let to = required("to", self.to)?;
        let text = required("text", self.text)?;
        let kind = match self.kind {
            Some(MessageKind::Chat) => MessageKind::Chat,
            Some(MessageKind::Direct) => MessageKind::Direct,
            Some(MessageKind::Status) => {
                return Err(Error::Validation(
                    "type must be 'message' or 'private_message'".to_string(),
                ))
            }
            None => return Err(Error::Validation("type is required".to_string())),
        };
        Ok(MessageDraft::new(from, to, text, kind))
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::Validation(format!("{} is required", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn participant_serializes_last_seen_as_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let json = serde_json::to_value(Participant::new("alice", at)).unwrap();
        assert_eq!(json["name"], "alice");
        assert_eq!(json["lastStatus"], 1_700_000_000_123i64);
    }

    #[test]
    fn idle_is_strictly_greater_than_threshold() {
        let start = Utc.timestamp_opt(0, 0).unwrap();
        let p = Participant::new("alice", start);
        let threshold = chrono::Duration::seconds(10);
        assert!(!p.is_idle(start + chrono::Duration::seconds(10), threshold));
        assert!(p.is_idle(start + chrono::Duration::seconds(11), threshold));
    }

    #[test]
    fn message_kind_uses_wire_names() {
        let input: CreateMessageInput =
            serde_json::from_str(r#"{"to":"bob","text":"hi","type":"private_message"}"#).unwrap();
        let draft = input.validate("alice").unwrap();
        assert_eq!(draft.kind, MessageKind::Direct);
        assert_eq!(draft.from, "alice");
        assert!(draft.sent_at.is_none());
    }

    #[test]
    fn clients_cannot_post_status() {
        let input: CreateMessageInput =
            serde_json::from_str(r#"{"to":"all","text":"left","type":"status"}"#).unwrap();
        assert!(matches!(input.validate("alice"), Err(Error::Validation(_))));
    }

    #[test]
    fn blank_fields_are_rejected() {
        let input = CreateParticipantInput {
            name: Some("   ".to_string()),
        };
        assert!(matches!(input.validate(), Err(Error::Validation(_))));

        let input: CreateMessageInput = serde_json::from_str(r#"{"to":"all","type":"message"}"#).unwrap();
        assert!(matches!(input.validate("alice"), Err(Error::Validation(_))));
    }

    #[test]
    fn names_are_trimmed() {
        let input = CreateParticipantInput {
            name: Some("  alice ".to_string()),
        };
        assert_eq!(input.validate().unwrap(), "alice");
    }
}
