//! Chat messages exchanged at a table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TableId, UserId};

/// Kind of content a chat message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    System,
}

impl MessageType {
    pub fn as_i64(&self) -> i64 {
        match self {
            MessageType::Text => 0,
            MessageType::Image => 1,
            MessageType::Video => 2,
            MessageType::Audio => 3,
            MessageType::System => 4,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(MessageType::Text),
            1 => Some(MessageType::Image),
            2 => Some(MessageType::Video),
            3 => Some(MessageType::Audio),
            4 => Some(MessageType::System),
            _ => None,
        }
    }

    /// Media messages must reference an uploaded file
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            MessageType::Image | MessageType::Video | MessageType::Audio
        )
    }
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Text
    }
}

/// A chat message in a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub table_id: TableId,
    pub sender_id: UserId,
    pub text: String,
    pub message_type: MessageType,

    /// Uploaded media for image/video/audio messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    /// Additional uploaded files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,

    /// Message this one answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Uuid>,

    /// Set for whispers; the message is still broadcast on the table topic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_recipient_id: Option<UserId>,

    pub sent_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(table_id: TableId, sender_id: UserId, draft: NewMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            table_id,
            sender_id,
            text: draft.text,
            message_type: draft.message_type,
            media_url: draft.media_url,
            attachments: draft.attachments,
            reply_to: draft.reply_to,
            private_recipient_id: None,
            sent_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.private_recipient_id.is_some()
    }
}

/// Draft of a message to send
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub message_type: MessageType,
    pub media_url: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub reply_to: Option<Uuid>,
}

impl NewMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}
