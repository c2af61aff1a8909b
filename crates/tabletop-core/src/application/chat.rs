//! Chat Application Service
//!
//! Table chat with author-only editing. Private messages travel on the
//! table topic like any other message and carry the recipient id; clients
//! decide whether to show them.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::broker::EventPublisher;
use crate::domain::{
    ChatMessage, MessageType, NewMessage, SyncAction, SyncEvent, TableId, UserId,
};
use crate::error::{SyncError, SyncResult};
use crate::repository::ChatRepository;
use crate::service::AuthorizationGate;

/// Application service for chat messages
pub struct ChatAppService {
    chat_repo: Arc<dyn ChatRepository>,
    gate: Arc<AuthorizationGate>,
    publisher: EventPublisher,
}

impl ChatAppService {
    pub fn new(
        chat_repo: Arc<dyn ChatRepository>,
        gate: Arc<AuthorizationGate>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            chat_repo,
            gate,
            publisher,
        }
    }

    pub async fn get(&self, id: Uuid) -> SyncResult<Option<ChatMessage>> {
        Ok(self.chat_repo.get(&id).await?)
    }

    /// Send a message to the whole table (members only)
    ///
    /// Publishes: `MessageSent`
    pub async fn send(
        &self,
        caller: UserId,
        table_id: TableId,
        draft: NewMessage,
    ) -> SyncResult<ChatMessage> {
        validate_draft(&draft)?;
        self.gate.require_member(caller, table_id).await?;

        let message = ChatMessage::new(table_id, caller, draft);
        self.store_and_publish(message).await
    }

    /// Whisper to another member of the same table
    ///
    /// Publishes: `MessageSent` with `private_recipient_id` set
    pub async fn send_private(
        &self,
        caller: UserId,
        table_id: TableId,
        recipient_id: UserId,
        draft: NewMessage,
    ) -> SyncResult<ChatMessage> {
        validate_draft(&draft)?;
        if recipient_id == 0 {
            return Err(SyncError::invalid("recipient id is required"));
        }
        if recipient_id == caller {
            return Err(SyncError::invalid("cannot send a private message to yourself"));
        }

        self.gate.require_member(caller, table_id).await?;
        if !self.gate.is_member(recipient_id, table_id).await? {
            return Err(SyncError::not_found("recipient is not a member of this table"));
        }

        let mut message = ChatMessage::new(table_id, caller, draft);
        message.private_recipient_id = Some(recipient_id);
        self.store_and_publish(message).await
    }

    /// Edit the text of one's own text message
    ///
    /// Publishes: `MessageUpdated`
    pub async fn update(
        &self,
        caller: UserId,
        message_id: Uuid,
        text: &str,
    ) -> SyncResult<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SyncError::invalid("message text cannot be empty"));
        }

        let mut message = self
            .chat_repo
            .get(&message_id)
            .await?
            .ok_or_else(|| SyncError::not_found("message not found"))?;

        if message.sender_id != caller {
            return Err(SyncError::denied("only the author can edit this message"));
        }
        if message.message_type != MessageType::Text {
            return Err(SyncError::invalid("only text messages can be edited"));
        }

        message.text = text.to_string();
        message.updated_at = Some(chrono::Utc::now());
        self.chat_repo.update(&message).await?;

        info!(message_id = %message.id, "[ChatAppService] Updated message");

        self.publisher.publish(SyncEvent::for_table(
            message.table_id,
            SyncAction::MessageUpdated {
                message: message.clone(),
            },
        ));

        Ok(message)
    }

    /// Delete one's own message
    ///
    /// Deleting a message that does not exist succeeds without publishing.
    ///
    /// Publishes: `MessageDeleted`
    pub async fn delete(&self, caller: UserId, message_id: Uuid) -> SyncResult<()> {
        let Some(message) = self.chat_repo.get(&message_id).await? else {
            return Ok(());
        };

        if message.sender_id != caller {
            return Err(SyncError::denied("only the author can delete this message"));
        }

        self.chat_repo.delete(&message_id).await?;

        info!(message_id = %message_id, "[ChatAppService] Deleted message");

        self.publisher.publish(SyncEvent::for_table(
            message.table_id,
            SyncAction::MessageDeleted {
                message_id,
                table_id: message.table_id,
            },
        ));

        Ok(())
    }

    async fn store_and_publish(&self, message: ChatMessage) -> SyncResult<ChatMessage> {
        self.chat_repo.create(&message).await?;

        info!(
            message_id = %message.id,
            table_id = message.table_id,
            private = message.is_private(),
            "[ChatAppService] Sent message"
        );

        self.publisher.publish(SyncEvent::for_table(
            message.table_id,
            SyncAction::MessageSent {
                message: message.clone(),
            },
        ));

        Ok(message)
    }
}

fn validate_draft(draft: &NewMessage) -> SyncResult<()> {
    match draft.message_type {
        MessageType::System => Err(SyncError::invalid("system messages cannot be sent by users")),
        kind if kind.is_media() => {
            if draft.media_url.as_deref().map_or(true, |url| url.trim().is_empty()) {
                Err(SyncError::invalid("media messages require a media url"))
            } else {
                Ok(())
            }
        }
        _ => {
            if draft.text.trim().is_empty() && draft.attachments.is_empty() {
                Err(SyncError::invalid("message text cannot be empty"))
            } else {
                Ok(())
            }
        }
    }
}
