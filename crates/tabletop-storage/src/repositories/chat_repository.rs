//! SQLite implementation of ChatRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tabletop_core::{ChatMessage, ChatRepository, MessageType};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::parse_datetime;
use crate::Database;

/// SQLite-backed implementation of ChatRepository.
pub struct SqliteChatRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteChatRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChatRepository for SqliteChatRepository {
    async fn get(&self, id: &Uuid) -> Result<Option<ChatMessage>> {
        let db = self.db.lock().await;

        let message = db
            .connection()
            .query_row(
                "SELECT id, table_id, sender_id, text, message_type, media_url, attachments,
                        reply_to, private_recipient_id, sent_at, updated_at
                 FROM chat_messages WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    let attachments: String = row.get(6)?;
                    let reply_to: Option<String> = row.get(7)?;
                    let updated_at: Option<String> = row.get(10)?;

                    Ok(ChatMessage {
                        id: row
                            .get::<_, String>(0)?
                            .parse()
                            .unwrap_or_else(|_| Uuid::nil()),
                        table_id: row.get::<_, i64>(1)? as u64,
                        sender_id: row.get::<_, i64>(2)? as u64,
                        text: row.get(3)?,
                        message_type: MessageType::from_i64(row.get(4)?).unwrap_or_default(),
                        media_url: row.get(5)?,
                        attachments: serde_json::from_str(&attachments).unwrap_or_default(),
                        reply_to: reply_to.and_then(|s| s.parse().ok()),
                        private_recipient_id: row.get::<_, Option<i64>>(8)?.map(|id| id as u64),
                        sent_at: parse_datetime(&row.get::<_, String>(9)?),
                        updated_at: updated_at.as_deref().map(parse_datetime),
                    })
                },
            )
            .optional()?;

        Ok(message)
    }

    async fn create(&self, message: &ChatMessage) -> Result<()> {
        let db = self.db.lock().await;

        db.connection().execute(
            "INSERT INTO chat_messages (
                id, table_id, sender_id, text, message_type, media_url, attachments,
                reply_to, private_recipient_id, sent_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                message.id.to_string(),
                message.table_id as i64,
                message.sender_id as i64,
                message.text,
                message.message_type.as_i64(),
                message.media_url,
                serde_json::to_string(&message.attachments)?,
                message.reply_to.map(|id| id.to_string()),
                message.private_recipient_id.map(|id| id as i64),
                message.sent_at.to_rfc3339(),
                message.updated_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        Ok(())
    }

    async fn update(&self, message: &ChatMessage) -> Result<()> {
        let db = self.db.lock().await;

        db.connection().execute(
            "UPDATE chat_messages SET text = ?2, updated_at = ?3 WHERE id = ?1",
            params![
                message.id.to_string(),
                message.text,
                message.updated_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM chat_messages WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}
