//! SQLite implementation of MembershipRepository.
//!
//! Also hosts the table bootstrap helpers used by the server's seeding and
//! by tests, since table and account management live outside this service.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tabletop_core::{MembershipRepository, Role, TableId, TableMember, UserId};
use tokio::sync::Mutex;

use super::now_rfc3339;
use crate::Database;

/// SQLite-backed implementation of MembershipRepository.
pub struct SqliteMembershipRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteMembershipRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// Create a table owned by `owner_id`; the owner joins as master.
    pub async fn create_table(&self, name: &str, owner_id: UserId) -> Result<TableId> {
        let db = self.db.lock().await;
        let now = now_rfc3339();

        db.transaction(|conn| {
            conn.execute(
                "INSERT INTO tables (name, owner_user_id, created_at) VALUES (?1, ?2, ?3)",
                params![name, owner_id as i64, now],
            )?;
            let table_id = conn.last_insert_rowid();
            conn.execute(
                "INSERT INTO table_users (table_id, user_id, role, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![table_id, owner_id as i64, Role::Master.as_i64(), now],
            )?;
            Ok(table_id as TableId)
        })
    }

    /// Add (or revive) a membership.
    pub async fn add_member(&self, table_id: TableId, user_id: UserId, role: Role) -> Result<()> {
        let db = self.db.lock().await;
        db.connection().execute(
            "INSERT INTO table_users (table_id, user_id, role, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(table_id, user_id) DO UPDATE SET role = excluded.role, deleted_at = NULL",
            params![table_id as i64, user_id as i64, role.as_i64(), now_rfc3339()],
        )?;
        Ok(())
    }

    /// Soft-delete a membership.
    pub async fn remove_member(&self, table_id: TableId, user_id: UserId) -> Result<()> {
        let db = self.db.lock().await;
        db.connection().execute(
            "UPDATE table_users SET deleted_at = ?3
             WHERE table_id = ?1 AND user_id = ?2 AND deleted_at IS NULL",
            params![table_id as i64, user_id as i64, now_rfc3339()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for SqliteMembershipRepository {
    async fn get_member(&self, table_id: TableId, user_id: UserId) -> Result<Option<TableMember>> {
        let db = self.db.lock().await;

        let role: Option<i64> = db
            .connection()
            .query_row(
                "SELECT role FROM table_users
                 WHERE table_id = ?1 AND user_id = ?2 AND deleted_at IS NULL",
                params![table_id as i64, user_id as i64],
                |row| row.get(0),
            )
            .optional()?;

        let Some(value) = role else {
            return Ok(None);
        };
        let role = Role::from_i64(value).ok_or_else(|| {
            anyhow!("Unknown role {} for user {} in table {}", value, user_id, table_id)
        })?;

        Ok(Some(TableMember::new(table_id, user_id, role)))
    }

    async fn has_role(&self, table_id: TableId, user_id: UserId, role: Role) -> Result<bool> {
        let db = self.db.lock().await;

        let exists: bool = db.connection().query_row(
            "SELECT EXISTS(
                SELECT 1 FROM table_users
                WHERE table_id = ?1 AND user_id = ?2 AND role = ?3 AND deleted_at IS NULL
            )",
            params![table_id as i64, user_id as i64, role.as_i64()],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    async fn update_role(&self, table_id: TableId, user_id: UserId, role: Role) -> Result<()> {
        let db = self.db.lock().await;

        let updated = db.connection().execute(
            "UPDATE table_users SET role = ?3
             WHERE table_id = ?1 AND user_id = ?2 AND deleted_at IS NULL",
            params![table_id as i64, user_id as i64, role.as_i64()],
        )?;

        if updated == 0 {
            return Err(anyhow!("User {} is not a member of table {}", user_id, table_id));
        }
        Ok(())
    }

    async fn table_owner(&self, table_id: TableId) -> Result<Option<UserId>> {
        let db = self.db.lock().await;

        let owner: Option<i64> = db
            .connection()
            .query_row(
                "SELECT owner_user_id FROM tables WHERE id = ?1",
                params![table_id as i64],
                |row| row.get(0),
            )
            .optional()?;

        Ok(owner.map(|id| id as UserId))
    }
}
