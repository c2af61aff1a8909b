//! Authorization Gate
//!
//! Decides whether a caller may perform a state-changing operation.
//! Every mutation service consults the gate before committing; a rejected
//! mutation never produces an event. The gate never filters delivery.
//!
//! Two facts are checked, both read-only existence queries:
//! - **Master**: the caller holds the Master role in the table
//! - **Owner**: the caller is registered as owner of a placed object

use std::sync::Arc;
use tracing::debug;

use crate::domain::{ObjectId, Role, TableId, UserId};
use crate::error::{SyncError, SyncResult};
use crate::repository::{MembershipRepository, ObjectOwnerRepository};

/// Authorization gate shared by all mutation services
pub struct AuthorizationGate {
    members: Arc<dyn MembershipRepository>,
    owners: Arc<dyn ObjectOwnerRepository>,
}

impl AuthorizationGate {
    pub fn new(
        members: Arc<dyn MembershipRepository>,
        owners: Arc<dyn ObjectOwnerRepository>,
    ) -> Self {
        Self { members, owners }
    }

    /// Whether `user_id` is the master of `table_id`
    pub async fn is_master(&self, user_id: UserId, table_id: TableId) -> SyncResult<bool> {
        if table_id == 0 {
            return Err(SyncError::invalid("table id is required"));
        }
        Ok(self
            .members
            .has_role(table_id, user_id, Role::Master)
            .await?)
    }

    /// Whether `user_id` owns the placed object `object_id`
    pub async fn is_owner(&self, user_id: UserId, object_id: ObjectId) -> SyncResult<bool> {
        if object_id == 0 {
            return Err(SyncError::invalid("object id is required"));
        }
        Ok(self.owners.is_owner(user_id, object_id).await?)
    }

    /// Whether `user_id` has any membership in `table_id`
    pub async fn is_member(&self, user_id: UserId, table_id: TableId) -> SyncResult<bool> {
        if table_id == 0 {
            return Err(SyncError::invalid("table id is required"));
        }
        Ok(self.members.get_member(table_id, user_id).await?.is_some())
    }

    pub async fn require_master(&self, user_id: UserId, table_id: TableId) -> SyncResult<()> {
        if self.is_master(user_id, table_id).await? {
            Ok(())
        } else {
            debug!(user_id, table_id, "[Authorization] Master check denied");
            Err(SyncError::denied("user is not the game master"))
        }
    }

    pub async fn require_owner(&self, user_id: UserId, object_id: ObjectId) -> SyncResult<()> {
        if self.is_owner(user_id, object_id).await? {
            Ok(())
        } else {
            debug!(user_id, object_id, "[Authorization] Owner check denied");
            Err(SyncError::denied("user does not own this object"))
        }
    }

    pub async fn require_member(&self, user_id: UserId, table_id: TableId) -> SyncResult<()> {
        if self.is_member(user_id, table_id).await? {
            Ok(())
        } else {
            Err(SyncError::denied("user is not a member of this table"))
        }
    }

    /// Master check first; only a permission denial falls back to the owner
    /// check. Invalid arguments and storage errors propagate unchanged.
    pub async fn require_master_or_owner(
        &self,
        user_id: UserId,
        table_id: TableId,
        object_id: ObjectId,
    ) -> SyncResult<()> {
        match self.require_master(user_id, table_id).await {
            Err(err) if err.is_permission_denied() => self.require_owner(user_id, object_id).await,
            other => other,
        }
    }
}
