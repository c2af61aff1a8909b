//! Membership Application Service
//!
//! Promotes players to master and demotes masters back to players.

use std::sync::Arc;
use tracing::info;

use crate::broker::EventPublisher;
use crate::domain::{Role, SyncAction, SyncEvent, TableId, TableMember, UserId};
use crate::error::{SyncError, SyncResult};
use crate::repository::MembershipRepository;
use crate::service::AuthorizationGate;

/// Application service for table roles
pub struct MembershipAppService {
    member_repo: Arc<dyn MembershipRepository>,
    gate: Arc<AuthorizationGate>,
    publisher: EventPublisher,
}

impl MembershipAppService {
    pub fn new(
        member_repo: Arc<dyn MembershipRepository>,
        gate: Arc<AuthorizationGate>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            member_repo,
            gate,
            publisher,
        }
    }

    /// Set a member's role (master only)
    ///
    /// The table owner can never be demoted. Setting the role a member
    /// already has succeeds without publishing.
    ///
    /// Publishes: `MemberRoleChanged`
    pub async fn change_role(
        &self,
        caller: UserId,
        table_id: TableId,
        target_user_id: UserId,
        role: Role,
    ) -> SyncResult<TableMember> {
        if target_user_id == 0 {
            return Err(SyncError::invalid("user id is required"));
        }
        self.gate.require_master(caller, table_id).await?;

        let mut member = self
            .member_repo
            .get_member(table_id, target_user_id)
            .await?
            .ok_or_else(|| SyncError::not_found("user is not a member of this table"))?;

        if role == Role::Player
            && self.member_repo.table_owner(table_id).await? == Some(target_user_id)
        {
            return Err(SyncError::denied("the table owner cannot be demoted"));
        }

        if member.role == role {
            return Ok(member);
        }

        self.member_repo
            .update_role(table_id, target_user_id, role)
            .await?;
        member.role = role;

        info!(
            table_id,
            user_id = target_user_id,
            role = role.as_str(),
            "[MembershipAppService] Changed member role"
        );

        self.publisher.publish(SyncEvent::for_table(
            table_id,
            SyncAction::MemberRoleChanged {
                table_id,
                user_id: target_user_id,
                role,
            },
        ));

        Ok(member)
    }

    pub async fn promote(
        &self,
        caller: UserId,
        table_id: TableId,
        target_user_id: UserId,
    ) -> SyncResult<TableMember> {
        self.change_role(caller, table_id, target_user_id, Role::Master)
            .await
    }

    pub async fn demote(
        &self,
        caller: UserId,
        table_id: TableId,
        target_user_id: UserId,
    ) -> SyncResult<TableMember> {
        self.change_role(caller, table_id, target_user_id, Role::Player)
            .await
    }
}
