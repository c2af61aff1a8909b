//! Application Services - Mutation handlers with event publication
//!
//! Application services sit between the presentation layer (HTTP handlers)
//! and the domain layer (repositories, authorization gate). Every mutation
//! follows the same sequence:
//!
//! 1. **Validate** inputs (zero ids, empty text, bad values)
//! 2. **Load** the targets to learn their owning table/scene
//! 3. **Authorize** through the [`AuthorizationGate`]
//! 4. **Commit** through the repository
//! 5. **Publish** the matching [`SyncEvent`](crate::domain::SyncEvent)
//!
//! Any failure in steps 1–4 returns early, so nothing is ever published for a
//! rejected or failed change.
//!
//! # Architecture
//!
//! ```text
//! Presentation Layer (HTTP routes)
//!         │
//!         ▼
//! ┌─────────────────────────────────────┐
//! │      Application Services           │
//! │  ┌─────────────────────────────┐    │
//! │  │ SceneAppService             │    │
//! │  │ LibraryAppService           │    │
//! │  │ PlacedObjectAppService      │    │
//! │  │ PermissionAppService        │    │
//! │  │ ChatAppService              │    │
//! │  │ MembershipAppService        │    │
//! │  └──────┬──────────────┬───────┘    │
//! │         │              │            │
//! │         ▼              ▼            │
//! │  ┌────────────┐  ┌──────────┐       │
//! │  │    Gate    │  │  Broker  │       │
//! │  └────────────┘  └──────────┘       │
//! └─────────────────────────────────────┘
//!         │
//!         ▼
//! Domain Layer (Repositories)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let services = ApplicationServicesBuilder::new()
//!     .with_broker(broker)
//!     .with_membership_repo(members)
//!     // ...
//!     .build()?;
//!
//! services.placed_objects.move_to(caller, object_id, 250, 300).await?;
//! // -> Publishes PlacedTokenMoved on scene:<id>
//! ```

mod chat;
mod library;
mod membership;
mod permission;
mod placed_object;
mod scene;

pub use chat::ChatAppService;
pub use library::LibraryAppService;
pub use membership::MembershipAppService;
pub use permission::PermissionAppService;
pub use placed_object::PlacedObjectAppService;
pub use scene::SceneAppService;

use std::sync::Arc;

use crate::broker::{EventPublisher, SharedBroker};
use crate::repository::*;
use crate::service::AuthorizationGate;

/// Builder for creating all application services with shared dependencies
pub struct ApplicationServicesBuilder {
    broker: Option<SharedBroker>,
    membership_repo: Option<Arc<dyn MembershipRepository>>,
    owner_repo: Option<Arc<dyn ObjectOwnerRepository>>,
    scene_repo: Option<Arc<dyn SceneRepository>>,
    library_repo: Option<Arc<dyn LibraryRepository>>,
    placed_repo: Option<Arc<dyn PlacedObjectRepository>>,
    chat_repo: Option<Arc<dyn ChatRepository>>,
}

impl ApplicationServicesBuilder {
    pub fn new() -> Self {
        Self {
            broker: None,
            membership_repo: None,
            owner_repo: None,
            scene_repo: None,
            library_repo: None,
            placed_repo: None,
            chat_repo: None,
        }
    }

    pub fn with_broker(mut self, broker: SharedBroker) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn with_membership_repo(mut self, repo: Arc<dyn MembershipRepository>) -> Self {
        self.membership_repo = Some(repo);
        self
    }

    pub fn with_owner_repo(mut self, repo: Arc<dyn ObjectOwnerRepository>) -> Self {
        self.owner_repo = Some(repo);
        self
    }

    pub fn with_scene_repo(mut self, repo: Arc<dyn SceneRepository>) -> Self {
        self.scene_repo = Some(repo);
        self
    }

    pub fn with_library_repo(mut self, repo: Arc<dyn LibraryRepository>) -> Self {
        self.library_repo = Some(repo);
        self
    }

    pub fn with_placed_repo(mut self, repo: Arc<dyn PlacedObjectRepository>) -> Self {
        self.placed_repo = Some(repo);
        self
    }

    pub fn with_chat_repo(mut self, repo: Arc<dyn ChatRepository>) -> Self {
        self.chat_repo = Some(repo);
        self
    }

    /// Build all application services
    pub fn build(self) -> anyhow::Result<ApplicationServices> {
        let broker = self.broker.ok_or_else(|| anyhow::anyhow!("Broker required"))?;
        let members = self
            .membership_repo
            .ok_or_else(|| anyhow::anyhow!("Membership repository required"))?;
        let owners = self
            .owner_repo
            .ok_or_else(|| anyhow::anyhow!("Object owner repository required"))?;
        let scenes = self
            .scene_repo
            .ok_or_else(|| anyhow::anyhow!("Scene repository required"))?;
        let library = self
            .library_repo
            .ok_or_else(|| anyhow::anyhow!("Library repository required"))?;
        let placed = self
            .placed_repo
            .ok_or_else(|| anyhow::anyhow!("Placed object repository required"))?;
        let chat = self
            .chat_repo
            .ok_or_else(|| anyhow::anyhow!("Chat repository required"))?;

        let publisher = EventPublisher::new(broker.clone());
        let gate = Arc::new(AuthorizationGate::new(members.clone(), owners.clone()));

        Ok(ApplicationServices {
            scenes: Arc::new(SceneAppService::new(
                scenes.clone(),
                gate.clone(),
                publisher.clone(),
            )),
            library: Arc::new(LibraryAppService::new(
                library.clone(),
                gate.clone(),
                publisher.clone(),
            )),
            placed_objects: Arc::new(PlacedObjectAppService::new(
                placed.clone(),
                scenes.clone(),
                library.clone(),
                gate.clone(),
                publisher.clone(),
            )),
            permissions: Arc::new(PermissionAppService::new(
                placed,
                scenes,
                library,
                owners,
                gate.clone(),
                publisher.clone(),
            )),
            chat: Arc::new(ChatAppService::new(chat, gate.clone(), publisher.clone())),
            membership: Arc::new(MembershipAppService::new(members, gate.clone(), publisher)),
            gate,
            broker,
        })
    }
}

impl Default for ApplicationServicesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all application services
#[derive(Clone)]
pub struct ApplicationServices {
    /// Shared broker (sessions subscribe here)
    pub broker: SharedBroker,
    /// Shared authorization gate
    pub gate: Arc<AuthorizationGate>,
    pub scenes: Arc<SceneAppService>,
    pub library: Arc<LibraryAppService>,
    pub placed_objects: Arc<PlacedObjectAppService>,
    pub permissions: Arc<PermissionAppService>,
    pub chat: Arc<ChatAppService>,
    pub membership: Arc<MembershipAppService>,
}
