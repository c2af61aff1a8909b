//! # Tabletop Core Library
//!
//! Real-time synchronization for a multi-user virtual tabletop.
//!
//! ## Modules
//!
//! - `topic` - Topic addressing (`table:<id>`, `scene:<id>`)
//! - `broker` - Process-local publish/subscribe with bounded queues
//! - `domain` - Entities and the sync event taxonomy
//! - `repository` - Data access traits
//! - `service` - Authorization gate
//! - `application` - Mutation services that publish after committing
//! - `sync` - Streaming session protocol

pub mod application;
pub mod broker;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;
pub mod sync;
pub mod topic;

// Re-export commonly used types
pub use domain::*;
pub use error::{SyncError, SyncResult};
pub use repository::*;
pub use service::*;
pub use topic::{ScopeKind, Topic};

pub use broker::{
    create_shared_broker, Broker, EventPublisher, Inbox, SharedBroker, Subscriber, SubscriberId,
    Subscription, SyncBroker, DEFAULT_QUEUE_CAPACITY,
};
pub use application::{
    ApplicationServices, ApplicationServicesBuilder, ChatAppService, LibraryAppService,
    MembershipAppService, PermissionAppService, PlacedObjectAppService, SceneAppService,
};
pub use sync::{SessionEnd, SyncRequest, SyncSession, SyncTransport, TransportError};
