//! Mock repository implementations for testing
//!
//! In-memory implementations of all repository traits for fast, isolated tests.

use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use tabletop_core::{
    ApplicationServices, ApplicationServicesBuilder, ChatMessage, ChatRepository, LibraryObject,
    LibraryRepository, MembershipRepository, ObjectId, ObjectOwnerRepository, PermissionLevel,
    PlacedObject, PlacedObjectRepository, RepoResult, Role, Scene, SceneId, SceneRepository,
    SharedBroker, TableId, TableMember, UserId,
};

fn next(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::Relaxed) + 1
}

// ============================================================================
// MockMembershipRepository
// ============================================================================

#[derive(Default)]
pub struct MockMembershipRepository {
    members: RwLock<HashMap<(TableId, UserId), Role>>,
    owners: RwLock<HashMap<TableId, UserId>>,
    failing: AtomicBool,
}

impl MockMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table; the owner joins as master
    pub fn add_table(&self, table_id: TableId, owner_id: UserId) {
        self.owners.write().unwrap().insert(table_id, owner_id);
        self.add_member(table_id, owner_id, Role::Master);
    }

    pub fn add_member(&self, table_id: TableId, user_id: UserId, role: Role) {
        self.members
            .write()
            .unwrap()
            .insert((table_id, user_id), role);
    }

    pub fn role_of(&self, table_id: TableId, user_id: UserId) -> Option<Role> {
        self.members
            .read()
            .unwrap()
            .get(&(table_id, user_id))
            .copied()
    }

    /// Make every call fail with a storage error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("membership store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for MockMembershipRepository {
    async fn get_member(
        &self,
        table_id: TableId,
        user_id: UserId,
    ) -> RepoResult<Option<TableMember>> {
        self.check()?;
        Ok(self
            .role_of(table_id, user_id)
            .map(|role| TableMember::new(table_id, user_id, role)))
    }

    async fn has_role(&self, table_id: TableId, user_id: UserId, role: Role) -> RepoResult<bool> {
        self.check()?;
        Ok(self.role_of(table_id, user_id) == Some(role))
    }

    async fn update_role(&self, table_id: TableId, user_id: UserId, role: Role) -> RepoResult<()> {
        self.check()?;
        let mut members = self.members.write().unwrap();
        match members.get_mut(&(table_id, user_id)) {
            Some(current) => {
                *current = role;
                Ok(())
            }
            None => Err(anyhow!("user {} is not in table {}", user_id, table_id)),
        }
    }

    async fn table_owner(&self, table_id: TableId) -> RepoResult<Option<UserId>> {
        self.check()?;
        Ok(self.owners.read().unwrap().get(&table_id).copied())
    }
}

// ============================================================================
// MockObjectOwnerRepository
// ============================================================================

#[derive(Default)]
pub struct MockObjectOwnerRepository {
    owners: RwLock<HashMap<ObjectId, Vec<UserId>>>,
}

impl MockObjectOwnerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, object_id: ObjectId, user_id: UserId) {
        let mut owners = self.owners.write().unwrap();
        let list = owners.entry(object_id).or_default();
        if !list.contains(&user_id) {
            list.push(user_id);
        }
    }

    /// Overwrite the owner list, dropping duplicates
    pub fn set_owners(&self, object_id: ObjectId, owners: &[UserId]) {
        let mut seen = HashSet::new();
        let list = owners.iter().copied().filter(|id| seen.insert(*id)).collect();
        self.owners.write().unwrap().insert(object_id, list);
    }
}

#[async_trait]
impl ObjectOwnerRepository for MockObjectOwnerRepository {
    async fn is_owner(&self, user_id: UserId, object_id: ObjectId) -> RepoResult<bool> {
        Ok(self
            .owners
            .read()
            .unwrap()
            .get(&object_id)
            .is_some_and(|list| list.contains(&user_id)))
    }

    async fn list_owners(&self, object_id: ObjectId) -> RepoResult<Vec<UserId>> {
        Ok(self
            .owners
            .read()
            .unwrap()
            .get(&object_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// MockSceneRepository
// ============================================================================

#[derive(Default)]
pub struct MockSceneRepository {
    scenes: RwLock<HashMap<SceneId, Scene>>,
    next_id: AtomicU64,
}

impl MockSceneRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a scene with a fixed id
    pub fn insert(&self, mut scene: Scene, id: SceneId) -> Scene {
        scene.id = id;
        self.next_id.fetch_max(id, Ordering::Relaxed);
        self.scenes.write().unwrap().insert(id, scene.clone());
        scene
    }

    pub fn count(&self) -> usize {
        self.scenes.read().unwrap().len()
    }
}

#[async_trait]
impl SceneRepository for MockSceneRepository {
    async fn get(&self, id: SceneId) -> RepoResult<Option<Scene>> {
        Ok(self.scenes.read().unwrap().get(&id).cloned())
    }

    async fn create(&self, scene: &Scene) -> RepoResult<SceneId> {
        let id = next(&self.next_id);
        let mut scene = scene.clone();
        scene.id = id;
        self.scenes.write().unwrap().insert(id, scene);
        Ok(id)
    }

    async fn update(&self, scene: &Scene) -> RepoResult<()> {
        self.scenes.write().unwrap().insert(scene.id, scene.clone());
        Ok(())
    }

    async fn delete(&self, id: SceneId) -> RepoResult<()> {
        self.scenes.write().unwrap().remove(&id);
        Ok(())
    }
}

// ============================================================================
// MockLibraryRepository
// ============================================================================

#[derive(Default)]
pub struct MockLibraryRepository {
    objects: RwLock<HashMap<ObjectId, LibraryObject>>,
    next_id: AtomicU64,
}

impl MockLibraryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, mut object: LibraryObject, id: ObjectId) -> LibraryObject {
        object.id = id;
        self.next_id.fetch_max(id, Ordering::Relaxed);
        self.objects.write().unwrap().insert(id, object.clone());
        object
    }

    pub fn snapshot(&self, id: ObjectId) -> Option<LibraryObject> {
        self.objects.read().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl LibraryRepository for MockLibraryRepository {
    async fn get(&self, id: ObjectId) -> RepoResult<Option<LibraryObject>> {
        Ok(self.snapshot(id))
    }

    async fn create(&self, object: &LibraryObject) -> RepoResult<ObjectId> {
        let id = next(&self.next_id);
        let mut object = object.clone();
        object.id = id;
        self.objects.write().unwrap().insert(id, object);
        Ok(id)
    }

    async fn update(&self, object: &LibraryObject) -> RepoResult<()> {
        self.objects
            .write()
            .unwrap()
            .insert(object.id, object.clone());
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> RepoResult<()> {
        self.objects.write().unwrap().remove(&id);
        Ok(())
    }

    async fn set_visibility(&self, id: ObjectId, visibility: PermissionLevel) -> RepoResult<()> {
        if let Some(object) = self.objects.write().unwrap().get_mut(&id) {
            object.visibility = visibility;
        }
        Ok(())
    }
}

// ============================================================================
// MockPlacedObjectRepository
// ============================================================================

#[derive(Default)]
pub struct MockPlacedObjectRepository {
    objects: RwLock<HashMap<ObjectId, PlacedObject>>,
    owners: Arc<MockObjectOwnerRepository>,
    next_id: AtomicU64,
    failing_writes: AtomicBool,
}

impl MockPlacedObjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share owner rows with the given owner repository
    pub fn with_owners(owners: Arc<MockObjectOwnerRepository>) -> Self {
        Self {
            owners,
            ..Self::default()
        }
    }

    pub fn insert(&self, mut object: PlacedObject, id: ObjectId) -> PlacedObject {
        object.id = id;
        self.next_id.fetch_max(id, Ordering::Relaxed);
        self.objects.write().unwrap().insert(id, object.clone());
        object
    }

    pub fn snapshot(&self, id: ObjectId) -> Option<PlacedObject> {
        self.objects.read().unwrap().get(&id).cloned()
    }

    /// Make every write fail with a storage error
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    fn check_write(&self) -> RepoResult<()> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("placed object store is read-only"));
        }
        Ok(())
    }
}

#[async_trait]
impl PlacedObjectRepository for MockPlacedObjectRepository {
    async fn get(&self, id: ObjectId) -> RepoResult<Option<PlacedObject>> {
        Ok(self.snapshot(id))
    }

    async fn create(&self, object: &PlacedObject) -> RepoResult<ObjectId> {
        self.check_write()?;
        let id = next(&self.next_id);
        let mut object = object.clone();
        object.id = id;
        self.objects.write().unwrap().insert(id, object);
        Ok(id)
    }

    async fn update(&self, object: &PlacedObject) -> RepoResult<()> {
        self.check_write()?;
        self.objects
            .write()
            .unwrap()
            .insert(object.id, object.clone());
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> RepoResult<()> {
        self.check_write()?;
        self.objects.write().unwrap().remove(&id);
        Ok(())
    }

    async fn move_to(&self, id: ObjectId, pos_x: i32, pos_y: i32) -> RepoResult<()> {
        self.check_write()?;
        let mut objects = self.objects.write().unwrap();
        let object = objects
            .get_mut(&id)
            .ok_or_else(|| anyhow!("placed object {} not found", id))?;
        object.pos_x = pos_x;
        object.pos_y = pos_y;
        Ok(())
    }

    async fn update_access(
        &self,
        id: ObjectId,
        owners: &[UserId],
        can_be_viewed_by: PermissionLevel,
        can_be_modified_by: PermissionLevel,
    ) -> RepoResult<()> {
        self.check_write()?;
        {
            let mut objects = self.objects.write().unwrap();
            let object = objects
                .get_mut(&id)
                .ok_or_else(|| anyhow!("placed object {} not found", id))?;
            object.can_be_viewed_by = can_be_viewed_by;
            object.can_be_modified_by = can_be_modified_by;
        }
        self.owners.set_owners(id, owners);
        Ok(())
    }
}

// ============================================================================
// MockChatRepository
// ============================================================================

#[derive(Default)]
pub struct MockChatRepository {
    messages: RwLock<HashMap<Uuid, ChatMessage>>,
}

impl MockChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.messages.read().unwrap().len()
    }
}

#[async_trait]
impl ChatRepository for MockChatRepository {
    async fn get(&self, id: &Uuid) -> RepoResult<Option<ChatMessage>> {
        Ok(self.messages.read().unwrap().get(id).cloned())
    }

    async fn create(&self, message: &ChatMessage) -> RepoResult<()> {
        self.messages
            .write()
            .unwrap()
            .insert(message.id, message.clone());
        Ok(())
    }

    async fn update(&self, message: &ChatMessage) -> RepoResult<()> {
        self.messages
            .write()
            .unwrap()
            .insert(message.id, message.clone());
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> RepoResult<()> {
        self.messages.write().unwrap().remove(id);
        Ok(())
    }
}

// ============================================================================
// MockRepositories - All repositories bundled together
// ============================================================================

/// Bundle of all mock repositories for convenient test setup
#[derive(Clone)]
pub struct MockRepositories {
    pub members: Arc<MockMembershipRepository>,
    pub owners: Arc<MockObjectOwnerRepository>,
    pub scenes: Arc<MockSceneRepository>,
    pub library: Arc<MockLibraryRepository>,
    pub placed: Arc<MockPlacedObjectRepository>,
    pub chat: Arc<MockChatRepository>,
}

impl MockRepositories {
    pub fn new() -> Self {
        let owners = Arc::new(MockObjectOwnerRepository::new());
        Self {
            members: Arc::new(MockMembershipRepository::new()),
            scenes: Arc::new(MockSceneRepository::new()),
            library: Arc::new(MockLibraryRepository::new()),
            placed: Arc::new(MockPlacedObjectRepository::with_owners(owners.clone())),
            owners,
            chat: Arc::new(MockChatRepository::new()),
        }
    }

    /// Build the application services on top of these mocks
    pub fn services(&self, broker: SharedBroker) -> ApplicationServices {
        ApplicationServicesBuilder::new()
            .with_broker(broker)
            .with_membership_repo(self.members.clone())
            .with_owner_repo(self.owners.clone())
            .with_scene_repo(self.scenes.clone())
            .with_library_repo(self.library.clone())
            .with_placed_repo(self.placed.clone())
            .with_chat_repo(self.chat.clone())
            .build()
            .expect("all repositories are provided")
    }
}

impl Default for MockRepositories {
    fn default() -> Self {
        Self::new()
    }
}
