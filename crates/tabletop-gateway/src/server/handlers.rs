//! HTTP handlers for the gateway server
//!
//! Each mutation handler is a thin adapter: decode the body, hand the
//! authenticated caller to the application service, map the result.
//! Events are published by the services, never here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tabletop_core::{
    AccessUpdate, ChatMessage, LibraryObject, LibraryObjectUpdate, NewLibraryObject, NewMessage,
    ObjectId, PermissionLevel, PlaceObject, PlacedObject, PlacedObjectUpdate, Role, Scene,
    SceneId, SceneUpdate, TableId, TableMember, UserId,
};
use tracing::debug;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::auth::Caller;

type ApiResult<T> = Result<T, ApiError>;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    debug!("[Gateway] Health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Scenes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSceneRequest {
    pub name: String,
    pub width: i32,
    pub height: i32,
}

pub async fn create_scene(
    State(state): State<AppState>,
    caller: Caller,
    Path(table_id): Path<TableId>,
    Json(body): Json<CreateSceneRequest>,
) -> ApiResult<(StatusCode, Json<Scene>)> {
    let scene = state
        .services
        .scenes
        .create(caller.user_id, table_id, &body.name, body.width, body.height)
        .await?;
    Ok((StatusCode::CREATED, Json(scene)))
}

pub async fn update_scene(
    State(state): State<AppState>,
    caller: Caller,
    Path(scene_id): Path<SceneId>,
    Json(changes): Json<SceneUpdate>,
) -> ApiResult<Json<Scene>> {
    let scene = state
        .services
        .scenes
        .update(caller.user_id, scene_id, changes)
        .await?;
    Ok(Json(scene))
}

pub async fn delete_scene(
    State(state): State<AppState>,
    caller: Caller,
    Path((table_id, scene_id)): Path<(TableId, SceneId)>,
) -> ApiResult<StatusCode> {
    state
        .services
        .scenes
        .delete(caller.user_id, table_id, scene_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Library
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visibility: PermissionLevel,
}

pub async fn create_library_object(
    State(state): State<AppState>,
    caller: Caller,
    Path(table_id): Path<TableId>,
    Json(draft): Json<NewLibraryObject>,
) -> ApiResult<(StatusCode, Json<LibraryObject>)> {
    let object = state
        .services
        .library
        .create(caller.user_id, table_id, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(object)))
}

pub async fn update_library_object(
    State(state): State<AppState>,
    caller: Caller,
    Path(object_id): Path<ObjectId>,
    Json(changes): Json<LibraryObjectUpdate>,
) -> ApiResult<Json<LibraryObject>> {
    let object = state
        .services
        .library
        .update(caller.user_id, object_id, changes)
        .await?;
    Ok(Json(object))
}

pub async fn delete_library_object(
    State(state): State<AppState>,
    caller: Caller,
    Path(object_id): Path<ObjectId>,
) -> ApiResult<StatusCode> {
    state.services.library.delete(caller.user_id, object_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_library_visibility(
    State(state): State<AppState>,
    caller: Caller,
    Path(object_id): Path<ObjectId>,
    Json(body): Json<VisibilityRequest>,
) -> ApiResult<Json<LibraryObject>> {
    let object = state
        .services
        .permissions
        .update_library_visibility(caller.user_id, object_id, body.visibility)
        .await?;
    Ok(Json(object))
}

// ============================================================================
// Placed objects
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub pos_x: i32,
    pub pos_y: i32,
}

pub async fn place_object(
    State(state): State<AppState>,
    caller: Caller,
    Path(scene_id): Path<SceneId>,
    Json(request): Json<PlaceObject>,
) -> ApiResult<(StatusCode, Json<PlacedObject>)> {
    let object = state
        .services
        .placed_objects
        .place(caller.user_id, scene_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(object)))
}

pub async fn update_placed_object(
    State(state): State<AppState>,
    caller: Caller,
    Path(object_id): Path<ObjectId>,
    Json(changes): Json<PlacedObjectUpdate>,
) -> ApiResult<Json<PlacedObject>> {
    let object = state
        .services
        .placed_objects
        .update(caller.user_id, object_id, changes)
        .await?;
    Ok(Json(object))
}

pub async fn delete_placed_object(
    State(state): State<AppState>,
    caller: Caller,
    Path(object_id): Path<ObjectId>,
) -> ApiResult<StatusCode> {
    state
        .services
        .placed_objects
        .delete(caller.user_id, object_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_placed_object(
    State(state): State<AppState>,
    caller: Caller,
    Path(object_id): Path<ObjectId>,
    Json(body): Json<MoveRequest>,
) -> ApiResult<Json<PlacedObject>> {
    let object = state
        .services
        .placed_objects
        .move_to(caller.user_id, object_id, body.pos_x, body.pos_y)
        .await?;
    Ok(Json(object))
}

pub async fn update_access(
    State(state): State<AppState>,
    caller: Caller,
    Path(object_id): Path<ObjectId>,
    Json(update): Json<AccessUpdate>,
) -> ApiResult<Json<PlacedObject>> {
    let object = state
        .services
        .permissions
        .update_access(caller.user_id, object_id, update)
        .await?;
    Ok(Json(object))
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PrivateMessageRequest {
    pub recipient_id: UserId,
    #[serde(flatten)]
    pub message: NewMessage,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub text: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(table_id): Path<TableId>,
    Json(draft): Json<NewMessage>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let message = state
        .services
        .chat
        .send(caller.user_id, table_id, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn send_private_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(table_id): Path<TableId>,
    Json(body): Json<PrivateMessageRequest>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let message = state
        .services
        .chat
        .send_private(caller.user_id, table_id, body.recipient_id, body.message)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn update_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(message_id): Path<Uuid>,
    Json(body): Json<UpdateMessageRequest>,
) -> ApiResult<Json<ChatMessage>> {
    let message = state
        .services
        .chat
        .update(caller.user_id, message_id, &body.text)
        .await?;
    Ok(Json(message))
}

pub async fn delete_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(message_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.chat.delete(caller.user_id, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Membership
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

pub async fn change_role(
    State(state): State<AppState>,
    caller: Caller,
    Path((table_id, user_id)): Path<(TableId, UserId)>,
    Json(body): Json<RoleRequest>,
) -> ApiResult<Json<TableMember>> {
    let member = state
        .services
        .membership
        .change_role(caller.user_id, table_id, user_id, body.role)
        .await?;
    Ok(Json(member))
}
