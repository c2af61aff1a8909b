//! Chat messages

use pretty_assertions::assert_eq;
use tabletop_core::{MessageType, NewMessage, SyncAction, SyncError};
use tests::fixtures::*;
use uuid::Uuid;

use super::World;

fn text(body: &str) -> NewMessage {
    NewMessage {
        text: body.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn member_sends_message_to_table() {
    let mut world = World::new();

    let message = world
        .services
        .chat
        .send(PLAYER, TABLE, text("I open the door"))
        .await
        .unwrap();

    assert_eq!(message.sender_id, PLAYER);
    assert_eq!(message.private_recipient_id, None);
    assert_eq!(world.repos.chat.count(), 1);

    let event = world.only_event();
    assert_eq!(event.table_id, TABLE);
    assert_eq!(event.action, SyncAction::MessageSent { message });
}

#[tokio::test]
async fn outsider_cannot_chat() {
    let mut world = World::new();

    let err = world
        .services
        .chat
        .send(OUTSIDER, TABLE, text("hi"))
        .await
        .unwrap_err();

    assert!(err.is_permission_denied());
    assert_eq!(world.repos.chat.count(), 0);
    world.assert_silent();
}

#[tokio::test]
async fn empty_and_system_messages_are_rejected() {
    let mut world = World::new();

    let err = world
        .services
        .chat
        .send(PLAYER, TABLE, text("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidArgument(_)));

    let err = world
        .services
        .chat
        .send(
            MASTER,
            TABLE,
            NewMessage {
                text: "server restarting".to_string(),
                message_type: MessageType::System,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidArgument(_)));

    let err = world
        .services
        .chat
        .send(
            PLAYER,
            TABLE,
            NewMessage {
                message_type: MessageType::Image,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidArgument(_)));

    world.assert_silent();
}

#[tokio::test]
async fn private_message_goes_to_the_table_topic_with_recipient() {
    let mut world = World::new();

    let message = world
        .services
        .chat
        .send_private(MASTER, TABLE, PLAYER, text("a trap"))
        .await
        .unwrap();

    assert_eq!(message.private_recipient_id, Some(PLAYER));
    let event = world.only_event();
    assert_eq!(event.table_id, TABLE);
    assert_eq!(event.action, SyncAction::MessageSent { message });
}

#[tokio::test]
async fn private_message_needs_a_member_recipient() {
    let mut world = World::new();

    let err = world
        .services
        .chat
        .send_private(MASTER, TABLE, OUTSIDER, text("psst"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound(_)));

    let err = world
        .services
        .chat
        .send_private(MASTER, TABLE, MASTER, text("note to self"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidArgument(_)));

    world.assert_silent();
}

#[tokio::test]
async fn only_the_author_edits_or_deletes() {
    let mut world = World::new();
    let message = world
        .services
        .chat
        .send(PLAYER, TABLE, text("typo"))
        .await
        .unwrap();
    world.events();

    let err = world
        .services
        .chat
        .update(MASTER, message.id, "fixed")
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());

    let err = world
        .services
        .chat
        .delete(MASTER, message.id)
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
    world.assert_silent();

    let edited = world
        .services
        .chat
        .update(PLAYER, message.id, "fixed")
        .await
        .unwrap();
    assert_eq!(edited.text, "fixed");
    assert!(edited.updated_at.is_some());

    world.services.chat.delete(PLAYER, message.id).await.unwrap();

    let actions: Vec<_> = world.events().into_iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            SyncAction::MessageUpdated { message: edited },
            SyncAction::MessageDeleted {
                message_id: message.id,
                table_id: TABLE,
            },
        ]
    );
    assert_eq!(world.repos.chat.count(), 0);
}

#[tokio::test]
async fn deleting_an_unknown_message_is_a_silent_success() {
    let mut world = World::new();

    world
        .services
        .chat
        .delete(PLAYER, Uuid::new_v4())
        .await
        .unwrap();

    world.assert_silent();
}
