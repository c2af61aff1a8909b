//! Placed token and image mutations

use pretty_assertions::assert_eq;
use tabletop_core::{
    LayerType, PlaceObject, PlacedObjectUpdate, SyncAction, SyncError, SyncEvent,
};
use tests::fixtures::*;

use super::World;

#[tokio::test]
async fn owner_moves_token_and_scene_hears_about_it() {
    let mut world = World::new();

    let placed = world
        .services
        .placed_objects
        .move_to(PLAYER, PLACED_TOKEN, 250, 300)
        .await
        .unwrap();

    assert_eq!((placed.pos_x, placed.pos_y), (250, 300));
    let stored = world.repos.placed.snapshot(PLACED_TOKEN).unwrap();
    assert_eq!((stored.pos_x, stored.pos_y), (250, 300));
    assert_eq!(
        world.only_event(),
        SyncEvent::for_scene(
            FOREST,
            SyncAction::PlacedTokenMoved {
                placed_token_id: PLACED_TOKEN,
                scene_id: FOREST,
                pos_x: 250,
                pos_y: 300,
            },
        )
    );
}

#[tokio::test]
async fn moving_an_image_publishes_the_image_variant() {
    let mut world = World::new();

    world
        .services
        .placed_objects
        .move_to(MASTER, PLACED_IMAGE, -4, 12)
        .await
        .unwrap();

    assert_eq!(
        world.only_event().action,
        SyncAction::PlacedImageMoved {
            placed_image_id: PLACED_IMAGE,
            scene_id: FOREST,
            pos_x: -4,
            pos_y: 12,
        }
    );
}

#[tokio::test]
async fn non_owner_move_is_denied_and_silent() {
    let mut world = World::new();

    let err = world
        .services
        .placed_objects
        .move_to(OUTSIDER, PLACED_TOKEN, 250, 300)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::PermissionDenied(_)));
    assert_eq!(world.repos.placed.snapshot(PLACED_TOKEN).unwrap().pos_x, 5);
    world.assert_silent();
}

#[tokio::test]
async fn player_cannot_move_objects_they_do_not_own() {
    let mut world = World::new();

    let err = world
        .services
        .placed_objects
        .move_to(PLAYER, PLACED_IMAGE, 0, 0)
        .await
        .unwrap_err();

    assert!(err.is_permission_denied());
    world.assert_silent();
}

#[tokio::test]
async fn storage_failure_publishes_nothing() {
    let mut world = World::new();
    world.repos.placed.set_failing_writes(true);

    let err = world
        .services
        .placed_objects
        .move_to(MASTER, PLACED_TOKEN, 1, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Storage(_)));
    world.assert_silent();
}

#[tokio::test]
async fn moving_a_missing_object_is_not_found() {
    let mut world = World::new();

    let err = world
        .services
        .placed_objects
        .move_to(MASTER, 9_999, 1, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::NotFound(_)));
    world.assert_silent();
}

#[tokio::test]
async fn master_places_library_token_on_scene() {
    let mut world = World::new();

    let placed = world
        .services
        .placed_objects
        .place(
            MASTER,
            CASTLE,
            PlaceObject {
                library_id: GOBLIN,
                pos_x: 2,
                pos_y: 3,
                width: Some(2),
                height: None,
                layer: Some(LayerType::Map),
            },
        )
        .await
        .unwrap();

    assert_eq!(placed.scene_id, CASTLE);
    assert_eq!(placed.width, 2);
    assert_eq!(placed.layer, LayerType::Map);

    let event = world.only_event();
    assert_eq!(event.scene_id, CASTLE);
    assert_eq!(
        event.action,
        SyncAction::PlacedTokenCreated {
            placed_token: placed
        }
    );
}

#[tokio::test]
async fn player_cannot_place_objects() {
    let mut world = World::new();

    let err = world
        .services
        .placed_objects
        .place(
            PLAYER,
            FOREST,
            PlaceObject {
                library_id: GOBLIN,
                pos_x: 0,
                pos_y: 0,
                width: None,
                height: None,
                layer: None,
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_permission_denied());
    world.assert_silent();
}

#[tokio::test]
async fn invalid_size_is_rejected_before_any_lookup() {
    let mut world = World::new();

    let err = world
        .services
        .placed_objects
        .update(
            MASTER,
            PLACED_TOKEN,
            PlacedObjectUpdate {
                width: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::InvalidArgument(_)));
    world.assert_silent();
}

#[tokio::test]
async fn owner_updates_rotation_which_wraps() {
    let mut world = World::new();

    let placed = world
        .services
        .placed_objects
        .update(
            PLAYER,
            PLACED_TOKEN,
            PlacedObjectUpdate {
                rotation: Some(450),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(placed.rotation, 90);
    assert_eq!(world.only_event().type_name(), "placed_token_updated");
}

#[tokio::test]
async fn owner_removes_token() {
    let mut world = World::new();

    world
        .services
        .placed_objects
        .delete(PLAYER, PLACED_TOKEN)
        .await
        .unwrap();

    assert!(world.repos.placed.snapshot(PLACED_TOKEN).is_none());
    assert_eq!(
        world.only_event().action,
        SyncAction::PlacedTokenDeleted {
            placed_token_id: PLACED_TOKEN,
            scene_id: FOREST,
        }
    );
}
