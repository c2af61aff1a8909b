//! Delivery semantics across topics and subscribers

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tabletop_core::{create_shared_broker, EventPublisher, SyncAction, SyncEvent, Topic};
use tests::async_helpers::QUIET_PERIOD;
use tests::events::{collect_events, drain};

fn moved(scene_id: u64, pos_x: i32) -> SyncEvent {
    SyncEvent::for_scene(
        scene_id,
        SyncAction::PlacedTokenMoved {
            placed_token_id: 1,
            scene_id,
            pos_x,
            pos_y: 0,
        },
    )
}

#[tokio::test]
async fn every_subscriber_of_a_topic_receives_the_event_once() {
    let broker = create_shared_broker(10);
    let publisher = EventPublisher::new(broker.clone());

    let mut inboxes = Vec::new();
    let mut guards = Vec::new();
    for _ in 0..3 {
        let (subscriber, inbox) = broker.new_subscriber();
        guards.push(broker.join(&subscriber, [Topic::scene(7)]));
        inboxes.push(inbox);
    }

    assert_eq!(publisher.publish(moved(7, 250)), 3);

    for inbox in &mut inboxes {
        let events = collect_events(inbox, QUIET_PERIOD).await;
        assert_eq!(events, vec![moved(7, 250)]);
    }
}

#[tokio::test]
async fn events_never_cross_topics() {
    let broker = create_shared_broker(10);
    let publisher = EventPublisher::new(broker.clone());

    let (forest, mut forest_inbox) = broker.new_subscriber();
    let (castle, mut castle_inbox) = broker.new_subscriber();
    let _forest = broker.join(&forest, [Topic::scene(7)]);
    let _castle = broker.join(&castle, [Topic::scene(8)]);

    publisher.publish(moved(7, 1));
    publisher.publish(moved(8, 2));

    assert_eq!(drain(&mut forest_inbox), vec![moved(7, 1)]);
    assert_eq!(drain(&mut castle_inbox), vec![moved(8, 2)]);
}

#[tokio::test]
async fn table_and_scene_subscription_sees_both_streams() {
    let broker = create_shared_broker(10);
    let publisher = EventPublisher::new(broker.clone());

    let (subscriber, mut inbox) = broker.new_subscriber();
    let _guard = broker.join(&subscriber, [Topic::table(1), Topic::scene(7)]);

    let deleted = SyncEvent::for_table(1, SyncAction::SceneDeleted { scene_id: 9 });
    publisher.publish(deleted.clone());
    publisher.publish(moved(7, 3));

    assert_eq!(drain(&mut inbox), vec![deleted, moved(7, 3)]);
}

#[tokio::test]
async fn publishing_to_an_empty_topic_is_a_no_op() {
    let broker = create_shared_broker(10);
    assert_eq!(broker.publish(&Topic::scene(404), moved(404, 0)), 0);
    assert_eq!(broker.topic_count(), 0);
}

#[tokio::test]
async fn slow_subscriber_loses_events_without_blocking_others() {
    let broker = create_shared_broker(2);

    let (slow, mut slow_inbox) = broker.new_subscriber();
    let (fast, mut fast_inbox) = broker.new_subscriber();
    let _slow = broker.join(&slow, [Topic::scene(7)]);
    let _fast = broker.join(&fast, [Topic::scene(7)]);

    let mut fast_seen = Vec::new();
    for x in 0..5 {
        broker.publish(&Topic::scene(7), moved(7, x));
        // The fast subscriber keeps up
        fast_seen.extend(drain(&mut fast_inbox));
    }

    assert_eq!(fast_seen.len(), 5);
    // Only the first `capacity` events fit; later ones were dropped
    assert_eq!(drain(&mut slow_inbox), vec![moved(7, 0), moved(7, 1)]);
}

#[tokio::test]
async fn dropping_the_subscription_stops_delivery_and_cleans_up() {
    let broker = create_shared_broker(10);
    let (subscriber, mut inbox) = broker.new_subscriber();

    let guard = broker.join(&subscriber, [Topic::table(1), Topic::scene(7)]);
    assert_eq!(broker.topic_count(), 2);

    drop(guard);
    assert_eq!(broker.topic_count(), 0);
    assert_eq!(broker.subscriber_count(&Topic::scene(7)), 0);

    broker.publish(&Topic::scene(7), moved(7, 0));
    assert!(drain(&mut inbox).is_empty());
}

#[tokio::test]
async fn shared_payload_is_not_copied_per_subscriber() {
    let broker = create_shared_broker(10);
    let (a, mut a_inbox) = broker.new_subscriber();
    let (b, mut b_inbox) = broker.new_subscriber();
    let _a = broker.join(&a, [Topic::scene(7)]);
    let _b = broker.join(&b, [Topic::scene(7)]);

    broker.publish(&Topic::scene(7), moved(7, 9));

    let first = a_inbox.recv().await.unwrap();
    let second = b_inbox.recv().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}
