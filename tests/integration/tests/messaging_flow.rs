//! Messaging scenarios: unread counters and live delivery through the
//! connection registry.
//!
//! Run with: cargo test -p integration-tests --test messaging_flow

use integration_tests::{new_user, LiveStack};
use stay_core::entities::MessageKind;
use stay_core::{DomainEvent, Snowflake};
use stay_service::dto::SendMessageRequest;
use stay_service::MessagingService;

fn text(to: Snowflake, content: &str) -> SendMessageRequest {
    SendMessageRequest {
        receiver_id: to,
        content: content.to_string(),
        kind: MessageKind::Text,
    }
}

async fn unread(messaging: &MessagingService<'_>, user: Snowflake) -> i32 {
    messaging
        .list_conversations_for(user)
        .await
        .unwrap()
        .first()
        .map_or(0, |c| c.unread_count)
}

#[tokio::test]
async fn test_unread_counter_tracks_unread_messages() {
    let stack = LiveStack::start();
    let messaging = MessagingService::new(stack.ctx());
    let (guest, host) = (new_user(), new_user());

    for n in 0..5 {
        messaging
            .send_message(guest.id, text(host.id, &format!("question {n}")))
            .await
            .unwrap();
    }
    assert_eq!(unread(&messaging, host.id).await, 5);
    assert_eq!(unread(&messaging, guest.id).await, 0);

    let thread = messaging.get_messages(host.id, guest.id).await.unwrap();
    assert_eq!(thread.len(), 5);
    assert_eq!(thread[0].content, "question 0");
    assert_eq!(unread(&messaging, host.id).await, 0);
    assert_eq!(unread(&messaging, guest.id).await, 0);

    messaging
        .send_message(host.id, text(guest.id, "welcome"))
        .await
        .unwrap();
    assert_eq!(unread(&messaging, guest.id).await, 1);
    assert_eq!(unread(&messaging, host.id).await, 0);
}

#[tokio::test]
async fn test_inbox_lists_other_participant() {
    let stack = LiveStack::start();
    let messaging = MessagingService::new(stack.ctx());
    let (guest, host, other_host) = (new_user(), new_user(), new_user());

    let first = messaging
        .send_message(guest.id, text(host.id, "is parking available?"))
        .await
        .unwrap();
    messaging
        .send_message(guest.id, text(other_host.id, "early check-in?"))
        .await
        .unwrap();

    let inbox = messaging.list_conversations_for(guest.id).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].other_participant_id, other_host.id);
    assert_eq!(inbox[1].other_participant_id, host.id);
    assert_eq!(inbox[1].last_message_id, Some(first.id));
}

#[tokio::test]
async fn test_message_delivered_to_every_receiver_connection() {
    let stack = LiveStack::start();
    let messaging = MessagingService::new(stack.ctx());
    let (guest, host) = (new_user(), new_user());

    let (_, mut host_phone) = stack.registry.connect(host.id);
    let (_, mut host_laptop) = stack.registry.connect(host.id);
    let (_, mut guest_phone) = stack.registry.connect(guest.id);

    let sent = messaging
        .send_message(guest.id, text(host.id, "arriving at 6pm"))
        .await
        .unwrap();

    for rx in [&mut host_phone, &mut host_laptop] {
        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.t, "MESSAGE_CREATED");
        match envelope.event().unwrap() {
            DomainEvent::MessageCreated(e) => {
                assert_eq!(e.message_id, sent.id);
                assert_eq!(e.content, "arriving at 6pm");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert!(guest_phone.try_recv().is_err());

    // Online receivers are not notified out of band
    assert!(stack.harness.notifier.sent_to(host.id).is_empty());
}

#[tokio::test]
async fn test_offline_receiver_is_notified() {
    let stack = LiveStack::start();
    let messaging = MessagingService::new(stack.ctx());
    let (guest, host) = (new_user(), new_user());

    let (_, closed) = stack.registry.connect(host.id);
    drop(closed);

    messaging
        .send_message(guest.id, text(host.id, "is the houseboat free next week?"))
        .await
        .unwrap();

    assert_eq!(stack.registry.connection_count(host.id), 0);
    let sent = stack.harness.notifier.sent_to(host.id);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("houseboat"));
}

#[tokio::test]
async fn test_media_message_sends_uploaded_url() {
    let stack = LiveStack::start();
    let messaging = MessagingService::new(stack.ctx());
    let (guest, host) = (new_user(), new_user());
    let (_, mut host_rx) = stack.registry.connect(host.id);

    let sent = messaging
        .send_media_message(guest.id, host.id, b"\x89PNG....", "image/png", MessageKind::Image)
        .await
        .unwrap();
    assert_eq!(sent.kind, MessageKind::Image);
    assert!(sent.content.starts_with("memory://"));
    assert_eq!(stack.harness.media.uploads(), 1);

    let envelope = host_rx.recv().await.unwrap();
    assert_eq!(envelope.t, "MESSAGE_CREATED");

    let err = messaging
        .send_media_message(guest.id, guest.id, b"data", "image/png", MessageKind::Image)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(stack.harness.media.uploads(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_to_one_host_all_counted() {
    let stack = LiveStack::start();
    let messaging = MessagingService::new(stack.ctx());
    let (guest, host) = (new_user(), new_user());

    let (guest_id, host_id) = (guest.id, host.id);
    let sends = (0..40).map(|n| {
        let messaging = &messaging;
        async move {
            messaging
                .send_message(guest_id, text(host_id, &format!("burst {n}")))
                .await
        }
    });
    let sent = futures::future::join_all(sends).await;
    assert!(sent.iter().all(Result::is_ok));

    assert_eq!(unread(&messaging, host.id).await, 40);
    let conversation = messaging
        .get_or_create_conversation(host.id, guest.id)
        .await
        .unwrap();
    assert_eq!(conversation.message_count, 40);
    assert_eq!(messaging.get_messages(host.id, guest.id).await.unwrap().len(), 40);
    assert_eq!(unread(&messaging, host.id).await, 0);
}
