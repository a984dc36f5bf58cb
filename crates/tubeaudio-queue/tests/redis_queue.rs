//! Redis queue integration tests.

use std::time::Duration;

use tubeaudio_queue::{QueueConfig, RedisStreamQueue, ReceiveRequest, WorkQueue};

fn test_config(stream: &str) -> QueueConfig {
    dotenvy::dotenv().ok();
    QueueConfig {
        stream_name: format!("tubeaudio:test:{}", stream),
        consumer_group: format!("tubeaudio:test:{}:group", stream),
        ..QueueConfig::from_env()
    }
}

/// Test enqueue, receive and acknowledge cycle.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_receive_and_acknowledge() {
    let queue = RedisStreamQueue::connect(test_config("cycle"))
        .await
        .expect("Failed to connect");
    queue.init().await.expect("Failed to initialize queue");

    let body = r#"{"Message":"https://youtu.be/watch?v=abc123"}"#;
    let message_id = queue.enqueue(body).await.expect("Failed to enqueue");

    let request = ReceiveRequest {
        max_items: 2,
        wait: Duration::from_secs(1),
        lease: Duration::from_secs(60),
    };
    let items = queue.receive(&request).await.expect("Failed to receive");
    let item = items
        .into_iter()
        .find(|item| item.id() == message_id)
        .expect("enqueued item not received");
    assert_eq!(item.body(), body);

    queue.acknowledge(item).await.expect("Failed to ack");
}

/// Test that an unacknowledged item comes back once its lease expires.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_expired_lease_redelivers() {
    let queue = RedisStreamQueue::connect(test_config("lease"))
        .await
        .expect("Failed to connect");
    queue.init().await.expect("Failed to initialize queue");

    let message_id = queue
        .enqueue(r#"{"Message":"https://youtu.be/watch?v=lease"}"#)
        .await
        .expect("Failed to enqueue");

    let request = ReceiveRequest {
        max_items: 10,
        wait: Duration::ZERO,
        lease: Duration::from_millis(200),
    };
    let first = queue.receive(&request).await.expect("Failed to receive");
    assert!(first.iter().any(|item| item.id() == message_id));

    tokio::time::sleep(Duration::from_millis(400)).await;

    let second = queue.receive(&request).await.expect("Failed to receive");
    let item = second
        .into_iter()
        .find(|item| item.id() == message_id)
        .expect("item not redelivered after lease expiry");
    queue.acknowledge(item).await.expect("Failed to ack");
}

/// Test that a zero poll wait returns immediately on an empty stream.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_zero_wait_does_not_block() {
    let queue = RedisStreamQueue::connect(test_config("empty"))
        .await
        .expect("Failed to connect");
    queue.init().await.expect("Failed to initialize queue");

    let request = ReceiveRequest {
        max_items: 2,
        wait: Duration::ZERO,
        lease: Duration::from_secs(60),
    };
    let result = tokio::time::timeout(Duration::from_secs(2), queue.receive(&request)).await;
    assert!(result.is_ok(), "zero-wait receive blocked");
}
