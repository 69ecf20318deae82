// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification delivery and blocking-callback specs.

use crate::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

#[tokio::test]
async fn notify_reaches_every_member_once() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    let b = spawn_node(&hub, "b").await;

    a.join().await;
    settle(&[&a]).await;
    b.join().await;
    settle(&[&a, &b]).await;

    a.driver.notify(b"ping", None).await.unwrap();
    settle(&[&a, &b]).await;

    let expected = vec![(a.id.clone(), b"ping".to_vec())];
    assert_eq!(a.handler.notifies(), expected);
    assert_eq!(b.handler.notifies(), expected);
}

#[tokio::test]
async fn blocking_callback_completes_before_any_delivery() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    let b = spawn_node(&hub, "b").await;

    a.join().await;
    settle(&[&a]).await;
    b.join().await;
    settle(&[&a, &b]).await;

    let order: Arc<Mutex<Vec<String>>> = Arc::default();
    for node in [&a, &b] {
        let order = Arc::clone(&order);
        let who = node.id.clone();
        node.handler.set_notify_probe(move || order.lock().push(format!("deliver:{who}")));
    }

    let callback = {
        let order = Arc::clone(&order);
        Box::new(move |payload: &[u8]| {
            assert_eq!(payload, b"reconfigure");
            order.lock().push("callback".to_string());
        })
    };
    a.driver.notify(b"reconfigure", Some(callback)).await.unwrap();
    settle(&[&a, &b]).await;

    let order = order.lock().clone();
    assert_eq!(order.len(), 3);
    assert_eq!(order[0], "callback");
    assert!(order.contains(&"deliver:a".to_string()));
    assert!(order.contains(&"deliver:b".to_string()));

    assert_eq!(a.handler.notifies(), [(a.id.clone(), b"reconfigure".to_vec())]);
    assert_eq!(b.handler.notifies(), a.handler.notifies());
}

#[tokio::test]
async fn blocking_callbacks_run_once_per_notify() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    a.join().await;
    settle(&[&a]).await;

    let runs: Arc<Mutex<Vec<Vec<u8>>>> = Arc::default();
    for payload in [b"first".to_vec(), b"second".to_vec()] {
        let runs = Arc::clone(&runs);
        a.driver
            .notify(&payload, Some(Box::new(move |p: &[u8]| runs.lock().push(p.to_vec()))))
            .await
            .unwrap();
    }
    settle(&[&a]).await;

    assert_eq!(runs.lock().clone(), [b"first".to_vec(), b"second".to_vec()]);
    assert_eq!(
        a.handler.notifies(),
        [(a.id.clone(), b"first".to_vec()), (a.id.clone(), b"second".to_vec())]
    );
}

#[tokio::test]
async fn oversized_payload_is_rejected() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    a.join().await;
    settle(&[&a]).await;

    let too_big = vec![0u8; herd_core::MAX_EVENT_PAYLOAD + 1];
    let err = a.driver.notify(&too_big, None).await.unwrap_err();
    assert!(matches!(err, herd_driver::DriverError::Payload(_)));
}
