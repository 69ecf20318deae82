// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash, departure, and master-transfer specs.

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn session_expiry_produces_a_leave_at_every_peer() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    let b = spawn_node(&hub, "b").await;

    a.join().await;
    settle(&[&a]).await;
    b.join().await;
    settle(&[&a, &b]).await;

    hub.expire(b.client);
    tokio::time::sleep(Duration::from_millis(5)).await;
    settle(&[&a]).await;

    assert_eq!(a.driver.members(), [a.id.clone()]);
    assert_eq!(
        a.handler.leaves(),
        [Call::Leave { node: b.id.clone(), members: vec![a.id.clone()] }]
    );
}

#[tokio::test]
async fn local_leave_updates_only_the_leaver() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    let b = spawn_node(&hub, "b").await;

    a.join().await;
    settle(&[&a]).await;
    b.join().await;
    settle(&[&a, &b]).await;

    b.driver.leave().unwrap();
    settle(&[&a, &b]).await;

    assert_eq!(b.driver.members(), [a.id.clone()]);
    assert_eq!(b.handler.leaves(), [Call::Leave { node: b.id.clone(), members: vec![a.id.clone()] }]);
    // the session is still alive, so peers have not seen a departure
    assert_eq!(a.driver.members(), [a.id.clone(), b.id.clone()]);
    assert!(a.handler.leaves().is_empty());
}

#[tokio::test]
async fn crash_between_member_create_and_approval_is_skipped() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    a.join().await;
    settle(&[&a]).await;

    let b = spawn_node(&hub, "b").await;
    b.join().await;

    // consume b's slot reservation so a's cursor sits at the blocked join
    a.tick().await;

    hub.expire(b.client);
    tokio::time::sleep(Duration::from_millis(5)).await;
    settle(&[&a]).await;

    // the leave was discarded (b never entered the view) and the blocked
    // join from the departed node was stepped over
    assert_eq!(a.driver.members(), [a.id.clone()]);
    assert!(a.handler.leaves().is_empty());
    assert!(!a.handler.calls().contains(&Call::CheckJoin { node: b.id.clone() }));
    assert!(a
        .handler
        .joins()
        .iter()
        .all(|c| !matches!(c, Call::Join { node, .. } if *node == b.id)));

    // the cluster still makes progress
    a.driver.notify(b"after", None).await.unwrap();
    settle(&[&a]).await;
    assert_eq!(a.handler.notifies(), [(a.id.clone(), b"after".to_vec())]);
}

#[tokio::test]
async fn master_transfer_collapses_the_view_to_self() {
    let hub = MemoryHub::new();
    let b = spawn_node(&hub, "b").await;
    b.join().await;
    settle(&[&b]).await;

    // an approved join carrying a master transfer, as written by a master
    // that exited immediately afterwards
    let mut event = Event::join(
        MemberRecord::unjoined(NodeId::new("old-master").unwrap(), ClientId(99), 0),
        Vec::new(),
    )
    .unwrap();
    event.blocked = false;
    event.sender.joined = true;
    event.join_result = JoinResult::MasterTransfer;

    let (writer, _rx) = hub.connect();
    writer
        .create(
            &format!("{}/", paths::QUEUE),
            &codec::encode(&event).unwrap(),
            CreateMode::PersistentSequential,
        )
        .await
        .unwrap();
    settle(&[&b]).await;

    assert_eq!(b.driver.members(), [b.id.clone()]);
    // no handler fires for the transferred join
    assert!(b
        .handler
        .joins()
        .iter()
        .all(|c| !matches!(c, Call::Join { node, .. } if node.as_str() == "old-master")));

    // the collapsed node keeps functioning as sole member and master
    b.driver.notify(b"still-alive", None).await.unwrap();
    settle(&[&b]).await;
    assert_eq!(b.handler.notifies(), [(b.id.clone(), b"still-alive".to_vec())]);
}
