// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Solo bootstrap specs.

use crate::prelude::*;

#[tokio::test]
async fn solo_process_becomes_sole_member_and_master() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;

    a.join_with(b"hello").await;
    settle(&[&a]).await;

    assert_eq!(a.driver.members(), [a.id.clone()]);
    assert_eq!(
        a.handler.joins(),
        [Call::Join {
            node: a.id.clone(),
            members: vec![a.id.clone()],
            result: JoinResult::Success,
            payload: b"hello".to_vec(),
        }]
    );
    // the sole member approved itself
    assert!(a.handler.calls().contains(&Call::CheckJoin { node: a.id.clone() }));
}

#[tokio::test]
async fn registry_record_is_marked_joined() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;

    a.join().await;
    settle(&[&a]).await;

    let stored: MemberRecord =
        codec::decode(&hub.data(&paths::member_entry(&a.id)).unwrap()).unwrap();
    assert!(stored.joined);
    assert_eq!(stored.node, a.id);
    assert_eq!(stored.client, a.client);
}

#[tokio::test]
async fn registry_holds_exactly_the_joined_sessions() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    let b = spawn_node(&hub, "b").await;

    a.join().await;
    settle(&[&a]).await;
    b.join().await;
    settle(&[&a, &b]).await;

    let (probe, _rx) = hub.connect();
    let names = probe.children(paths::MEMBER, false).await.unwrap();
    assert_eq!(names, ["a", "b"]);
}

#[tokio::test]
async fn notify_before_join_is_rejected() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    let err = a.driver.notify(b"x", None).await.unwrap_err();
    assert!(matches!(err, herd_driver::DriverError::NotJoined));
}
