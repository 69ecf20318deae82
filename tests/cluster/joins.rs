// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Join serialization and view agreement specs.

use crate::prelude::*;

#[tokio::test]
async fn second_joiner_is_approved_by_the_master() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    let b = spawn_node(&hub, "b").await;

    a.join().await;
    settle(&[&a]).await;
    b.join_with(b"b-config").await;
    settle(&[&a, &b]).await;

    let expected = Call::Join {
        node: b.id.clone(),
        members: vec![a.id.clone(), b.id.clone()],
        result: JoinResult::Success,
        payload: b"b-config".to_vec(),
    };
    assert!(a.handler.joins().contains(&expected));
    assert!(b.handler.joins().contains(&expected));

    assert_eq!(a.driver.members(), [a.id.clone(), b.id.clone()]);
    assert_eq!(b.driver.members(), a.driver.members());

    // only the master ran the admission check for b
    assert!(a.handler.calls().contains(&Call::CheckJoin { node: b.id.clone() }));
    assert!(!b.handler.calls().contains(&Call::CheckJoin { node: b.id.clone() }));
}

#[tokio::test]
async fn concurrent_joins_serialize_under_the_lock() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    a.join().await;
    settle(&[&a]).await;

    let b = spawn_node(&hub, "b").await;
    let c = spawn_node(&hub, "c").await;

    // the second joiner's bootstrap waits for the first joiner's approval,
    // so the master must keep dispatching while both joins are in flight
    let done = std::sync::atomic::AtomicBool::new(false);
    tokio::join!(
        async {
            tokio::join!(b.join(), c.join());
            done.store(true, std::sync::atomic::Ordering::Release);
        },
        async {
            while !done.load(std::sync::atomic::Ordering::Acquire) {
                a.tick().await;
                tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            }
        }
    );
    settle(&[&a, &b, &c]).await;

    let view = a.driver.members();
    assert_eq!(view.len(), 3);
    assert_eq!(view[0], a.id);
    assert_eq!(b.driver.members(), view);
    assert_eq!(c.driver.members(), view);
}

#[tokio::test]
async fn join_rejection_flows_through_join_handler() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    a.join().await;
    settle(&[&a]).await;

    a.handler.set_join_result(JoinResult::JoinLater);
    let b = spawn_node(&hub, "b").await;
    b.join().await;
    settle(&[&a, &b]).await;

    let rejected = b.handler.joins().into_iter().find(|c| {
        matches!(c, Call::Join { node, .. } if *node == b.id)
    });
    assert!(matches!(
        rejected,
        Some(Call::Join { result: JoinResult::JoinLater, .. })
    ));
}

#[tokio::test]
async fn non_leave_events_agree_on_order_everywhere() {
    let hub = MemoryHub::new();
    let a = spawn_node(&hub, "a").await;
    let b = spawn_node(&hub, "b").await;
    let c = spawn_node(&hub, "c").await;

    a.join().await;
    settle(&[&a]).await;
    b.join().await;
    settle(&[&a, &b]).await;
    c.join().await;
    settle(&[&a, &b, &c]).await;

    a.driver.notify(b"from-a", None).await.unwrap();
    b.driver.notify(b"from-b", None).await.unwrap();
    c.driver.notify(b"from-c", None).await.unwrap();
    settle(&[&a, &b, &c]).await;

    let at_a = a.handler.notifies();
    assert_eq!(at_a.len(), 3);
    assert_eq!(b.handler.notifies(), at_a);
    assert_eq!(c.handler.notifies(), at_a);
}
