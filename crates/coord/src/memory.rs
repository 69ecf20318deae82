// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory coordination service.
//!
//! A single-process stand-in for the real service: a linearizable tree
//! with ephemeral ownership, per-parent sequential suffixes, one-shot
//! watches, and killable sessions. Multi-node scenarios connect several
//! sessions to one hub and drive crash detection with [`MemoryHub::expire`].

use crate::error::CoordError;
use crate::session::{Coordinator, CreateMode, WatchEvent};
use async_trait::async_trait;
use herd_core::ClientId;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
struct Znode {
    data: Vec<u8>,
    owner: Option<ClientId>,
    next_seq: i32,
}

#[derive(Default)]
struct HubInner {
    nodes: BTreeMap<String, Znode>,
    sessions: HashMap<ClientId, mpsc::UnboundedSender<WatchEvent>>,
    exists_watches: HashMap<String, Vec<ClientId>>,
    data_watches: HashMap<String, Vec<ClientId>>,
    child_watches: HashMap<String, Vec<ClientId>>,
    next_client: i64,
}

impl HubInner {
    fn notify(&self, clients: Vec<ClientId>, event: WatchEvent) {
        for client in clients {
            if let Some(tx) = self.sessions.get(&client) {
                let _ = tx.send(event.clone());
            }
        }
    }

    fn arm(map: &mut HashMap<String, Vec<ClientId>>, path: &str, client: ClientId) {
        let watchers = map.entry(path.to_string()).or_default();
        if !watchers.contains(&client) {
            watchers.push(client);
        }
    }

    fn drain(map: &mut HashMap<String, Vec<ClientId>>, path: &str) -> Vec<ClientId> {
        map.remove(path).unwrap_or_default()
    }

    fn fire_created(&mut self, path: &str) {
        let watchers = Self::drain(&mut self.exists_watches, path);
        self.notify(watchers, WatchEvent::Created { path: path.to_string() });
        if let Some(parent) = parent_of(path) {
            let watchers = Self::drain(&mut self.child_watches, &parent);
            self.notify(watchers, WatchEvent::ChildrenChanged { path: parent });
        }
    }

    fn fire_changed(&mut self, path: &str) {
        let mut watchers = Self::drain(&mut self.exists_watches, path);
        for client in Self::drain(&mut self.data_watches, path) {
            if !watchers.contains(&client) {
                watchers.push(client);
            }
        }
        self.notify(watchers, WatchEvent::DataChanged { path: path.to_string() });
    }

    fn fire_deleted(&mut self, path: &str) {
        let mut watchers = Self::drain(&mut self.exists_watches, path);
        for client in Self::drain(&mut self.data_watches, path) {
            if !watchers.contains(&client) {
                watchers.push(client);
            }
        }
        self.notify(watchers, WatchEvent::Deleted { path: path.to_string() });
        if let Some(parent) = parent_of(path) {
            let watchers = Self::drain(&mut self.child_watches, &parent);
            self.notify(watchers, WatchEvent::ChildrenChanged { path: parent });
        }
    }

    fn has_children(&self, path: &str) -> bool {
        let prefix = format!("{path}/");
        self.nodes.range(prefix.clone()..).next().is_some_and(|(k, _)| k.starts_with(&prefix))
    }

    fn check_parent(&self, path: &str) -> Result<(), CoordError> {
        match parent_of(path) {
            Some(parent) if !self.nodes.contains_key(&parent) => Err(CoordError::NoNode(parent)),
            _ => Ok(()),
        }
    }

    fn remove_node(&mut self, path: &str) {
        self.nodes.remove(path);
        self.fire_deleted(path);
    }
}

/// Parent path, or None for a top-level node.
fn parent_of(path: &str) -> Option<String> {
    let (parent, _) = path.rsplit_once('/')?;
    if parent.is_empty() {
        return None;
    }
    Some(parent.to_string())
}

/// The shared in-memory service. Cheap to clone; all clones see one tree.
#[derive(Clone, Default)]
pub struct MemoryHub {
    inner: Arc<Mutex<HubInner>>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session. Returns the session handle and its watch
    /// channel.
    pub fn connect(&self) -> (MemorySession, mpsc::UnboundedReceiver<WatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = {
            let mut inner = self.inner.lock();
            inner.next_client += 1;
            let client = ClientId(inner.next_client);
            inner.sessions.insert(client, tx.clone());
            client
        };
        let _ = tx.send(WatchEvent::Session { connected: true });
        (MemorySession { inner: Arc::clone(&self.inner), client }, rx)
    }

    /// Kill a session: its ephemeral nodes vanish and deletion watches
    /// fire, exactly as on a crashed process.
    pub fn expire(&self, client: ClientId) {
        let mut inner = self.inner.lock();
        inner.sessions.remove(&client);
        let owned: Vec<String> = inner
            .nodes
            .iter()
            .filter(|(_, z)| z.owner == Some(client))
            .map(|(path, _)| path.clone())
            .collect();
        for path in owned {
            inner.remove_node(&path);
        }
    }

    /// Read a node's value directly (test inspection).
    pub fn data(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.lock().nodes.get(path).map(|z| z.data.clone())
    }

    /// Force the next sequential suffix assigned under `path` (boundary
    /// tests).
    pub fn set_next_seq(&self, path: &str, next: i32) {
        if let Some(z) = self.inner.lock().nodes.get_mut(path) {
            z.next_seq = next;
        }
    }
}

/// One session against a [`MemoryHub`].
pub struct MemorySession {
    inner: Arc<Mutex<HubInner>>,
    client: ClientId,
}

#[async_trait]
impl Coordinator for MemorySession {
    async fn create(
        &self,
        path: &str,
        data: &[u8],
        mode: CreateMode,
    ) -> Result<String, CoordError> {
        let mut inner = self.inner.lock();
        if mode == CreateMode::PersistentSequential {
            let (parent, name) = match path.rsplit_once('/') {
                Some((parent, name)) if !parent.is_empty() => (parent.to_string(), name),
                _ => return Err(CoordError::Backend(format!("bad sequential prefix: {path}"))),
            };
            let seq = match inner.nodes.get_mut(&parent) {
                Some(z) => {
                    let seq = z.next_seq;
                    z.next_seq += 1;
                    seq
                }
                None => return Err(CoordError::NoNode(parent)),
            };
            let full = format!("{parent}/{name}{seq:010}");
            inner.nodes.insert(
                full.clone(),
                Znode { data: data.to_vec(), owner: None, next_seq: 0 },
            );
            inner.fire_created(&full);
            return Ok(full);
        }

        if inner.nodes.contains_key(path) {
            return Err(CoordError::NodeExists(path.to_string()));
        }
        inner.check_parent(path)?;
        let owner = (mode == CreateMode::Ephemeral).then_some(self.client);
        inner
            .nodes
            .insert(path.to_string(), Znode { data: data.to_vec(), owner, next_seq: 0 });
        inner.fire_created(path);
        Ok(path.to_string())
    }

    async fn delete(&self, path: &str) -> Result<(), CoordError> {
        let mut inner = self.inner.lock();
        if !inner.nodes.contains_key(path) {
            return Err(CoordError::NoNode(path.to_string()));
        }
        if inner.has_children(path) {
            return Err(CoordError::NotEmpty(path.to_string()));
        }
        inner.remove_node(path);
        Ok(())
    }

    async fn get(&self, path: &str, watch: bool) -> Result<Vec<u8>, CoordError> {
        let mut inner = self.inner.lock();
        if !inner.nodes.contains_key(path) {
            return Err(CoordError::NoNode(path.to_string()));
        }
        if watch {
            HubInner::arm(&mut inner.data_watches, path, self.client);
        }
        Ok(inner.nodes[path].data.clone())
    }

    async fn set(&self, path: &str, data: &[u8]) -> Result<(), CoordError> {
        let mut inner = self.inner.lock();
        match inner.nodes.get_mut(path) {
            Some(z) => z.data = data.to_vec(),
            None => return Err(CoordError::NoNode(path.to_string())),
        }
        inner.fire_changed(path);
        Ok(())
    }

    async fn exists(&self, path: &str, watch: bool) -> Result<bool, CoordError> {
        let mut inner = self.inner.lock();
        if watch {
            HubInner::arm(&mut inner.exists_watches, path, self.client);
        }
        Ok(inner.nodes.contains_key(path))
    }

    async fn children(&self, path: &str, watch: bool) -> Result<Vec<String>, CoordError> {
        let mut inner = self.inner.lock();
        if !inner.nodes.contains_key(path) {
            return Err(CoordError::NoNode(path.to_string()));
        }
        if watch {
            HubInner::arm(&mut inner.child_watches, path, self.client);
        }
        let prefix = format!("{path}/");
        let names = inner
            .nodes
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .filter_map(|(k, _)| {
                let rest = &k[prefix.len()..];
                (!rest.contains('/')).then(|| rest.to_string())
            })
            .collect();
        Ok(names)
    }

    fn client_id(&self) -> ClientId {
        self.client
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
