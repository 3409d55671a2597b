// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of pending requests.
//!
//! Entries are kept in insertion order and keyed by [`DedupKey`]. GET and
//! DELETE requests for the same URL share one entry; POST and PUT requests
//! always get their own.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Mutex;
use tokio::runtime::Handle;

use crate::handle::ExecutionHandle;
use crate::method::Method;
use crate::request::RequestDescriptor;

/// Identity used to collapse equivalent requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// Shared by every dedup-eligible call with the same method and URL.
    Shared { method: Method, url: String },
    /// One-off identity for a request that is never collapsed.
    Unique(u64),
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupKey::Shared { method, url } => write!(f, "{} {}", method, url),
            DedupKey::Unique(id) => write!(f, "#{}", id),
        }
    }
}

/// One logical request that has not resolved yet.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub key: DedupKey,
    pub descriptor: RequestDescriptor,
    pub submitted_at: DateTime<Utc>,
    pub handle: ExecutionHandle,
}

/// Ordered, keyed collection of pending requests.
///
/// All access goes through one mutex, so registrations, removals and replay
/// walks are serialized.
pub struct Registry {
    runtime: Handle,
    state: Mutex<RegistryState>,
}

struct RegistryState {
    entries: IndexMap<DedupKey, PendingRequest>,
    next_id: u64,
}

impl Registry {
    /// Creates an empty registry whose handles run on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Registry {
            runtime,
            state: Mutex::new(RegistryState { entries: IndexMap::new(), next_id: 1 }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the entry for an equivalent request, or registers a new one.
    ///
    /// The boolean is true when the entry was just created; its handle is
    /// then still unbound. For dedup-eligible methods the existing entry wins
    /// and the new descriptor (body, options) is discarded.
    pub fn lookup_or_create(&self, descriptor: RequestDescriptor) -> (PendingRequest, bool) {
        let mut state = self.lock();

        let key = if descriptor.method.is_dedup_eligible() {
            let key = DedupKey::Shared { method: descriptor.method, url: descriptor.url.clone() };
            if let Some(existing) = state.entries.get(&key) {
                return (existing.clone(), false);
            }
            key
        } else {
            DedupKey::Unique(state.next_id)
        };

        let id = state.next_id;
        state.next_id += 1;

        let entry = PendingRequest {
            key: key.clone(),
            descriptor,
            submitted_at: Utc::now(),
            handle: ExecutionHandle::new(id, self.runtime.clone()),
        };
        state.entries.insert(key, entry.clone());
        (entry, true)
    }

    pub fn get(&self, key: &DedupKey) -> Option<PendingRequest> {
        self.lock().entries.get(key).cloned()
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Removes an entry. Removing an absent key is a no-op.
    pub fn remove(&self, key: &DedupKey) -> Option<PendingRequest> {
        self.lock().entries.shift_remove(key)
    }

    /// Removes the entry only if it is still the one owning `handle_id`.
    ///
    /// A completed execution must not remove a newer entry that reused its key.
    pub(crate) fn remove_handle(&self, key: &DedupKey, handle_id: u64) -> bool {
        let mut state = self.lock();
        match state.entries.get(key) {
            Some(entry) if entry.handle.id() == handle_id => {
                state.entries.shift_remove(key);
                true
            }
            _ => false,
        }
    }

    /// All pending entries in insertion order.
    pub fn snapshot(&self) -> Vec<PendingRequest> {
        self.lock().entries.values().cloned().collect()
    }

    /// Visits every entry in insertion order while holding the registry lock.
    ///
    /// Nothing can be registered or removed during the walk. `f` must not
    /// call back into the registry.
    pub fn for_each_in_order<F>(&self, mut f: F)
    where
        F: FnMut(&PendingRequest),
    {
        let state = self.lock();
        for entry in state.entries.values() {
            f(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
