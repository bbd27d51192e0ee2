// Copyright 2024 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Namespace cache surface consumed by admission plugins.
//!
//! The cache itself is populated by a watch process outside this crate. Plugins
//! only see a read-only lister and a one-way "has synced" predicate, mirroring
//! client-go's `NamespaceLister` and `InformerSynced`.

use crate::api::core::Namespace;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// InformerSynced reports whether the initial listing of a cache has completed.
/// Once it returns true it keeps returning true.
pub type InformerSynced = Arc<dyn Fn() -> bool + Send + Sync>;

/// LookupError is returned when a namespace cannot be resolved from the cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("namespaces \"{0}\" not found")]
    NotFound(String),

    #[error("namespace cache unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

/// NamespaceLister resolves namespaces by name.
pub trait NamespaceLister: Send + Sync {
    fn get(&self, name: &str) -> Result<Namespace, LookupError>;
}

/// NamespaceInformer hands out a lister and the synced predicate for the same cache.
pub trait NamespaceInformer: Send + Sync {
    fn lister(&self) -> Arc<dyn NamespaceLister>;

    fn has_synced(&self) -> bool;
}

/// Build an [`InformerSynced`] predicate backed by an informer.
pub fn synced_predicate(informer: Arc<dyn NamespaceInformer>) -> InformerSynced {
    Arc::new(move || informer.has_synced())
}

#[derive(Debug, Default)]
struct StoreInner {
    namespaces: RwLock<HashMap<String, Namespace>>,
    synced: AtomicBool,
}

/// In-memory namespace store.
///
/// Clones share the same underlying state, so a clone handed to a plugin sees
/// every namespace added through the store it was cloned from.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNamespaceStore {
    inner: Arc<StoreInner>,
}

impl InMemoryNamespaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds the given namespaces and reports synced.
    pub fn synced_with(namespaces: impl IntoIterator<Item = Namespace>) -> Self {
        let store = Self::new();
        for ns in namespaces {
            store.add(ns);
        }
        store.mark_synced();
        store
    }

    pub fn add(&self, namespace: Namespace) {
        self.inner
            .namespaces
            .write()
            .insert(namespace.name.clone(), namespace);
    }

    pub fn remove(&self, name: &str) -> Option<Namespace> {
        self.inner.namespaces.write().remove(name)
    }

    /// Record that the initial listing has completed. There is no way back.
    pub fn mark_synced(&self) {
        self.inner.synced.store(true, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.inner.namespaces.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NamespaceLister for InMemoryNamespaceStore {
    fn get(&self, name: &str) -> Result<Namespace, LookupError> {
        self.inner
            .namespaces
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }
}

impl NamespaceInformer for InMemoryNamespaceStore {
    fn lister(&self) -> Arc<dyn NamespaceLister> {
        Arc::new(self.clone())
    }

    fn has_synced(&self) -> bool {
        self.inner.synced.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_get() {
        let store = InMemoryNamespaceStore::new();
        store.add(Namespace::new("testProject"));

        assert_eq!(store.get("testProject").unwrap().name, "testProject");
        let err = store.get("missing").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "namespaces \"missing\" not found");
    }

    #[test]
    fn test_store_remove() {
        let store = InMemoryNamespaceStore::synced_with([Namespace::new("a")]);
        assert_eq!(store.len(), 1);
        assert!(store.remove("a").is_some());
        assert!(store.is_empty());
        assert!(store.get("a").is_err());
    }

    #[test]
    fn test_synced_is_one_way() {
        let store = InMemoryNamespaceStore::new();
        assert!(!store.has_synced());
        store.mark_synced();
        assert!(store.has_synced());
        store.mark_synced();
        assert!(store.has_synced());
    }

    #[test]
    fn test_lister_shares_state() {
        let store = InMemoryNamespaceStore::new();
        let lister = store.lister();
        store.add(Namespace::new("late"));
        assert!(lister.get("late").is_ok());
    }

    #[test]
    fn test_synced_predicate() {
        let store = InMemoryNamespaceStore::new();
        let synced = synced_predicate(Arc::new(store.clone()));
        assert!(!synced());
        store.mark_synced();
        assert!(synced());
    }
}
