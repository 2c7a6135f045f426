//! Observable, in-memory store of summary versions.
//!
//! One store backs one summary panel session. Versions keep insertion order,
//! and every successful mutation fans out a payload-free notification to the
//! registered listeners. Nothing here is persisted.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use uuid::Uuid;

use crate::version::SummaryVersion;

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Inner {
    versions: Mutex<Vec<SummaryVersion>>,
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_listener_id: AtomicU64,
}

impl Inner {
    /// Listeners run after every lock is released so they may read the store.
    fn notify(&self) {
        let listeners: Vec<Listener> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener();
        }
    }
}

/// Ordered collection of summary versions with change subscription.
///
/// Cloning yields another handle to the same underlying list.
#[derive(Clone, Default)]
pub struct SummaryStore {
    inner: Arc<Inner>,
}

impl SummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly generated version and notify listeners.
    pub fn add(&self, content: impl Into<String>) -> SummaryVersion {
        let version = SummaryVersion::new(content);
        self.inner.versions.lock().push(version.clone());
        tracing::debug!(id = %version.id, "summary version added");
        self.inner.notify();
        version
    }

    /// Replace the content of an existing version.
    ///
    /// Returns `false` without notifying when `id` is unknown.
    pub fn update(&self, id: Uuid, content: impl Into<String>) -> bool {
        let updated = {
            let mut versions = self.inner.versions.lock();
            match versions.iter_mut().find(|v| v.id == id) {
                Some(version) => {
                    version.content = content.into();
                    true
                }
                None => false,
            }
        };
        if updated {
            self.inner.notify();
        }
        updated
    }

    /// Remove a version. Unknown ids are a silent no-op with no notification.
    pub fn delete(&self, id: Uuid) -> Option<SummaryVersion> {
        let removed = {
            let mut versions = self.inner.versions.lock();
            versions
                .iter()
                .position(|v| v.id == id)
                .map(|index| versions.remove(index))
        };
        if removed.is_some() {
            tracing::debug!(%id, "summary version deleted");
            self.inner.notify();
        }
        removed
    }

    /// Snapshot of all versions in insertion order
    pub fn list(&self) -> Vec<SummaryVersion> {
        self.inner.versions.lock().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<SummaryVersion> {
        self.inner.versions.lock().iter().find(|v| v.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.versions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a listener invoked synchronously after every successful mutation.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().insert(id, Arc::new(listener));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

impl fmt::Debug for SummaryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryStore")
            .field("versions", &self.len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle returned by [`SummaryStore::subscribe`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    /// Remove the listener. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.store.upgrade() {
            Some(inner) => inner.listeners.lock().remove(&self.id).is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter(store: &SummaryStore) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sub = store.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    fn contents(store: &SummaryStore) -> Vec<String> {
        store.list().into_iter().map(|v| v.content).collect()
    }

    #[test]
    fn test_delete_first_of_two() {
        let store = SummaryStore::new();
        let a = store.add("draft A");
        store.add("draft B");
        assert!(store.delete(a.id).is_some());
        assert_eq!(contents(&store), vec!["draft B"]);
    }

    #[test]
    fn test_mixed_sequence_keeps_insertion_order() {
        let store = SummaryStore::new();
        let a = store.add("one");
        let b = store.add("two");
        let c = store.add("three");
        let d = store.add("four");

        assert!(store.update(c.id, "three (edited)"));
        store.delete(b.id);
        assert!(store.update(a.id, "one (edited)"));
        store.delete(d.id);
        store.add("five");

        assert_eq!(
            contents(&store),
            vec!["one (edited)", "three (edited)", "five"]
        );
        let ids: Vec<Uuid> = store.list().iter().map(|v| v.id).collect();
        assert_eq!(&ids[..2], &[a.id, c.id]);
    }

    #[test]
    fn test_update_keeps_identity_and_timestamp() {
        let store = SummaryStore::new();
        let v = store.add("before");
        store.update(v.id, "after");
        let stored = store.get(v.id).unwrap();
        assert_eq!(stored.content, "after");
        assert_eq!(stored.created_at, v.created_at);
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let store = SummaryStore::new();
        store.add("a");
        let snapshot = store.list();
        store.add("b");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_listener_fires_once_per_mutation() {
        let store = SummaryStore::new();
        let (count, _sub) = counter(&store);

        let v = store.add("a");
        assert_eq!(count.load(Ordering::SeqCst), 1);
        store.update(v.id, "b");
        assert_eq!(count.load(Ordering::SeqCst), 2);
        store.delete(v.id);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_missing_id_is_silent() {
        let store = SummaryStore::new();
        let (count, _sub) = counter(&store);
        let v = store.add("a");
        store.delete(v.id);
        assert_eq!(count.load(Ordering::SeqCst), 2);

        assert!(!store.update(v.id, "late edit"));
        assert!(store.delete(v.id).is_none());
        assert!(!store.update(Uuid::new_v4(), "x"));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_unsubscribed_listener_stops_firing() {
        let store = SummaryStore::new();
        let (first, first_sub) = counter(&store);
        let (second, _second_sub) = counter(&store);

        store.add("a");
        store.add("b");
        assert!(first_sub.unsubscribe());
        store.add("c");

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 3);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_listener_can_read_store() {
        let store = SummaryStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (reader, sink) = (store.clone(), seen.clone());
        let _sub = store.subscribe(move || sink.lock().push(reader.len()));

        store.add("a");
        store.add("b");
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_after_store_dropped() {
        let store = SummaryStore::new();
        let sub = store.subscribe(|| {});
        drop(store);
        assert!(!sub.unsubscribe());
    }
}
