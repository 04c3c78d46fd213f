//! Keyed snapshot storage with mutation notification
//!
//! `SnapshotStore<K, V>` holds the most recently observed snapshot per
//! key. Writers overwrite whole values atomically; readers get
//! point-in-time copies that stay valid while mutation continues. Every
//! mutation bumps a revision counter published through a
//! `tokio::sync::watch` channel, which is what the wait primitive in
//! [`wait`](crate::wait) suspends on.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use tokio::sync::watch;

/// Keyed store of point-in-time snapshots
///
/// Generic over key and value so independent device bridges can each own
/// their own store instance - there is no ambient global state.
///
/// Cloning shares the underlying state; clones are handles to the same
/// store.
///
/// # Example
///
/// ```rust
/// use zone_store::SnapshotStore;
///
/// let store: SnapshotStore<String, u32> = SnapshotStore::new();
/// store.put("a".to_string(), 1);
/// assert_eq!(store.get(&"a".to_string()), Some(1));
/// assert_eq!(store.len(), 1);
///
/// store.clear();
/// assert!(store.is_empty());
/// ```
pub struct SnapshotStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    entries: Arc<RwLock<HashMap<K, V>>>,

    /// Revision counter, bumped on every mutation. Waiters subscribe to
    /// this channel and re-evaluate their predicate on each bump.
    revision: Arc<watch::Sender<u64>>,
}

impl<K, V> SnapshotStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty store
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            revision: Arc::new(revision),
        }
    }

    /// Inserts or overwrites the snapshot for a key
    ///
    /// The overwrite is atomic: a concurrent reader observes either the
    /// previous whole value or the new whole value, never a mix.
    pub fn put(&self, key: K, value: V) {
        {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.insert(key, value);
        }
        self.bump();
    }

    /// Removes all entries
    pub fn clear(&self) {
        {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.clear();
        }
        self.bump();
    }

    /// Returns a copy of the snapshot for a key, if present
    pub fn get(&self, key: &K) -> Option<V> {
        self.read().get(key).cloned()
    }

    /// Whether a snapshot exists for a key
    pub fn contains(&self, key: &K) -> bool {
        self.read().contains_key(key)
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy of all keys
    pub fn keys(&self) -> Vec<K> {
        self.read().keys().cloned().collect()
    }

    /// Point-in-time copy of all values
    ///
    /// Safe to hand to a caller while mutation continues concurrently.
    pub fn snapshot(&self) -> Vec<V> {
        self.read().values().cloned().collect()
    }

    /// Subscribes to mutation notifications
    ///
    /// The received value is an opaque revision number; it only signals
    /// that something changed since the last observation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        // send_modify notifies even with no active receivers
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<K, V>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl<K, V> Default for SnapshotStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for SnapshotStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            revision: Arc::clone(&self.revision),
        }
    }
}

impl<K, V> std::fmt::Debug for SnapshotStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();

        assert!(store.is_empty());
        assert!(store.get(&"a").is_none());

        store.put("a", 1);
        assert_eq!(store.get(&"a"), Some(1));
        assert_eq!(store.len(), 1);

        // Overwrite, not accumulate
        store.put("a", 2);
        assert_eq!(store.get(&"a"), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();
        store.put("a", 1);
        store.put("b", 2);
        assert_eq!(store.len(), 2);

        store.clear();
        assert!(store.is_empty());
        assert!(!store.contains(&"a"));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();
        store.put("a", 1);

        let snapshot = store.snapshot();
        store.clear();

        // The snapshot is unaffected by later mutation
        assert_eq!(snapshot, vec![1]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clone_shares_state() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();
        let handle = store.clone();

        store.put("a", 1);
        assert_eq!(handle.get(&"a"), Some(1));
    }

    #[test]
    fn test_every_mutation_bumps_revision() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();
        let rx = store.subscribe();
        let before = *rx.borrow();

        store.put("a", 1);
        store.clear();

        assert_eq!(*rx.borrow(), before + 2);
    }
}
