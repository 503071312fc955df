//! Cache Store Module
//!
//! The value store contract and its backing implementations.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::cache::Content;

// == Key Value Store ==
/// Concurrency-safe mapping from keys to stored content.
///
/// Implementations synchronize internally; callers never hold a lock across
/// calls. Each operation is atomic for the key it touches, so a reader sees
/// either the previous or the next complete [`Content`], never a mix.
pub trait KeyValueStore: Send + Sync {
    /// Returns every key currently present, each once, in no particular order.
    fn list(&self) -> Vec<String>;

    /// Returns the current content for `key`, if any.
    fn get(&self, key: &str) -> Option<Arc<Content>>;

    /// Inserts or replaces the content for `key`. Last writer wins.
    fn put(&self, key: String, content: Content);

    /// Removes `key`. Removing an absent key is a no-op.
    fn delete(&self, key: &str);

    /// Returns the number of keys currently present.
    fn len(&self) -> usize;

    /// Returns true if no keys are present.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Sharded Store ==
/// Default store backed by a sharded concurrent map.
///
/// Writers only lock the shard owning their key, and `list` walks one shard
/// at a time so it never stalls writers to other shards.
#[derive(Debug, Default)]
pub struct ShardedStore {
    entries: DashMap<String, Arc<Content>>,
}

impl ShardedStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for ShardedStore {
    fn list(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    fn get(&self, key: &str) -> Option<Arc<Content>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn put(&self, key: String, content: Content) {
        self.entries.insert(key, Arc::new(content));
    }

    fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// == Locked Store ==
/// Store backed by a single reader-writer lock around a `HashMap`.
#[derive(Debug, Default)]
pub struct LockedStore {
    entries: RwLock<HashMap<String, Arc<Content>>>,
}

impl LockedStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for LockedStore {
    fn list(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    fn get(&self, key: &str) -> Option<Arc<Content>> {
        self.entries.read().get(key).cloned()
    }

    fn put(&self, key: String, content: Content) {
        self.entries.write().insert(key, Arc::new(content));
    }

    fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::collections::HashSet;
    use std::thread;

    fn stores() -> Vec<Box<dyn KeyValueStore>> {
        vec![Box::new(ShardedStore::new()), Box::new(LockedStore::new())]
    }

    fn text(payload: &'static str) -> Content {
        Content::new(vec![HeaderValue::from_static("text/plain")], payload)
    }

    #[test]
    fn test_store_new() {
        for store in stores() {
            assert_eq!(store.len(), 0);
            assert!(store.is_empty());
            assert!(store.list().is_empty());
        }
    }

    #[test]
    fn test_store_put_and_get() {
        for store in stores() {
            store.put("key1".to_string(), text("value1"));

            let content = store.get("key1").unwrap();
            assert_eq!(content.payload().as_ref(), b"value1");
            assert_eq!(content.content_types(), ["text/plain"]);
            assert_eq!(store.len(), 1);
        }
    }

    #[test]
    fn test_store_get_nonexistent() {
        for store in stores() {
            assert!(store.get("nonexistent").is_none());
        }
    }

    #[test]
    fn test_store_overwrite() {
        for store in stores() {
            store.put("key1".to_string(), text("value1"));
            let before = store.get("key1").unwrap();
            store.put("key1".to_string(), text("value2"));

            assert_eq!(store.get("key1").unwrap().payload().as_ref(), b"value2");
            assert_eq!(store.len(), 1);
            // Earlier readers keep their own snapshot
            assert_eq!(before.payload().as_ref(), b"value1");
        }
    }

    #[test]
    fn test_store_delete() {
        for store in stores() {
            store.put("key1".to_string(), text("value1"));
            store.delete("key1");

            assert!(store.is_empty());
            assert!(store.get("key1").is_none());
        }
    }

    #[test]
    fn test_store_delete_nonexistent_is_noop() {
        for store in stores() {
            store.put("kept".to_string(), text("v"));
            store.delete("nonexistent");

            assert_eq!(store.list(), ["kept"]);
        }
    }

    #[test]
    fn test_store_list_returns_each_key_once() {
        for store in stores() {
            for key in ["a", "b", "c", "b"] {
                store.put(key.to_string(), text("v"));
            }
            store.delete("c");

            let keys: HashSet<String> = store.list().into_iter().collect();
            assert_eq!(store.list().len(), 2);
            assert_eq!(keys, HashSet::from(["a".to_string(), "b".to_string()]));
        }
    }

    #[test]
    fn test_store_concurrent_writers_never_tear() {
        for store in stores() {
            let store: Arc<dyn KeyValueStore> = Arc::from(store);
            let a = vec![b'a'; 64 * 1024];
            let b = vec![b'b'; 64 * 1024];

            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = Arc::clone(&store);
                    let payload = if i % 2 == 0 { a.clone() } else { b.clone() };
                    thread::spawn(move || {
                        for _ in 0..100 {
                            store.put("shared".to_string(), Content::new(Vec::new(), payload.clone()));
                            let seen = store.get("shared").unwrap();
                            let first = seen.payload()[0];
                            assert!(seen.payload().iter().all(|&byte| byte == first));
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            let last = store.get("shared").unwrap();
            assert!(last.payload().as_ref() == a.as_slice() || last.payload().as_ref() == b.as_slice());
        }
    }

    #[test]
    fn test_store_concurrent_distinct_keys() {
        let store = Arc::new(ShardedStore::new());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..250 {
                        store.put(format!("t{}-{}", t, i), Content::new(Vec::new(), "x"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 1000);
        assert_eq!(store.list().len(), 1000);
    }
}
