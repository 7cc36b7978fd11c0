use std::collections::HashMap;
use std::sync::RwLock;

/// Bounded text-keyed memo shared by concurrent readers.
///
/// When full, the whole map is dropped and refilled.
pub struct MemoCache<V> {
    entries: RwLock<HashMap<String, V>>,
    capacity: usize,
}

impl<V: Clone> MemoCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.read().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: V) {
        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= self.capacity && !entries.contains_key(key) {
                entries.clear();
            }
            entries.insert(key.to_string(), value);
        }
    }

    /// Returns the cached value, computing and storing it on a miss.
    pub fn get_or_insert_with(&self, key: &str, compute: impl FnOnce() -> V) -> V {
        if let Some(v) = self.get(key) {
            return v;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_get_or_insert_computes_once() {
        let cache = MemoCache::new(10);
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let v = cache.get_or_insert_with("k", || {
                calls.fetch_add(1, Ordering::Relaxed);
                42
            });
            assert_eq!(v, 42);
        }
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let cache = MemoCache::new(3);
        for i in 0..10 {
            cache.insert(&i.to_string(), i);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.get("9"), Some(9));
    }

    #[test]
    fn test_concurrent_readers() {
        let cache = Arc::new(MemoCache::new(100));
        cache.insert("shared", "code".to_string());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = cache.clone();
                std::thread::spawn(move || c.get("shared"))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().as_deref(), Some("code"));
        }
    }
}
