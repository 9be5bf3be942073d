use dashmap::DashMap;
use log::debug;

const DEFAULT_CAPACITY: usize = 1024;

/// SessionStore remembers the last session token seen per request path.
///
/// The store is best-effort: it is bounded and drops an arbitrary entry once
/// full, so a missing token only means no session affinity is known.
#[derive(Debug)]
pub struct SessionStore {
    tokens: DashMap<String, String>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SessionStore {
    /// Create a store holding at most `capacity` paths.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tokens: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Get the token recorded for `path`.
    pub fn get(&self, path: &str) -> Option<String> {
        self.tokens.get(path).map(|v| v.value().clone())
    }

    /// Record the token for `path`, `None` clears it.
    pub fn put(&self, path: &str, token: Option<String>) {
        let Some(token) = token.filter(|v| !v.is_empty()) else {
            self.tokens.remove(path);
            return;
        };

        if !self.tokens.contains_key(path) && self.tokens.len() >= self.capacity {
            // Collect the key first, removing while iterating would deadlock the shard.
            let victim = self.tokens.iter().next().map(|e| e.key().clone());
            if let Some(victim) = victim {
                debug!("session store full, dropping token for {victim}");
                self.tokens.remove(&victim);
            }
        }
        self.tokens.insert(path.to_string(), token);
    }

    /// Number of paths with a known token.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no token is known.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_put_get_clear() {
        let store = SessionStore::default();
        assert_eq!(store.get("/dbs/D1"), None);

        store.put("/dbs/D1", Some("T1".to_string()));
        assert_eq!(store.get("/dbs/D1").as_deref(), Some("T1"));
        assert_eq!(store.get("/dbs/D2"), None);

        store.put("/dbs/D1", Some("T2".to_string()));
        assert_eq!(store.get("/dbs/D1").as_deref(), Some("T2"));

        store.put("/dbs/D1", None);
        assert_eq!(store.get("/dbs/D1"), None);
        store.put("/dbs/D1", Some(String::new()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_evicts() {
        let store = SessionStore::with_capacity(2);
        store.put("/a", Some("1".to_string()));
        store.put("/b", Some("2".to_string()));
        store.put("/a", Some("3".to_string()));
        assert_eq!(store.len(), 2);

        store.put("/c", Some("4".to_string()));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("/c").as_deref(), Some("4"));
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(SessionStore::with_capacity(16));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        let path = format!("/dbs/{}", (i * 100 + j) % 32);
                        store.put(&path, Some(j.to_string()));
                        let _ = store.get(&path);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(store.len() <= 32);
        assert!(!store.is_empty());
    }
}
