//! Shared header store consulted by every outgoing request.
//!
//! # Design
//! `HeaderStore` is a cheap handle over a concurrent map. Cloning the handle
//! shares the map, so one store handed to several clients applies its
//! headers to all of them without any process-wide global.
//!
//! Clearing a single header keeps the key with no value. Such entries stay
//! enumerable through `get`/`contains` but are never attached to a request;
//! the filtering happens when a request is built, not when the store is
//! written.

use std::sync::Arc;

use dashmap::DashMap;

#[derive(Debug, Clone, Default)]
pub struct HeaderStore {
    inner: Arc<DashMap<String, Option<String>>>,
}

impl HeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`. An empty value behaves like a cleared header.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), Some(value.into()));
    }

    /// Mark `name` inert. The key stays in the store.
    pub fn clear_header(&self, name: impl Into<String>) {
        self.inner.insert(name.into(), None);
    }

    /// Remove every key.
    pub fn clear_headers(&self) {
        self.inner.clear();
    }

    /// Stored value for `name`. `Some(None)` means the key exists but was cleared.
    pub fn get(&self, name: &str) -> Option<Option<String>> {
        self.inner.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Headers to attach to a request: present, non-empty values only,
    /// sorted by name.
    pub fn active(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .inner
            .iter()
            .filter_map(|entry| match entry.value() {
                Some(value) if !value.is_empty() => Some((entry.key().clone(), value.clone())),
                _ => None,
            })
            .collect();
        headers.sort();
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_header_upserts() {
        let store = HeaderStore::new();
        store.set_header("X-Tenant", "a");
        store.set_header("X-Tenant", "b");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("X-Tenant"), Some(Some("b".to_string())));
    }

    #[test]
    fn cleared_header_is_kept_but_inactive() {
        let store = HeaderStore::new();
        store.set_header("Authorization", "Bearer t");
        store.clear_header("Authorization");
        assert!(store.contains("Authorization"));
        assert_eq!(store.get("Authorization"), Some(None));
        assert!(store.active().is_empty());
    }

    #[test]
    fn empty_value_is_filtered_at_read_time() {
        let store = HeaderStore::new();
        store.set_header("X-Empty", "");
        assert!(store.contains("X-Empty"));
        assert!(store.active().is_empty());
    }

    #[test]
    fn clear_headers_removes_every_key() {
        let store = HeaderStore::new();
        store.set_header("X", "1");
        store.clear_header("Y");
        store.clear_headers();
        assert!(store.is_empty());
        assert!(!store.contains("X"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let store = HeaderStore::new();
        store.set_header("x-id", "lower");
        store.set_header("X-Id", "upper");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn active_headers_are_sorted() {
        let store = HeaderStore::new();
        store.set_header("b", "2");
        store.set_header("a", "1");
        store.set_header("c", "3");
        assert_eq!(
            store.active(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn clones_share_the_same_map() {
        let store = HeaderStore::new();
        let other = store.clone();
        other.set_header("X-Shared", "yes");
        assert_eq!(store.get("X-Shared"), Some(Some("yes".to_string())));
    }

    #[test]
    fn concurrent_writers_do_not_lose_entries() {
        let store = HeaderStore::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        store.set_header(format!("h{i}-{j}"), "v");
                        let _ = store.active();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 800);
    }
}
