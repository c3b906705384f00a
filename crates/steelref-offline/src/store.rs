//! Cache storage abstraction and the in-memory backend.
//!
//! A store is a named map from request URL to cached response. Stores are
//! addressed by exact name; writes are whole-value replaces, so concurrent
//! writers race benignly (last write wins, no corruption) and no lock is
//! held across an await point.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::OfflineFuture;
use crate::types::AssetResponse;

/// Storage backend for cache generations.
///
/// Implementations must be `Send + Sync`; operations return boxed futures
/// so the trait stays dyn-compatible (`Arc<dyn CacheStorage>`).
pub trait CacheStorage: Send + Sync {
    /// Names of every existing store, in deterministic order.
    fn store_names<'a>(&'a self) -> OfflineFuture<'a, Vec<String>>;

    /// Delete a whole store. Returns whether it existed.
    fn delete_store<'a>(&'a self, name: &'a str) -> OfflineFuture<'a, bool>;

    /// Read one cached response. `Ok(None)` on miss.
    fn read<'a>(&'a self, store: &'a str, url: &'a str)
    -> OfflineFuture<'a, Option<AssetResponse>>;

    /// Write one response, creating the store if needed. Full replace.
    fn write<'a>(
        &'a self,
        store: &'a str,
        url: &'a str,
        response: AssetResponse,
    ) -> OfflineFuture<'a, ()>;
}

/// In-memory storage backend.
///
/// The shipped backend for hermetic use and tests. `BTreeMap` keeps
/// `store_names` deterministic; the mutex is held only for map operations.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    stores: Mutex<BTreeMap<String, BTreeMap<String, AssetResponse>>>,
}

impl MemoryCacheStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a store, `None` if the store does not exist.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn entry_count(&self, store: &str) -> Option<usize> {
        let stores = self.stores.lock().expect("store lock poisoned");
        stores.get(store).map(BTreeMap::len)
    }

    /// Whether a store holds an entry for `url`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn contains(&self, store: &str, url: &str) -> bool {
        let stores = self.stores.lock().expect("store lock poisoned");
        stores.get(store).is_some_and(|s| s.contains_key(url))
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn store_names<'a>(&'a self) -> OfflineFuture<'a, Vec<String>> {
        let names = {
            let stores = self.stores.lock().expect("store lock poisoned");
            stores.keys().cloned().collect()
        };
        Box::pin(std::future::ready(Ok(names)))
    }

    fn delete_store<'a>(&'a self, name: &'a str) -> OfflineFuture<'a, bool> {
        let existed = {
            let mut stores = self.stores.lock().expect("store lock poisoned");
            stores.remove(name).is_some()
        };
        Box::pin(std::future::ready(Ok(existed)))
    }

    fn read<'a>(
        &'a self,
        store: &'a str,
        url: &'a str,
    ) -> OfflineFuture<'a, Option<AssetResponse>> {
        let cached = {
            let stores = self.stores.lock().expect("store lock poisoned");
            stores.get(store).and_then(|s| s.get(url)).cloned()
        };
        Box::pin(std::future::ready(Ok(cached)))
    }

    fn write<'a>(
        &'a self,
        store: &'a str,
        url: &'a str,
        response: AssetResponse,
    ) -> OfflineFuture<'a, ()> {
        {
            let mut stores = self.stores.lock().expect("store lock poisoned");
            stores
                .entry(store.to_string())
                .or_default()
                .insert(url.to_string(), response);
        }
        Box::pin(std::future::ready(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(url: &str, body: &[u8]) -> AssetResponse {
        AssetResponse::ok(url, "text/plain", body)
    }

    #[tokio::test]
    async fn write_then_read() {
        let storage = MemoryCacheStorage::new();
        storage
            .write("gen-1", "./a", response("./a", b"one"))
            .await
            .unwrap();
        let cached = storage.read("gen-1", "./a").await.unwrap().unwrap();
        assert_eq!(cached.body, b"one");
    }

    #[tokio::test]
    async fn read_miss_is_none_not_error() {
        let storage = MemoryCacheStorage::new();
        assert!(storage.read("gen-1", "./a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_is_full_replace() {
        let storage = MemoryCacheStorage::new();
        storage
            .write("gen-1", "./a", response("./a", b"old"))
            .await
            .unwrap();
        storage
            .write("gen-1", "./a", response("./a", b"new"))
            .await
            .unwrap();
        let cached = storage.read("gen-1", "./a").await.unwrap().unwrap();
        assert_eq!(cached.body, b"new");
        assert_eq!(storage.entry_count("gen-1"), Some(1));
    }

    #[tokio::test]
    async fn store_names_are_sorted() {
        let storage = MemoryCacheStorage::new();
        storage.write("b", "./x", response("./x", b"")).await.unwrap();
        storage.write("a", "./x", response("./x", b"")).await.unwrap();
        assert_eq!(storage.store_names().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn delete_store_reports_existence() {
        let storage = MemoryCacheStorage::new();
        storage.write("gen-1", "./a", response("./a", b"")).await.unwrap();
        assert!(storage.delete_store("gen-1").await.unwrap());
        assert!(!storage.delete_store("gen-1").await.unwrap());
        assert_eq!(storage.entry_count("gen-1"), None);
    }

    #[tokio::test]
    async fn stores_are_isolated() {
        let storage = MemoryCacheStorage::new();
        storage.write("gen-1", "./a", response("./a", b"1")).await.unwrap();
        storage.write("gen-2", "./a", response("./a", b"2")).await.unwrap();
        storage.delete_store("gen-1").await.unwrap();
        let survivor = storage.read("gen-2", "./a").await.unwrap().unwrap();
        assert_eq!(survivor.body, b"2");
    }
}
