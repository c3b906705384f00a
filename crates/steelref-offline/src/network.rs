//! Network abstraction and the fixed-route stand-in.
//!
//! The worker never talks to a socket itself; the host runtime supplies a
//! [`Network`] implementation. [`StaticNetwork`] serves a fixed route table
//! with an offline toggle, which is what hermetic runs and the test suites
//! use.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use steelref_core::SteelRefError;

use crate::OfflineFuture;
use crate::types::{AssetRequest, AssetResponse, CacheMode};

/// The host runtime's fetch, reduced to what the worker needs.
pub trait Network: Send + Sync {
    /// Perform one request. An `Err` means no response was produced at all
    /// (connection failure, abort); HTTP-level failures are `Ok` responses
    /// with a non-2xx status.
    fn fetch<'a>(
        &'a self,
        request: &'a AssetRequest,
        cache_mode: CacheMode,
    ) -> OfflineFuture<'a, AssetResponse>;
}

/// Fixed route table with an offline toggle.
///
/// Routes are keyed by the full request URL, query string included, so a
/// cache-busted precache URL must be routed under its busted form.
#[derive(Debug, Default)]
pub struct StaticNetwork {
    routes: Mutex<BTreeMap<String, AssetResponse>>,
    offline: AtomicBool,
    fetches: AtomicUsize,
}

impl StaticNetwork {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a URL to a response.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn route(&self, url: impl Into<String>, response: AssetResponse) {
        let mut routes = self.routes.lock().expect("route lock poisoned");
        routes.insert(url.into(), response);
    }

    /// Route a URL to a successful same-origin response with `body`.
    pub fn route_ok(&self, url: &str, body: &[u8]) {
        self.route(url, AssetResponse::ok(url, "application/octet-stream", body));
    }

    /// Remove a route, simulating a resource that stopped existing.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn remove_route(&self, url: &str) {
        let mut routes = self.routes.lock().expect("route lock poisoned");
        routes.remove(url);
    }

    /// Toggle total network failure. While offline, every fetch errs.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// How many fetches were attempted, offline ones included.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Network for StaticNetwork {
    fn fetch<'a>(
        &'a self,
        request: &'a AssetRequest,
        _cache_mode: CacheMode,
    ) -> OfflineFuture<'a, AssetResponse> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let result = if self.offline.load(Ordering::SeqCst) {
            Err(SteelRefError::Fetch {
                url: request.url.clone(),
                reason: "network unreachable".into(),
            })
        } else {
            let routes = self.routes.lock().expect("route lock poisoned");
            routes.get(&request.url).cloned().ok_or_else(|| {
                SteelRefError::Fetch {
                    url: request.url.clone(),
                    reason: "no route for URL".into(),
                }
            })
        };
        Box::pin(std::future::ready(result))
    }
}
