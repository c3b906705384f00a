//! The offline worker: a three-phase state machine over one versioned
//! cache generation.
//!
//! | Phase       | Entered by                  | Guarantees                      |
//! |-------------|-----------------------------|---------------------------------|
//! | `Idle`      | construction                | nothing written yet             |
//! | `Installed` | [`CacheManager::install`]   | every core asset precached      |
//! | `Active`    | [`CacheManager::activate`]  | exactly one live generation     |
//!
//! Install fetches every manifest asset bypassing intermediate caches and
//! fails as a whole if any asset fails; a failed install never leaves a
//! partial store behind and never disturbs the previous generation.
//! Activate deletes every store not named for the current version before
//! the phase flips, so a page is never handed a mixed-generation cache.
//! Steady-state fetch interception dispatches per request on the pure
//! [`classify`] decision and degrades along a fallback ladder instead of
//! ever escaping with a panic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use steelref_core::{SteelRefError, SteelRefResult};
use tracing::{debug, info, warn};

use crate::classify::{ResourceKind, classify};
use crate::manifest::PrecacheManifest;
use crate::network::Network;
use crate::store::CacheStorage;
use crate::types::{AssetRequest, AssetResponse, CacheMode};

/// Lifecycle phase of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    Idle,
    Installed,
    Active,
}

impl WorkerPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Installed => "installed",
            Self::Active => "active",
        }
    }
}

impl std::fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control signals the page may post to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Skip the waiting phase and activate immediately; supports
    /// page-initiated "refresh now" flows.
    SkipWaiting,
}

/// The cache manager driving one generation through its lifecycle.
pub struct CacheManager {
    manifest: PrecacheManifest,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    phase: Mutex<WorkerPhase>,
    skip_waiting: AtomicBool,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("manifest", &self.manifest)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    /// Build a worker over validated manifest, storage, and network.
    ///
    /// # Errors
    ///
    /// Returns [`SteelRefError::InvalidConfig`] when the manifest fails
    /// validation.
    pub fn new(
        manifest: PrecacheManifest,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> SteelRefResult<Self> {
        manifest.validate()?;
        Ok(Self {
            manifest,
            storage,
            network,
            phase: Mutex::new(WorkerPhase::Idle),
            skip_waiting: AtomicBool::new(false),
        })
    }

    /// Current lifecycle phase.
    ///
    /// # Panics
    ///
    /// Panics if the phase lock is poisoned.
    #[must_use]
    pub fn phase(&self) -> WorkerPhase {
        *self.phase.lock().expect("phase lock poisoned")
    }

    fn set_phase(&self, phase: WorkerPhase) {
        *self.phase.lock().expect("phase lock poisoned") = phase;
    }

    /// The manifest this worker serves.
    #[must_use]
    pub fn manifest(&self) -> &PrecacheManifest {
        &self.manifest
    }

    /// Version-qualified name of this worker's store.
    #[must_use]
    pub fn store_name(&self) -> String {
        self.manifest.store_name()
    }

    /// Whether a skip-waiting signal (or a completed install) has marked
    /// the worker ready to replace an existing controller immediately.
    #[must_use]
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Handle one control message from the page.
    pub fn handle_message(&self, message: ControlMessage) {
        match message {
            ControlMessage::SkipWaiting => {
                debug!("skip-waiting requested by page");
                self.skip_waiting.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Install phase: precache every manifest asset.
    ///
    /// All assets are fetched with [`CacheMode::NoCache`] (forced
    /// revalidation) and buffered before anything is written, so a failed
    /// fetch aborts the install with no partial store. On success the
    /// worker signals readiness to replace an existing controller without
    /// waiting for open pages to close.
    ///
    /// # Errors
    ///
    /// Returns [`SteelRefError::PrecacheFailed`] naming the first asset
    /// that failed. The previous generation's store is untouched either
    /// way.
    pub async fn install(&self) -> SteelRefResult<()> {
        let store = self.manifest.store_name();
        info!(
            store = %store,
            version = %self.manifest.version,
            asset_count = self.manifest.assets.len(),
            "installing cache generation"
        );

        let mut fetched = Vec::with_capacity(self.manifest.assets.len());
        for entry in &self.manifest.assets {
            let url = self.manifest.request_url(entry);
            let request = AssetRequest::get(&url);
            match self.network.fetch(&request, CacheMode::NoCache).await {
                Ok(response) if response.is_success() => fetched.push((url, response)),
                Ok(response) => {
                    return Err(SteelRefError::PrecacheFailed {
                        version: self.manifest.version.clone(),
                        source: Box::new(SteelRefError::Fetch {
                            url: url.clone(),
                            reason: format!("status {}", response.status),
                        }),
                        url,
                    });
                }
                Err(err) => {
                    return Err(SteelRefError::PrecacheFailed {
                        version: self.manifest.version.clone(),
                        source: Box::new(err),
                        url,
                    });
                }
            }
        }

        for (url, response) in fetched {
            if let Err(err) = self.storage.write(&store, &url, response).await {
                // Remove the partial generation before surfacing the error.
                if let Err(cleanup) = self.storage.delete_store(&store).await {
                    warn!(store = %store, %cleanup, "failed to remove partial generation");
                }
                return Err(SteelRefError::PrecacheFailed {
                    version: self.manifest.version.clone(),
                    source: Box::new(err),
                    url,
                });
            }
        }

        self.skip_waiting.store(true, Ordering::SeqCst);
        self.set_phase(WorkerPhase::Installed);
        info!(store = %store, "install complete");
        Ok(())
    }

    /// Activate phase: delete every stale generation, then claim pages.
    ///
    /// The deletion sweep completes before the phase flips to `Active`, so
    /// a claimed page never observes a mixed-generation cache. Afterwards
    /// exactly one store remains, the one this worker owns.
    ///
    /// # Errors
    ///
    /// Returns [`SteelRefError::ActivateBeforeInstall`] when install has
    /// not completed, or a storage error from the deletion sweep.
    pub async fn activate(&self) -> SteelRefResult<()> {
        let phase = self.phase();
        if phase == WorkerPhase::Idle {
            return Err(SteelRefError::ActivateBeforeInstall {
                phase: phase.as_str(),
            });
        }

        let current = self.manifest.store_name();
        for name in self.storage.store_names().await? {
            if name != current && self.storage.delete_store(&name).await? {
                info!(stale = %name, "stale cache generation removed");
            }
        }

        self.set_phase(WorkerPhase::Active);
        info!(store = %current, "cache generation active");
        Ok(())
    }

    /// Fetch interception: dispatch one request along its fallback ladder.
    ///
    /// Never panics; when both network and cache are exhausted the caller
    /// observes [`SteelRefError::AssetUnavailable`] and must treat the
    /// resource as absent data.
    ///
    /// # Errors
    ///
    /// Returns [`SteelRefError::AssetUnavailable`] when every rung of the
    /// ladder is exhausted.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> SteelRefResult<AssetResponse> {
        let class = classify(request, &self.manifest.data_file);
        debug!(
            url = %request.url,
            kind = %class.kind,
            strategy = %class.strategy,
            "fetch intercepted"
        );
        match class.kind {
            // Dynamic data falls back to its own cached copy.
            ResourceKind::DynamicData => self.network_first(request, &request.url).await,
            // Navigations fall back to the precached shell.
            ResourceKind::Navigation => {
                let shell = self.manifest.shell_request_url();
                self.network_first(request, &shell).await
            }
            ResourceKind::StaticAsset => self.cache_first(request).await,
        }
    }

    /// Network-first ladder: live response (cloned into the store) or the
    /// cached copy at `fallback_url`.
    async fn network_first(
        &self,
        request: &AssetRequest,
        fallback_url: &str,
    ) -> SteelRefResult<AssetResponse> {
        let store = self.manifest.store_name();
        match self.network.fetch(request, CacheMode::Default).await {
            Ok(response) => {
                // A failed cache write must not lose the live response.
                if let Err(err) = self
                    .storage
                    .write(&store, &request.url, response.clone())
                    .await
                {
                    warn!(url = %request.url, %err, "cache write after live fetch failed");
                }
                Ok(response)
            }
            Err(err) => {
                warn!(url = %request.url, %err, "network failed, falling back to cache");
                match self.storage.read(&store, fallback_url).await {
                    Ok(Some(cached)) => Ok(cached),
                    Ok(None) => Err(SteelRefError::AssetUnavailable {
                        url: request.url.clone(),
                    }),
                    Err(read_err) => {
                        warn!(url = %fallback_url, %read_err, "cache fallback read failed");
                        Err(SteelRefError::AssetUnavailable {
                            url: request.url.clone(),
                        })
                    }
                }
            }
        }
    }

    /// Cache-first ladder: cached copy, else the network (caching a clone
    /// of successful same-origin GETs on the way out).
    async fn cache_first(&self, request: &AssetRequest) -> SteelRefResult<AssetResponse> {
        let store = self.manifest.store_name();
        match self.storage.read(&store, &request.url).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            // A broken store degrades to the network rather than failing.
            Err(err) => warn!(url = %request.url, %err, "cache read failed, going to network"),
        }

        match self.network.fetch(request, CacheMode::Default).await {
            Ok(response) => {
                if response.is_cacheable_static(request.method)
                    && let Err(err) = self
                        .storage
                        .write(&store, &request.url, response.clone())
                        .await
                {
                    warn!(url = %request.url, %err, "static asset cache write failed");
                }
                Ok(response)
            }
            Err(err) => {
                warn!(url = %request.url, %err, "static asset unavailable");
                Err(SteelRefError::AssetUnavailable {
                    url: request.url.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::StaticNetwork;
    use crate::store::MemoryCacheStorage;

    fn routed_setup(version: &str) -> (PrecacheManifest, Arc<MemoryCacheStorage>, Arc<StaticNetwork>)
    {
        let manifest = PrecacheManifest::builtin(version);
        let network = StaticNetwork::new();
        for entry in &manifest.assets {
            network.route_ok(&manifest.request_url(entry), b"asset body");
        }
        (manifest, Arc::new(MemoryCacheStorage::new()), Arc::new(network))
    }

    fn manager(
        manifest: PrecacheManifest,
        storage: &Arc<MemoryCacheStorage>,
        network: &Arc<StaticNetwork>,
    ) -> CacheManager {
        CacheManager::new(
            manifest,
            Arc::clone(storage) as Arc<dyn CacheStorage>,
            Arc::clone(network) as Arc<dyn Network>,
        )
        .expect("valid manifest")
    }

    #[test]
    fn new_worker_starts_idle() {
        let (manifest, storage, network) = routed_setup("4.1.1");
        let worker = manager(manifest, &storage, &network);
        assert_eq!(worker.phase(), WorkerPhase::Idle);
        assert!(!worker.skip_waiting_requested());
    }

    #[test]
    fn invalid_manifest_is_rejected_at_construction() {
        let mut manifest = PrecacheManifest::builtin("4.1.1");
        manifest.version = String::new();
        let result = CacheManager::new(
            manifest,
            Arc::new(MemoryCacheStorage::new()),
            Arc::new(StaticNetwork::new()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn install_precaches_every_manifest_asset() {
        let (manifest, storage, network) = routed_setup("4.1.1");
        let asset_count = manifest.assets.len();
        let worker = manager(manifest, &storage, &network);

        worker.install().await.unwrap();
        assert_eq!(worker.phase(), WorkerPhase::Installed);
        assert!(worker.skip_waiting_requested());
        assert_eq!(storage.entry_count(&worker.store_name()), Some(asset_count));
        // The busted shell URL is the stored key.
        assert!(storage.contains(&worker.store_name(), "./index.html?v=4.1.1"));
    }

    #[tokio::test]
    async fn activate_before_install_is_rejected() {
        let (manifest, storage, network) = routed_setup("4.1.1");
        let worker = manager(manifest, &storage, &network);
        let err = worker.activate().await.unwrap_err();
        assert!(matches!(err, SteelRefError::ActivateBeforeInstall { .. }));
        assert_eq!(worker.phase(), WorkerPhase::Idle);
    }

    #[tokio::test]
    async fn skip_waiting_message_sets_flag() {
        let (manifest, storage, network) = routed_setup("4.1.1");
        let worker = manager(manifest, &storage, &network);
        assert!(!worker.skip_waiting_requested());
        worker.handle_message(ControlMessage::SkipWaiting);
        assert!(worker.skip_waiting_requested());
    }

    #[tokio::test]
    async fn failed_asset_fails_install_and_leaves_no_store() {
        let (manifest, storage, network) = routed_setup("4.1.1");
        network.remove_route("./app.css?v=4.1.1");
        let worker = manager(manifest, &storage, &network);

        let err = worker.install().await.unwrap_err();
        assert!(matches!(err, SteelRefError::PrecacheFailed { .. }));
        assert!(err.to_string().contains("./app.css?v=4.1.1"));
        assert_eq!(worker.phase(), WorkerPhase::Idle);
        assert_eq!(storage.entry_count(&worker.store_name()), None);
    }

    #[tokio::test]
    async fn non_success_status_fails_install() {
        let (manifest, storage, network) = routed_setup("4.1.1");
        network.route(
            "./app.js?v=4.1.1",
            AssetResponse::ok("./app.js?v=4.1.1", "text/javascript", b"").with_status(500),
        );
        let worker = manager(manifest, &storage, &network);

        let err = worker.install().await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert_eq!(storage.entry_count(&worker.store_name()), None);
    }
}
