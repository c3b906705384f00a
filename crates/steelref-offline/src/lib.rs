//! Offline cache subsystem for the steelref knife-steel reference.
//!
//! Maintains one versioned cache generation of static assets plus a
//! separately-refreshed dynamic data file, deciding per request whether to
//! go network-first or cache-first, and reconciling generations on
//! activation. The lifecycle is an explicit state machine
//! (install → activate → fetch interception) driven by
//! [`worker::CacheManager`]; request dispatch is a pure decision function in
//! [`classify`] kept apart from the I/O side effects.
//!
//! Storage and network are trait seams ([`store::CacheStorage`],
//! [`network::Network`]) whose async operations are boxed futures, so the
//! crate remains dyn-compatible and runtime-agnostic. In-memory
//! implementations ship with the crate for hermetic use and testing.

use std::future::Future;
use std::pin::Pin;

use steelref_core::SteelRefResult;

pub mod classify;
pub mod manifest;
pub mod network;
pub mod store;
pub mod types;
pub mod worker;

/// Boxed future carrying a `SteelRefResult<T>`.
pub type OfflineFuture<'a, T> = Pin<Box<dyn Future<Output = SteelRefResult<T>> + Send + 'a>>;

pub use classify::{FetchStrategy, RequestClass, ResourceKind, classify};
pub use manifest::{ManifestEntry, PrecacheManifest};
pub use network::{Network, StaticNetwork};
pub use store::{CacheStorage, MemoryCacheStorage};
pub use types::{AssetRequest, AssetResponse, CacheMode, Method, RequestMode, ResponseKind};
pub use worker::{CacheManager, ControlMessage, WorkerPhase};
