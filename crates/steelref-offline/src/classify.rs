//! Pure request classification for fetch interception.
//!
//! Every intercepted request is dispatched by category before any I/O
//! happens:
//!
//! | Resource kind | Match                                   | Strategy      |
//! |---------------|-----------------------------------------|---------------|
//! | `DynamicData` | path ends with the catalog data file    | network-first |
//! | `Navigation`  | navigate mode, or Accept says HTML      | network-first |
//! | `StaticAsset` | everything else                         | cache-first   |
//!
//! Keeping the decision separate from the side effects makes the dispatch
//! table testable without a network or a cache store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{AssetRequest, RequestMode};

/// What kind of resource a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// The frequently-changing catalog data file.
    DynamicData,
    /// A page navigation or other HTML document request.
    Navigation,
    /// Any other asset (stylesheet, script, icon).
    StaticAsset,
}

impl ResourceKind {
    /// The fetch strategy this kind of resource is served with.
    #[must_use]
    pub const fn strategy(self) -> FetchStrategy {
        match self {
            Self::DynamicData | Self::Navigation => FetchStrategy::NetworkFirst,
            Self::StaticAsset => FetchStrategy::CacheFirst,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DynamicData => write!(f, "dynamic_data"),
            Self::Navigation => write!(f, "navigation"),
            Self::StaticAsset => write!(f, "static_asset"),
        }
    }
}

/// Which side is consulted first when serving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    /// Try the live network, fall back to the cache.
    NetworkFirst,
    /// Serve the cached copy, fall back to the network.
    CacheFirst,
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkFirst => write!(f, "network_first"),
            Self::CacheFirst => write!(f, "cache_first"),
        }
    }
}

/// Classification of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestClass {
    pub kind: ResourceKind,
    pub strategy: FetchStrategy,
}

/// Classify a request against the configured data file name.
///
/// The data-file check strips query strings first, so a cache-busted
/// `steels.json?ts=...` still classifies as dynamic data.
#[must_use]
pub fn classify(request: &AssetRequest, data_file: &str) -> RequestClass {
    let kind = if request.path_ends_with(data_file) {
        ResourceKind::DynamicData
    } else if request.mode == RequestMode::Navigate || request.accepts_html() {
        ResourceKind::Navigation
    } else {
        ResourceKind::StaticAsset
    };
    RequestClass {
        kind,
        strategy: kind.strategy(),
    }
}
