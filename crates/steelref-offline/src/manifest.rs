//! Precache manifest: the fixed list of core assets one cache generation
//! holds, plus the version tag that names the generation.
//!
//! The version string embeds into the store name (`<prefix>-<version>`), so
//! bumping it is the sole mechanism for invalidating the entire static
//! cache. Versioned entries are fetched and stored under a `?v=<version>`
//! query so intermediate HTTP caches cannot serve a stale body across a
//! version bump.

use serde::{Deserialize, Serialize};
use steelref_core::{SteelRefError, SteelRefResult};

/// One precached asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Unversioned URL.
    pub url: String,
    /// Whether the request URL carries the `?v=<version>` cache-buster.
    pub versioned: bool,
}

impl ManifestEntry {
    /// Entry fetched with the version query parameter.
    #[must_use]
    pub fn versioned(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            versioned: true,
        }
    }

    /// Entry fetched as-is (content-addressed or immutable assets).
    #[must_use]
    pub fn plain(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            versioned: false,
        }
    }
}

/// The manifest of one cache generation.
///
/// An incomplete manifest is a correctness bug, not a performance issue:
/// any core asset missing here is simply absent offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecacheManifest {
    /// Store-name prefix; the full name is `<prefix>-<version>`.
    pub cache_prefix: String,
    /// Version tag. Bump on every core-asset change.
    pub version: String,
    /// The offline shell page, served when a navigation cannot reach the
    /// network. Must also appear in `assets`.
    pub shell_url: String,
    /// File name of the dynamic catalog resource (matched by path suffix).
    pub data_file: String,
    /// Every asset precached at install.
    pub assets: Vec<ManifestEntry>,
}

impl PrecacheManifest {
    /// The built-in manifest of the reference app.
    #[must_use]
    pub fn builtin(version: impl Into<String>) -> Self {
        Self {
            cache_prefix: "steelref-static".into(),
            version: version.into(),
            shell_url: "./index.html".into(),
            data_file: "steels.json".into(),
            assets: vec![
                ManifestEntry::plain("./"),
                ManifestEntry::versioned("./index.html"),
                ManifestEntry::versioned("./app.css"),
                ManifestEntry::versioned("./app.js"),
                ManifestEntry::versioned("./manifest.webmanifest"),
                ManifestEntry::plain("./icons/icon-192.png"),
                ManifestEntry::plain("./icons/icon-512.png"),
            ],
        }
    }

    /// Version-qualified store name for this generation.
    #[must_use]
    pub fn store_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.version)
    }

    /// Request URL for an entry, with the cache-buster applied when the
    /// entry asks for one.
    #[must_use]
    pub fn request_url(&self, entry: &ManifestEntry) -> String {
        if entry.versioned {
            format!("{}?v={}", entry.url, self.version)
        } else {
            entry.url.clone()
        }
    }

    /// Request URL of the shell page, as it was stored at install time.
    #[must_use]
    pub fn shell_request_url(&self) -> String {
        self.assets
            .iter()
            .find(|entry| entry.url == self.shell_url)
            .map_or_else(|| self.shell_url.clone(), |entry| self.request_url(entry))
    }

    /// Structural validation, run before a manifest is allowed to drive an
    /// install.
    ///
    /// # Errors
    ///
    /// Returns [`SteelRefError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> SteelRefResult<()> {
        if self.version.trim().is_empty() {
            return Err(SteelRefError::InvalidConfig {
                field: "version",
                value: self.version.clone(),
                reason: "the version tag names the cache generation and cannot be empty".into(),
            });
        }
        if self.cache_prefix.trim().is_empty() {
            return Err(SteelRefError::InvalidConfig {
                field: "cache_prefix",
                value: self.cache_prefix.clone(),
                reason: "an empty prefix would collide store names across apps".into(),
            });
        }
        if self.data_file.trim().is_empty() {
            return Err(SteelRefError::InvalidConfig {
                field: "data_file",
                value: self.data_file.clone(),
                reason: "dynamic-data dispatch needs a file name to match".into(),
            });
        }
        if self.assets.is_empty() {
            return Err(SteelRefError::InvalidConfig {
                field: "assets",
                value: String::new(),
                reason: "a generation with no precached assets cannot serve offline".into(),
            });
        }
        if !self.assets.iter().any(|entry| entry.url == self.shell_url) {
            return Err(SteelRefError::InvalidConfig {
                field: "shell_url",
                value: self.shell_url.clone(),
                reason: "the offline shell must be part of the precached asset set".into(),
            });
        }
        Ok(())
    }
}
