//! Explicit session context owned by the UI collaborator.
//!
//! [`Session`] replaces the hidden global state a naive client would keep:
//! it bundles the catalog snapshot, its search index, the user's active
//! grind selection, and the compare tray into one value the collaborator
//! owns and passes around. Reloads replace the catalog and index wholesale;
//! nothing is patched in place.

use std::collections::{BTreeSet, VecDeque};

use tracing::info;

use crate::catalog::SteelRecord;
use crate::config::SessionConfig;
use crate::recommend::{GrindKey, Recommendation, RecommendationTables, resolve_with_session};
use crate::search::SearchIndex;

// ---------------------------------------------------------------------------
// Compare tray
// ---------------------------------------------------------------------------

/// Bounded list of steel names selected for comparison. On overflow the
/// oldest entry is evicted; re-adding a present name refreshes its recency
/// instead of duplicating it. A capacity of zero disables the tray.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareTray {
    capacity: usize,
    names: VecDeque<String>,
}

impl CompareTray {
    /// New empty tray with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            names: VecDeque::with_capacity(capacity),
        }
    }

    /// Add a steel name. Returns the evicted name, if the tray was full.
    pub fn push(&mut self, name: impl Into<String>) -> Option<String> {
        if self.capacity == 0 {
            return None;
        }
        let name = name.into();
        if let Some(pos) = self.names.iter().position(|n| *n == name) {
            self.names.remove(pos);
            self.names.push_back(name);
            return None;
        }
        let evicted = if self.names.len() >= self.capacity {
            self.names.pop_front()
        } else {
            None
        };
        self.names.push_back(name);
        evicted
    }

    /// Remove a name. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            self.names.remove(pos);
            true
        } else {
            false
        }
    }

    /// Drop every name the predicate rejects.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.names.retain(|n| keep(n));
    }

    /// Whether a name is in the tray.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Names, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One user session over a catalog snapshot.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    index: SearchIndex,
    active_grind: Option<GrindKey>,
    compare: CompareTray,
}

impl Session {
    /// New session over a catalog with default configuration.
    #[must_use]
    pub fn new(records: Vec<SteelRecord>) -> Self {
        Self::with_config(records, SessionConfig::default())
    }

    /// New session with explicit configuration.
    #[must_use]
    pub fn with_config(records: Vec<SteelRecord>, config: SessionConfig) -> Self {
        let compare = CompareTray::new(config.compare_capacity);
        Self {
            index: SearchIndex::from_records(records),
            active_grind: None,
            compare,
            config,
        }
    }

    /// Replace the catalog and index wholesale (refresh action). Compare
    /// entries whose steel no longer exists are pruned; the active grind
    /// selection survives.
    pub fn reload(&mut self, records: Vec<SteelRecord>) {
        self.index = SearchIndex::from_records(records);
        let known: BTreeSet<&str> = self
            .index
            .records()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        self.compare.retain(|name| known.contains(name));
        info!(record_count = self.index.len(), "session catalog replaced");
    }

    /// The catalog snapshot.
    #[must_use]
    pub fn catalog(&self) -> &[SteelRecord] {
        self.index.records()
    }

    /// The search index over the snapshot.
    #[must_use]
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Ranked search with the session's configured limit.
    #[must_use]
    pub fn search(&self, text: &str) -> Vec<&SteelRecord> {
        self.index.query(text, self.config.search_limit)
    }

    /// Resolve a recommendation, feeding the session's active grind into
    /// the cascade.
    #[must_use]
    pub fn recommend(
        &self,
        steel: &SteelRecord,
        explicit: Option<GrindKey>,
        tables: &RecommendationTables,
    ) -> Recommendation {
        resolve_with_session(steel, explicit, self.active_grind, tables)
    }

    /// The session-wide grind selection, if any.
    #[must_use]
    pub fn active_grind(&self) -> Option<GrindKey> {
        self.active_grind
    }

    /// Set or clear the session-wide grind selection.
    pub fn set_active_grind(&mut self, grind: Option<GrindKey>) {
        self.active_grind = grind;
    }

    #[must_use]
    pub fn compare(&self) -> &CompareTray {
        &self.compare
    }

    pub fn compare_mut(&mut self) -> &mut CompareTray {
        &mut self.compare
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
