//! The active-snapshot handle shared between classifiers and the reload manager.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::model::{Format, RuleSet, RuleSnapshot};

/// Per-format active [`RuleSnapshot`]s.
///
/// Readers clone the `Arc` under a read lock and release it immediately, so
/// a classification keeps one coherent snapshot for its whole duration while
/// a reload publishes the next one. The write lock is held only for the map
/// insert. Created once and injected wherever rules are read or published.
#[derive(Debug, Default)]
pub struct RuleStore {
    snapshots: RwLock<HashMap<Format, Arc<RuleSnapshot>>>,
    /// Formats known before (or without) a published snapshot.
    registered: RwLock<BTreeSet<Format>>,
    next_version: AtomicU64,
}

/// Health/observability counters for one format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatStats {
    pub format: Format,
    pub archetypes: usize,
    pub fallbacks: usize,
    pub version: u64,
    pub last_reload: DateTime<Utc>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register formats so the reload manager recognizes them in changed paths.
    pub fn register_format(&self, format: Format) {
        self.write_registered().insert(format);
    }

    /// Registered formats plus every format with a published snapshot, sorted.
    pub fn known_formats(&self) -> Vec<Format> {
        let mut formats: BTreeSet<Format> = self.read_registered().clone();
        formats.extend(self.read_snapshots().keys().cloned());
        formats.into_iter().collect()
    }

    /// The active snapshot for `format`, if one was ever published.
    pub fn snapshot(&self, format: &Format) -> Option<Arc<RuleSnapshot>> {
        self.read_snapshots().get(format).cloned()
    }

    /// Publish `rules` as the new active snapshot for `format`.
    ///
    /// The rule set is fully parsed before this is called; under the write
    /// lock only the version is assigned and the `Arc` inserted, so versions
    /// are published in increasing order.
    pub fn publish(&self, format: Format, rules: RuleSet) -> Arc<RuleSnapshot> {
        let (snapshot, previous) = {
            let mut snapshots = self.write_snapshots();
            let version = self.next_version.fetch_add(1, Ordering::SeqCst) + 1;
            let snapshot = Arc::new(RuleSnapshot {
                format: format.clone(),
                rules,
                version,
                loaded_at: Utc::now(),
            });
            let previous = snapshots.insert(format.clone(), Arc::clone(&snapshot));
            (snapshot, previous)
        };

        info!(
            format = %format,
            version = snapshot.version,
            previous_version = previous.map(|p| p.version).unwrap_or(0),
            archetypes = snapshot.archetypes().len(),
            fallbacks = snapshot.fallbacks().len(),
            "published rule snapshot"
        );
        snapshot
    }

    pub fn stats(&self, format: &Format) -> Option<FormatStats> {
        self.snapshot(format).map(|s| stats_for(&s))
    }

    /// Statistics for every published format, sorted by format.
    pub fn all_stats(&self) -> Vec<FormatStats> {
        let mut stats: Vec<FormatStats> = self
            .read_snapshots()
            .values()
            .map(|s| stats_for(s))
            .collect();
        stats.sort_by(|a, b| a.format.cmp(&b.format));
        stats
    }

    // Writers only ever insert finished values, so a poisoned lock still
    // guards a consistent map.

    fn read_snapshots(&self) -> RwLockReadGuard<'_, HashMap<Format, Arc<RuleSnapshot>>> {
        self.snapshots.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_snapshots(&self) -> RwLockWriteGuard<'_, HashMap<Format, Arc<RuleSnapshot>>> {
        self.snapshots.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_registered(&self) -> RwLockReadGuard<'_, BTreeSet<Format>> {
        self.registered.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_registered(&self) -> RwLockWriteGuard<'_, BTreeSet<Format>> {
        self.registered.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn stats_for(snapshot: &RuleSnapshot) -> FormatStats {
    FormatStats {
        format: snapshot.format.clone(),
        archetypes: snapshot.archetypes().len(),
        fallbacks: snapshot.fallbacks().len(),
        version: snapshot.version,
        last_reload: snapshot.loaded_at,
    }
}
