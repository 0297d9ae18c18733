//! Immutable per-format rule sets.

use chrono::{DateTime, Utc};

use super::{ArchetypeDefinition, FallbackDefinition, Format};

/// The rules parsed for one format, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    pub archetypes: Vec<ArchetypeDefinition>,
    pub fallbacks: Vec<FallbackDefinition>,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty() && self.fallbacks.is_empty()
    }
}

/// A published, versioned [`RuleSet`].
///
/// Snapshots are shared behind `Arc` and never mutated: a reload publishes a
/// new snapshot and readers holding the old one keep it until they finish.
#[derive(Debug, Clone)]
pub struct RuleSnapshot {
    pub format: Format,
    pub rules: RuleSet,
    /// Store-wide, strictly increasing publication number.
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
}

impl RuleSnapshot {
    pub fn archetypes(&self) -> &[ArchetypeDefinition] {
        &self.rules.archetypes
    }

    pub fn fallbacks(&self) -> &[FallbackDefinition] {
        &self.rules.fallbacks
    }
}
