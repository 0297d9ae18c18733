//! Deck classification against the active rule snapshot.
//!
//! Archetypes are tried first, in load order, and the first whose conditions
//! all hold wins; its variants are then tried in order. When no archetype
//! matches, every fallback is scored by the share of its common cards the
//! deck plays and the best one above the threshold is returned.

mod colors;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use metagame_core::{Colors, Deck, Zone};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::evaluator::evaluate_all;
use crate::model::{ArchetypeDefinition, FallbackDefinition, Format, RuleSnapshot};
use crate::store::RuleStore;

pub use colors::{CardColors, StaticCardColors};

/// Default minimum fallback similarity, in percent.
pub const DEFAULT_MIN_FALLBACK_SCORE: f64 = 10.0;

/// Archetype name reported when nothing matched.
pub const UNKNOWN_ARCHETYPE: &str = "Unknown";

/// How a classification was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    ArchetypeRules,
    FallbackRules,
    None,
}

impl fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationMethod::ArchetypeRules => write!(f, "archetype_rules"),
            ClassificationMethod::FallbackRules => write!(f, "fallback_rules"),
            ClassificationMethod::None => write!(f, "none"),
        }
    }
}

/// Outcome of classifying one deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Final name: color prefix (if any) + archetype + variant.
    pub archetype: String,
    /// 1.0 for archetype matches, score/100 for fallbacks, 0.0 otherwise.
    pub confidence: f64,
    pub method: ClassificationMethod,
    /// The matched rule's name (with variant) before color naming.
    pub rule_name: Option<String>,
    /// Version of the snapshot this result was computed against.
    pub snapshot_version: Option<u64>,
}

impl ClassificationResult {
    pub fn unknown(snapshot_version: Option<u64>) -> Self {
        Self {
            archetype: UNKNOWN_ARCHETYPE.to_string(),
            confidence: 0.0,
            method: ClassificationMethod::None,
            rule_name: None,
            snapshot_version,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.method == ClassificationMethod::None
    }
}

/// Classifies decks using whatever snapshot the shared [`RuleStore`] holds
/// at the moment each call starts.
#[derive(Clone)]
pub struct Classifier {
    store: Arc<RuleStore>,
    min_fallback_score: f64,
    card_colors: Option<Arc<dyn CardColors>>,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("min_fallback_score", &self.min_fallback_score)
            .field("card_colors", &self.card_colors.is_some())
            .finish()
    }
}

impl Classifier {
    pub fn new(store: Arc<RuleStore>) -> Self {
        Self {
            store,
            min_fallback_score: DEFAULT_MIN_FALLBACK_SCORE,
            card_colors: None,
        }
    }

    /// Set the minimum fallback similarity, in percent (0-100).
    pub fn with_min_fallback_score(mut self, score: f64) -> Self {
        self.min_fallback_score = score.clamp(0.0, 100.0);
        self
    }

    /// Enable color naming for rules with `IncludeColorInName`.
    pub fn with_card_colors(mut self, colors: Arc<dyn CardColors>) -> Self {
        self.card_colors = Some(colors);
        self
    }

    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    /// Classify `deck` for `format`.
    ///
    /// The active snapshot is captured once; a reload that lands mid-call is
    /// not observed. A format without a snapshot classifies as `Unknown`.
    pub fn classify(&self, format: &Format, deck: &Deck) -> ClassificationResult {
        match self.store.snapshot(format) {
            Some(snapshot) => self.classify_with(&snapshot, deck),
            None => {
                debug!(format = %format, "no rules loaded for format");
                ClassificationResult::unknown(None)
            }
        }
    }

    /// Classify against an explicit snapshot.
    pub fn classify_with(&self, snapshot: &RuleSnapshot, deck: &Deck) -> ClassificationResult {
        let version = Some(snapshot.version);

        if let Some((archetype, rule_name)) = match_archetype(snapshot.archetypes(), deck) {
            trace!(format = %snapshot.format, rule = %rule_name, "archetype rules matched");
            return ClassificationResult {
                archetype: self.display_name(&rule_name, archetype.include_color_in_name, deck),
                confidence: 1.0,
                method: ClassificationMethod::ArchetypeRules,
                rule_name: Some(rule_name),
                snapshot_version: version,
            };
        }

        if let Some((fallback, score)) =
            best_fallback(snapshot.fallbacks(), deck, self.min_fallback_score)
        {
            trace!(format = %snapshot.format, rule = %fallback.name, score, "fallback rules matched");
            return ClassificationResult {
                archetype: self.display_name(&fallback.name, fallback.include_color_in_name, deck),
                confidence: score / 100.0,
                method: ClassificationMethod::FallbackRules,
                rule_name: Some(fallback.name.clone()),
                snapshot_version: version,
            };
        }

        ClassificationResult::unknown(version)
    }

    fn display_name(&self, rule_name: &str, include_color: bool, deck: &Deck) -> String {
        match (&self.card_colors, include_color) {
            (Some(resolver), true) => {
                format!("{} {}", deck_colors(resolver.as_ref(), deck).name(), rule_name)
            }
            _ => rule_name.to_string(),
        }
    }
}

/// First archetype (in order) whose conditions hold, with its resolved name.
fn match_archetype<'a>(
    archetypes: &'a [ArchetypeDefinition],
    deck: &Deck,
) -> Option<(&'a ArchetypeDefinition, String)> {
    let archetype = archetypes
        .iter()
        .find(|a| evaluate_all(&a.conditions, deck))?;

    let name = archetype
        .variants
        .iter()
        .find(|v| evaluate_all(&v.conditions, deck))
        .map(|v| format!("{} {}", archetype.name, v.name))
        .unwrap_or_else(|| archetype.name.clone());

    Some((archetype, name))
}

/// Percentage of a fallback's common cards present anywhere in the deck.
pub fn fallback_score(fallback: &FallbackDefinition, deck: &Deck) -> f64 {
    if fallback.common_cards.is_empty() {
        return 0.0;
    }
    let present = fallback
        .common_cards
        .iter()
        .filter(|c| deck.contains(Zone::MainOrSideboard, c))
        .count();
    100.0 * present as f64 / fallback.common_cards.len() as f64
}

/// Highest-scoring fallback at or above `min_score`. Ties keep the earlier one.
fn best_fallback<'a>(
    fallbacks: &'a [FallbackDefinition],
    deck: &Deck,
    min_score: f64,
) -> Option<(&'a FallbackDefinition, f64)> {
    let mut best: Option<(&FallbackDefinition, f64)> = None;
    for fallback in fallbacks {
        let score = fallback_score(fallback, deck);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((fallback, score));
        }
    }
    best.filter(|(_, score)| *score > 0.0 && *score >= min_score)
}

/// Union of the colors of every mainboard card the resolver knows.
fn deck_colors(resolver: &dyn CardColors, deck: &Deck) -> Colors {
    deck.mainboard()
        .keys()
        .filter_map(|card| resolver.colors(card))
        .fold(Colors::COLORLESS, Colors::union)
}
