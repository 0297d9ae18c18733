//! Archetype and fallback definitions.

use metagame_core::CardName;

use super::Condition;

/// A named deck strategy: all `conditions` must hold for a deck to match.
///
/// Immutable once built by the loader; dropped with the snapshot holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchetypeDefinition {
    pub name: String,
    pub include_color_in_name: bool,
    pub conditions: Vec<Condition>,
    pub variants: Vec<Variant>,
}

/// A sub-classification checked only after its archetype matched.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    pub conditions: Vec<Condition>,
}

/// A coarse deck shape scored by how many of its common cards a deck plays.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDefinition {
    pub name: String,
    pub include_color_in_name: bool,
    pub common_cards: Vec<CardName>,
}
