//! Condition evaluation against a deck.
//!
//! Every function here is pure and total: evaluation reads the deck's card
//! multisets and never fails. Composite `And`/`Or` nodes short-circuit.
//! Unrecognized condition kinds evaluate to `false`.

use metagame_core::{CardName, Deck, Zone};
use tracing::debug;

use crate::model::Condition;

/// Evaluate one condition (recursively for composites).
pub fn evaluate(condition: &Condition, deck: &Deck) -> bool {
    match condition {
        Condition::All { zone, cards } => cards.iter().all(|c| deck.contains(*zone, c)),
        Condition::OneOrMore { zone, cards } => cards.iter().any(|c| deck.contains(*zone, c)),
        Condition::TwoOrMore { zone, cards } => distinct_present(deck, *zone, cards) >= 2,
        Condition::DoesNotContain { zone, cards } => !cards.iter().any(|c| deck.contains(*zone, c)),
        Condition::And(children) => children.iter().all(|c| evaluate(c, deck)),
        Condition::Or(children) => children.iter().any(|c| evaluate(c, deck)),
        Condition::Unrecognized { kind } => {
            debug!(kind = %kind, "unrecognized condition kind evaluates to false");
            false
        }
    }
}

/// Evaluate a condition list with AND semantics.
///
/// An empty list holds vacuously; the loader never produces one for an
/// archetype, but a variant with no conditions always matches.
pub fn evaluate_all(conditions: &[Condition], deck: &Deck) -> bool {
    conditions.iter().all(|c| evaluate(c, deck))
}

/// Number of distinct listed cards present in the zone. Copies are not
/// counted: four Lightning Bolts are one card.
fn distinct_present(deck: &Deck, zone: Zone, cards: &[CardName]) -> usize {
    cards.iter().filter(|c| deck.contains(zone, c)).count()
}

// ── Tests ───────────────────────────────────────────────────────────
