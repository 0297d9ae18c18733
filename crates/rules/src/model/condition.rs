//! Typed deck predicates.

use metagame_core::{CardName, Zone};

/// A predicate over a deck, built by the loader from a rule file condition.
///
/// Leaf variants always carry at least one card and composites at least
/// one sub-condition; the loader rejects files that violate this.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Every listed card is present in the zone.
    All { zone: Zone, cards: Vec<CardName> },
    /// At least one listed card is present in the zone.
    OneOrMore { zone: Zone, cards: Vec<CardName> },
    /// At least two distinct listed cards are present in the zone.
    TwoOrMore { zone: Zone, cards: Vec<CardName> },
    /// None of the listed cards is present in the zone.
    DoesNotContain { zone: Zone, cards: Vec<CardName> },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    /// A condition type this build does not understand. Never matches.
    Unrecognized { kind: String },
}

impl Condition {
    /// Unrecognized condition kinds anywhere in this tree.
    pub fn unrecognized_kinds(&self) -> Vec<&str> {
        let mut kinds = Vec::new();
        self.collect_unrecognized(&mut kinds);
        kinds
    }

    fn collect_unrecognized<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Unrecognized { kind } => out.push(kind),
            Condition::And(children) | Condition::Or(children) => {
                for child in children {
                    child.collect_unrecognized(out);
                }
            }
            _ => {}
        }
    }
}
