//! Condition entries as written in rule files.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use metagame_core::{CardName, Zone};
use serde::{Deserialize, Serialize};

use crate::model::Condition;

/// The `Type` strings a rule file may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionType {
    InMainboard,
    InSideboard,
    InMainOrSideboard,
    OneOrMoreInMainboard,
    OneOrMoreInSideboard,
    OneOrMoreInMainOrSideboard,
    TwoOrMoreInMainboard,
    TwoOrMoreInSideboard,
    TwoOrMoreInMainOrSideboard,
    DoesNotContain,
    DoesNotContainMainboard,
    DoesNotContainSideboard,
    And,
    Or,
}

impl ConditionType {
    pub const ALL: [ConditionType; 14] = [
        ConditionType::InMainboard,
        ConditionType::InSideboard,
        ConditionType::InMainOrSideboard,
        ConditionType::OneOrMoreInMainboard,
        ConditionType::OneOrMoreInSideboard,
        ConditionType::OneOrMoreInMainOrSideboard,
        ConditionType::TwoOrMoreInMainboard,
        ConditionType::TwoOrMoreInSideboard,
        ConditionType::TwoOrMoreInMainOrSideboard,
        ConditionType::DoesNotContain,
        ConditionType::DoesNotContainMainboard,
        ConditionType::DoesNotContainSideboard,
        ConditionType::And,
        ConditionType::Or,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConditionType::InMainboard => "InMainboard",
            ConditionType::InSideboard => "InSideboard",
            ConditionType::InMainOrSideboard => "InMainOrSideboard",
            ConditionType::OneOrMoreInMainboard => "OneOrMoreInMainboard",
            ConditionType::OneOrMoreInSideboard => "OneOrMoreInSideboard",
            ConditionType::OneOrMoreInMainOrSideboard => "OneOrMoreInMainOrSideboard",
            ConditionType::TwoOrMoreInMainboard => "TwoOrMoreInMainboard",
            ConditionType::TwoOrMoreInSideboard => "TwoOrMoreInSideboard",
            ConditionType::TwoOrMoreInMainOrSideboard => "TwoOrMoreInMainOrSideboard",
            ConditionType::DoesNotContain => "DoesNotContain",
            ConditionType::DoesNotContainMainboard => "DoesNotContainMainboard",
            ConditionType::DoesNotContainSideboard => "DoesNotContainSideboard",
            ConditionType::And => "And",
            ConditionType::Or => "Or",
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, ConditionType::And | ConditionType::Or)
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ConditionType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown condition type: '{}'", s))
    }
}

/// A condition as written: `{ "Type": ..., "Cards": [...] }`, or a composite
/// `{ "Type": "And" | "Or", "Conditions": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionSpec {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Cards", default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<String>,
    #[serde(rename = "Conditions", default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionSpec>,
}

impl ConditionSpec {
    /// Convert to the typed model, checking its shape.
    ///
    /// An unknown `Type` is not a structural error: it becomes
    /// [`Condition::Unrecognized`] so the rest of the file still loads.
    pub fn to_condition(&self) -> std::result::Result<Condition, String> {
        let kind = match self.kind.parse::<ConditionType>() {
            Ok(kind) => kind,
            Err(_) => {
                return Ok(Condition::Unrecognized {
                    kind: self.kind.clone(),
                })
            }
        };

        let (shape, zone) = match kind {
            ConditionType::And => return self.composite(kind, Condition::And),
            ConditionType::Or => return self.composite(kind, Condition::Or),
            ConditionType::InMainboard => (Shape::All, Zone::Mainboard),
            ConditionType::InSideboard => (Shape::All, Zone::Sideboard),
            ConditionType::InMainOrSideboard => (Shape::All, Zone::MainOrSideboard),
            ConditionType::OneOrMoreInMainboard => (Shape::OneOrMore, Zone::Mainboard),
            ConditionType::OneOrMoreInSideboard => (Shape::OneOrMore, Zone::Sideboard),
            ConditionType::OneOrMoreInMainOrSideboard => (Shape::OneOrMore, Zone::MainOrSideboard),
            ConditionType::TwoOrMoreInMainboard => (Shape::TwoOrMore, Zone::Mainboard),
            ConditionType::TwoOrMoreInSideboard => (Shape::TwoOrMore, Zone::Sideboard),
            ConditionType::TwoOrMoreInMainOrSideboard => (Shape::TwoOrMore, Zone::MainOrSideboard),
            ConditionType::DoesNotContain => (Shape::DoesNotContain, Zone::MainOrSideboard),
            ConditionType::DoesNotContainMainboard => (Shape::DoesNotContain, Zone::Mainboard),
            ConditionType::DoesNotContainSideboard => (Shape::DoesNotContain, Zone::Sideboard),
        };

        let cards = normalize_cards(&self.cards);
        if cards.is_empty() {
            return Err(format!("{} condition has no cards", kind));
        }

        Ok(match shape {
            Shape::All => Condition::All { zone, cards },
            Shape::OneOrMore => Condition::OneOrMore { zone, cards },
            Shape::TwoOrMore => Condition::TwoOrMore { zone, cards },
            Shape::DoesNotContain => Condition::DoesNotContain { zone, cards },
        })
    }

    fn composite(
        &self,
        kind: ConditionType,
        build: fn(Vec<Condition>) -> Condition,
    ) -> std::result::Result<Condition, String> {
        if self.conditions.is_empty() {
            return Err(format!("{} condition has no sub-conditions", kind));
        }
        let children = self
            .conditions
            .iter()
            .map(ConditionSpec::to_condition)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(build(children))
    }
}

enum Shape {
    All,
    OneOrMore,
    TwoOrMore,
    DoesNotContain,
}

/// Normalize card names, dropping blanks and duplicates but keeping order.
pub(crate) fn normalize_cards(raw: &[String]) -> Vec<CardName> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|name| CardName::normalize(name))
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
