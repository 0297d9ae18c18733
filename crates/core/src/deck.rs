use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::card::{CardName, Zone};
use crate::error::Result;

/// A decklist as two card multisets keyed by normalized name.
///
/// A card absent from a zone and a card present with count zero are the
/// same thing: zero-count entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    mainboard: HashMap<CardName, u32>,
    sideboard: HashMap<CardName, u32>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a deck from raw `(name, count)` lists. Duplicate names are summed.
    pub fn from_lists<'a, M, S>(mainboard: M, sideboard: S) -> Self
    where
        M: IntoIterator<Item = (&'a str, u32)>,
        S: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut deck = Self::new();
        for (name, count) in mainboard {
            deck.add(Zone::Mainboard, name, count);
        }
        for (name, count) in sideboard {
            deck.add(Zone::Sideboard, name, count);
        }
        deck
    }

    /// Add copies of a card to the mainboard or sideboard.
    ///
    /// `Zone::MainOrSideboard` is not a physical zone and adds to the mainboard.
    pub fn add(&mut self, zone: Zone, name: &str, count: u32) {
        if count == 0 {
            return;
        }
        let key = CardName::normalize(name);
        if key.is_empty() {
            return;
        }
        let board = match zone {
            Zone::Mainboard | Zone::MainOrSideboard => &mut self.mainboard,
            Zone::Sideboard => &mut self.sideboard,
        };
        let total = board.entry(key).or_insert(0);
        *total = total.saturating_add(count);
    }

    /// Number of copies of `card` in the zone. `MainOrSideboard` sums both,
    /// saturating at `u32::MAX`.
    pub fn count(&self, zone: Zone, card: &CardName) -> u32 {
        let main = || self.mainboard.get(card).copied().unwrap_or(0);
        let side = || self.sideboard.get(card).copied().unwrap_or(0);
        match zone {
            Zone::Mainboard => main(),
            Zone::Sideboard => side(),
            Zone::MainOrSideboard => main().saturating_add(side()),
        }
    }

    pub fn contains(&self, zone: Zone, card: &CardName) -> bool {
        match zone {
            Zone::Mainboard => self.mainboard.contains_key(card),
            Zone::Sideboard => self.sideboard.contains_key(card),
            Zone::MainOrSideboard => {
                self.mainboard.contains_key(card) || self.sideboard.contains_key(card)
            }
        }
    }

    pub fn mainboard(&self) -> &HashMap<CardName, u32> {
        &self.mainboard
    }

    pub fn sideboard(&self) -> &HashMap<CardName, u32> {
        &self.sideboard
    }

    pub fn is_empty(&self) -> bool {
        self.mainboard.is_empty() && self.sideboard.is_empty()
    }
}

// ── Wire format ───────────────────────────────────────────────

/// One line of a submitted decklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckLine {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Count")]
    pub count: u32,
}

/// Decklist as exchanged with report generators and API layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeckList {
    #[serde(rename = "Mainboard", default)]
    pub mainboard: Vec<DeckLine>,
    #[serde(rename = "Sideboard", default)]
    pub sideboard: Vec<DeckLine>,
}

impl DeckList {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON decklist file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

impl From<&DeckList> for Deck {
    fn from(list: &DeckList) -> Self {
        Deck::from_lists(
            list.mainboard.iter().map(|l| (l.name.as_str(), l.count)),
            list.sideboard.iter().map(|l| (l.name.as_str(), l.count)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burn() -> Deck {
        Deck::from_lists(
            [("Lightning Bolt", 4), ("Mountain", 20)],
            [("Smash to Smithereens", 2)],
        )
    }

    #[test]
    fn counts_per_zone() {
        let deck = burn();
        let bolt = CardName::from("lightning bolt");
        let smash = CardName::from("Smash to Smithereens");
        assert_eq!(deck.count(Zone::Mainboard, &bolt), 4);
        assert_eq!(deck.count(Zone::Sideboard, &bolt), 0);
        assert_eq!(deck.count(Zone::MainOrSideboard, &smash), 2);
        assert!(deck.contains(Zone::MainOrSideboard, &smash));
        assert!(!deck.contains(Zone::Mainboard, &smash));
    }

    #[test]
    fn zero_counts_are_absent() {
        let deck = Deck::from_lists([("Lightning Bolt", 0)], []);
        assert!(deck.is_empty());
        assert!(!deck.contains(Zone::Mainboard, &CardName::from("Lightning Bolt")));
    }

    #[test]
    fn duplicate_lines_are_summed() {
        let deck = Deck::from_lists([("Mountain", 10), ("mountain", 8)], []);
        assert_eq!(deck.count(Zone::Mainboard, &CardName::from("Mountain")), 18);
    }

    #[test]
    fn decklist_wire_format() {
        let list = DeckList::from_json(
            r#"{"Mainboard":[{"Name":"Lightning Bolt","Count":4}],"Sideboard":[]}"#,
        )
        .unwrap();
        let deck = Deck::from(&list);
        assert_eq!(deck.count(Zone::Mainboard, &CardName::from("Lightning Bolt")), 4);
    }

    #[test]
    fn oversized_counts_saturate() {
        let list = DeckList::from_json(
            r#"{"Mainboard":[{"Name":"Mountain","Count":4294967295},{"Name":"Mountain","Count":1}]}"#,
        )
        .unwrap();
        let deck = Deck::from(&list);
        let mountain = CardName::from("Mountain");
        assert_eq!(deck.count(Zone::Mainboard, &mountain), u32::MAX);

        let deck = Deck::from_lists([("Mountain", u32::MAX)], [("Mountain", 1)]);
        assert_eq!(deck.count(Zone::MainOrSideboard, &mountain), u32::MAX);
        assert_eq!(deck.count(Zone::Sideboard, &mountain), 1);
    }

    #[test]
    fn sideboard_is_optional_and_bad_json_is_an_error() {
        let list = DeckList::from_json(r#"{"Mainboard":[{"Name":"Opt","Count":4}]}"#).unwrap();
        assert!(list.sideboard.is_empty());
        assert!(matches!(
            DeckList::from_json("{ nope"),
            Err(crate::MetagameError::Serialize(_))
        ));
    }
}
