//! Card color lookup used for `IncludeColorInName` naming.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use metagame_core::{CardName, Colors, Result};

/// Resolves a card's colors. Implemented by whatever card database the host
/// process has; unknown cards return `None` and contribute no color.
pub trait CardColors: Send + Sync {
    fn colors(&self, card: &CardName) -> Option<Colors>;
}

/// In-memory [`CardColors`] table.
#[derive(Debug, Clone, Default)]
pub struct StaticCardColors {
    table: HashMap<CardName, Colors>,
}

impl StaticCardColors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, card: &str, colors: Colors) {
        self.table.insert(CardName::normalize(card), colors);
    }

    /// Builder-style insert taking WUBRG symbols; invalid symbols are ignored.
    pub fn with(mut self, card: &str, symbols: &str) -> Self {
        if let Ok(colors) = symbols.parse::<Colors>() {
            self.insert(card, colors);
        }
        self
    }

    /// Parse a `{"Card Name": "UR", ...}` table. Unlike [`with`](Self::with),
    /// an invalid color symbol is an error.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for (card, symbols) in raw {
            table.insert(&card, symbols.parse::<Colors>()?);
        }
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl CardColors for StaticCardColors {
    fn colors(&self, card: &CardName) -> Option<Colors> {
        self.table.get(card).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagame_core::MetagameError;

    #[test]
    fn json_table_normalizes_names() {
        let table = StaticCardColors::from_json(
            r#"{ "Lightning Bolt": "R", "Expressive Iteration": "UR", "Ornithopter": "" }"#,
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.colors(&CardName::from("lightning bolt")), "R".parse().ok());
        assert_eq!(table.colors(&CardName::from("Expressive Iteration")).map(|c| c.name()), Some("Izzet"));
        assert_eq!(table.colors(&CardName::from("Ornithopter")).map(|c| c.name()), Some("Colorless"));
        assert_eq!(table.colors(&CardName::from("Opt")), None);
    }

    #[test]
    fn json_table_rejects_bad_symbols_and_bad_json() {
        assert!(matches!(
            StaticCardColors::from_json(r#"{ "Opt": "UX" }"#),
            Err(MetagameError::InvalidColor('X'))
        ));
        assert!(matches!(
            StaticCardColors::from_json("[1, 2]"),
            Err(MetagameError::Serialize(_))
        ));
    }
}
