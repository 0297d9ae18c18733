use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized card name, the matching key for every rule.
///
/// Normalization lowercases, keeps letters and digits, and collapses every
/// run of other characters into a single space. `"Lightning Bolt"`,
/// `"lightning  bolt"` and `"Lightning-Bolt"` all produce `"lightning bolt"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CardName(String);

impl CardName {
    pub fn normalize(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        let mut pending_space = false;
        for ch in raw.chars() {
            if ch.is_alphanumeric() {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.extend(ch.to_lowercase());
            } else if ch == '\'' || ch == '\u{2019}' {
                // Apostrophes join rather than split: "Urza's" → "urzas".
            } else {
                pending_space = true;
            }
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for CardName {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<&str> for CardName {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl From<CardName> for String {
    fn from(name: CardName) -> Self {
        name.0
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The deck zone(s) a condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Mainboard,
    Sideboard,
    MainOrSideboard,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Mainboard => write!(f, "Mainboard"),
            Zone::Sideboard => write!(f, "Sideboard"),
            Zone::MainOrSideboard => write!(f, "MainOrSideboard"),
        }
    }
}
