//! Case-insensitive format identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A play format (`modern`, `legacy`, ...), compared case-insensitively.
///
/// The identifier is stored lowercased, so `Format::from("Modern")` and
/// `Format::from("MODERN")` are equal and hash the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Format(String);

impl Format {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a directory or file name refers to this format.
    pub fn matches(&self, name: &str) -> bool {
        name.trim().to_lowercase() == self.0
    }
}

impl From<&str> for Format {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Format {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.0
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
