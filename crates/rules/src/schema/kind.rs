//! Rule kind, decided by the directory a rule file lives in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which directory of a format a rule file was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Archetype,
    Fallback,
}

impl RuleKind {
    /// Directory name under the format directory, matched case-insensitively.
    pub fn dir_name(self) -> &'static str {
        match self {
            RuleKind::Archetype => "Archetypes",
            RuleKind::Fallback => "Fallbacks",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Archetype => write!(f, "Archetype"),
            RuleKind::Fallback => write!(f, "Fallback"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "archetype" | "archetypes" => Ok(RuleKind::Archetype),
            "fallback" | "fallbacks" => Ok(RuleKind::Fallback),
            other => Err(format!("unknown rule kind: '{}'", other)),
        }
    }
}
