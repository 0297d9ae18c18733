//! Filesystem rule loader.
//!
//! A rule repository holds one directory per format, each with an
//! `Archetypes/` and a `Fallbacks/` tree of JSON or YAML rule files:
//!
//! ```text
//! <repo>/Modern/Archetypes/Burn.json
//! <repo>/Modern/Fallbacks/Izzet.json
//! ```
//!
//! Loading is per format and never fails as a whole: unreadable or
//! malformed files are logged and reported, and the rest still load.

mod core;
mod error;


pub use self::core::{RuleLoader, RULE_EXTENSIONS};
pub(crate) use self::core::{is_format_dir, is_hidden, is_kind_dir_name};
pub use self::error::{LoadReport, LoadResult, LoadStatus, Result, RuleError};
