//! Rule file schema with serde deserialization.
//!
//! Rule files are PascalCase JSON (or YAML with the same keys):
//! - `ArchetypeFile`: name, color flag, conditions and variants
//! - `FallbackFile`: name, color flag and common cards
//! - `ConditionSpec`: a `Type` string plus `Cards` or nested `Conditions`
//!
//! Each document converts into the immutable [`crate::model`] types,
//! reporting structural problems as a message string.

mod condition;
mod kind;
mod rule_file;

pub use condition::*;
pub use kind::*;
pub use rule_file::*;
