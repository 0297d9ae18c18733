//! In-memory rule model shared by the loader, evaluator and classifier.

mod condition;
mod definition;
mod format;
mod snapshot;

pub use condition::Condition;
pub use definition::{ArchetypeDefinition, FallbackDefinition, Variant};
pub use format::Format;
pub use snapshot::{RuleSet, RuleSnapshot};
