//! Archetype and fallback documents as written on disk.

use serde::{Deserialize, Serialize};

use crate::model::{ArchetypeDefinition, FallbackDefinition, Variant};

use super::condition::{normalize_cards, ConditionSpec};

/// One file under `<format>/Archetypes/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchetypeFile {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "IncludeColorInName", default)]
    pub include_color_in_name: bool,
    #[serde(rename = "Conditions", default)]
    pub conditions: Vec<ConditionSpec>,
    #[serde(rename = "Variants", default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantFile>,
}

/// A named variant nested inside an [`ArchetypeFile`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantFile {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Conditions", default)]
    pub conditions: Vec<ConditionSpec>,
}

/// One file under `<format>/Fallbacks/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackFile {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "IncludeColorInName", default)]
    pub include_color_in_name: bool,
    #[serde(rename = "CommonCards", default)]
    pub common_cards: Vec<String>,
}

impl ArchetypeFile {
    /// Validate the document and build the immutable definition.
    ///
    /// An archetype must have at least one condition.
    pub fn to_definition(&self) -> std::result::Result<ArchetypeDefinition, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("archetype Name must not be empty".to_string());
        }
        if self.conditions.is_empty() {
            return Err(format!("archetype '{}' has no Conditions", name));
        }
        let conditions = self
            .conditions
            .iter()
            .map(ConditionSpec::to_condition)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| format!("archetype '{}': {}", name, e))?;

        let mut variants = Vec::with_capacity(self.variants.len());
        for variant in &self.variants {
            let variant_name = variant.name.trim();
            if variant_name.is_empty() {
                return Err(format!("archetype '{}' has a variant with an empty Name", name));
            }
            let conditions = variant
                .conditions
                .iter()
                .map(ConditionSpec::to_condition)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| format!("archetype '{}' variant '{}': {}", name, variant_name, e))?;
            variants.push(Variant {
                name: variant_name.to_string(),
                conditions,
            });
        }

        Ok(ArchetypeDefinition {
            name: name.to_string(),
            include_color_in_name: self.include_color_in_name,
            conditions,
            variants,
        })
    }
}

impl FallbackFile {
    pub fn to_definition(&self) -> std::result::Result<FallbackDefinition, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("fallback Name must not be empty".to_string());
        }
        let common_cards = normalize_cards(&self.common_cards);
        if common_cards.is_empty() {
            return Err(format!("fallback '{}' has no CommonCards", name));
        }
        Ok(FallbackDefinition {
            name: name.to_string(),
            include_color_in_name: self.include_color_in_name,
            common_cards,
        })
    }
}
