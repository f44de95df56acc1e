//! Loot table rows and simulation results.
//!
//! Field names follow the `creature_loot_template` columns so rows exported
//! straight from the world database deserialize without renaming.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::common::error::{LootError, LootResult};

fn default_count() -> u32 {
    1
}

fn default_loot_mode() -> u16 {
    1
}

/// MySQL reports tinyint flags as integers; hand-written JSON tends to use booleans.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

/// A single loot table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    #[serde(rename = "Item", alias = "item")]
    pub item: u32,
    /// Drop chance as a percentage in `[0, 100]`.
    #[serde(rename = "Chance", alias = "chance")]
    pub chance: f64,
    #[serde(rename = "MinCount", alias = "min_count", default = "default_count")]
    pub min_count: u32,
    #[serde(rename = "MaxCount", alias = "max_count", default = "default_count")]
    pub max_count: u32,
    /// `0` rolls independently; any other value is a one-winner group.
    #[serde(rename = "GroupId", alias = "group_id", default)]
    pub group_id: u32,
    /// Non-zero points into `reference_loot_template`.
    #[serde(rename = "Reference", alias = "reference", default)]
    pub reference: u32,
    #[serde(
        rename = "QuestRequired",
        alias = "quest_required",
        default,
        deserialize_with = "flag"
    )]
    pub quest_required: bool,
    #[serde(rename = "LootMode", alias = "loot_mode", default = "default_loot_mode")]
    pub loot_mode: u16,
    /// Item name joined from `item_template`, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Quality", alias = "quality", default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

impl LootEntry {
    /// Create an ungrouped, non-reference entry.
    pub fn new(item: u32, chance: f64, min_count: u32, max_count: u32) -> Self {
        Self {
            item,
            chance,
            min_count,
            max_count,
            group_id: 0,
            reference: 0,
            quest_required: false,
            loot_mode: default_loot_mode(),
            name: None,
            quality: None,
        }
    }

    /// Place the entry in a one-winner group.
    pub fn in_group(mut self, group_id: u32) -> Self {
        self.group_id = group_id;
        self
    }

    /// Turn the entry into a reference to another loot table.
    pub fn with_reference(mut self, reference: u32) -> Self {
        self.reference = reference;
        self
    }

    #[cfg(test)]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reject rows that cannot be rolled meaningfully.
    pub fn validate(&self) -> LootResult<()> {
        if !self.chance.is_finite() || !(0.0..=100.0).contains(&self.chance) {
            return Err(LootError::InvalidEntry {
                item: self.item,
                reason: format!("chance {} is outside 0-100", self.chance),
            });
        }
        if self.min_count > self.max_count {
            return Err(LootError::InvalidEntry {
                item: self.item,
                reason: format!(
                    "min count {} exceeds max count {}",
                    self.min_count, self.max_count
                ),
            });
        }
        Ok(())
    }

    pub fn is_reference(&self) -> bool {
        self.reference != 0
    }

    pub fn is_independent(&self) -> bool {
        self.group_id == 0 && !self.is_reference()
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id > 0 && !self.is_reference()
    }

    /// Name for display, falling back to the item id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Item {}", self.item))
    }
}

/// One item dropped by a simulated kill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropResult {
    /// Index of the source row in the rolled entries.
    pub row: usize,
    pub item: u32,
    pub chance: f64,
    pub group_id: u32,
    pub name: Option<String>,
    pub quality: Option<u8>,
    pub dropped_count: u32,
}

impl DropResult {
    pub fn from_entry(row: usize, entry: &LootEntry, dropped_count: u32) -> Self {
        Self {
            row,
            item: entry.item,
            chance: entry.chance,
            group_id: entry.group_id,
            name: entry.name.clone(),
            quality: entry.quality,
            dropped_count,
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Item {}", self.item))
    }
}

/// All rows sharing one loot id (`creature_template.lootid`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub entry: u32,
    #[serde(default)]
    pub entries: Vec<LootEntry>,
}

impl LootTable {
    pub fn new(entry: u32, entries: Vec<LootEntry>) -> Self {
        Self { entry, entries }
    }

    /// Entries that point at reference tables and are not rolled locally.
    pub fn references(&self) -> impl Iterator<Item = &LootEntry> {
        self.entries.iter().filter(|e| e.is_reference())
    }
}

/// Load a loot table from a JSON file.
pub fn load_table(path: impl AsRef<Path>) -> LootResult<LootTable> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| LootError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_table(&content).map_err(|e| LootError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse a loot table from a JSON string.
pub fn parse_table(content: &str) -> Result<LootTable, serde_json::Error> {
    serde_json::from_str(content)
}
