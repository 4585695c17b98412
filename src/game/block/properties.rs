//! Per-block properties: mass, collision, and what a block does on a ship.
//!
//! [`PropertyLookup`] is the seam the builder and detector consume.
//! [`BlockConfig`] is the shipped implementation, loaded from an ordered JSON
//! list such as:
//!
//! ```json
//! [
//!   { "pattern": "oak_planks", "mass": 2 },
//!   { "pattern": "white_wool", "mass": null },
//!   { "pattern": "*_slab", "mass": 1,
//!     "collider": { "size": 0.5, "offset": [0.0, -0.25, 0.0] },
//!     "rules": [ { "when": { "type": "double" }, "collider": true, "seat": false } ],
//!     "seat": true },
//!   { "pattern": "chest", "mass": 2, "storage": { "type": "chest", "name": "Cargo" } }
//! ]
//! ```
//!
//! A missing `mass` means zero, an explicit `null` means the block carries no
//! mass at all and is left out of density math.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use super::state::BlockState;
use crate::game::config::ConfigError;

const BUILTIN_BLOCKS: &str = include_str!("../../../config/blocks.json");

/// Collision volume of one cell, centered on the cell plus `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    pub enabled: bool,
    pub size: f32,
    pub offset: Vec3,
}

impl CollisionConfig {
    pub const FULL: CollisionConfig = CollisionConfig {
        enabled: true,
        size: 1.0,
        offset: Vec3::ZERO,
    };

    pub const NONE: CollisionConfig = CollisionConfig {
        enabled: false,
        size: 0.0,
        offset: Vec3::ZERO,
    };
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self::FULL
    }
}

/// Container layout of a storage block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Chest,
    DoubleChest,
    Dropper,
    Hopper,
    Furnace,
}

impl StorageKind {
    pub const fn slots(self) -> u32 {
        match self {
            StorageKind::Chest => 27,
            StorageKind::DoubleChest => 54,
            StorageKind::Dropper => 9,
            StorageKind::Hopper => 5,
            StorageKind::Furnace => 3,
        }
    }
}

/// Storage descriptor recorded on a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub kind: StorageKind,
    pub name: String,
}

impl StorageConfig {
    pub fn new(kind: StorageKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Descriptor used for container blocks the property table does not describe.
pub fn fallback_storage(material: &str) -> Option<StorageConfig> {
    let storage = match material {
        "chest" | "trapped_chest" => StorageConfig::new(StorageKind::Chest, "Ship Chest"),
        "barrel" => StorageConfig::new(StorageKind::Chest, "Ship Barrel"),
        "furnace" | "blast_furnace" | "smoker" => StorageConfig::new(StorageKind::Furnace, "Ship Furnace"),
        "hopper" => StorageConfig::new(StorageKind::Hopper, "Ship Hopper"),
        "dropper" | "dispenser" => StorageConfig::new(StorageKind::Dropper, "Ship Dropper"),
        _ => return None,
    };
    Some(storage)
}

/// Everything the ship code needs to know about one block state.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockProperties {
    /// May be part of a ship at all
    pub allowed: bool,
    /// `None` keeps the block out of mass, density and center-of-volume sums
    pub mass: Option<i32>,
    pub collision: CollisionConfig,
    pub seat: bool,
    pub storage: Option<StorageConfig>,
    pub interaction: bool,
    pub leashable: bool,
    /// Needs its horizontal facing recorded for display
    pub display_rotation: bool,
}

impl BlockProperties {
    /// Properties of a block nothing is known about.
    pub fn unknown() -> Self {
        Self {
            allowed: false,
            mass: None,
            collision: CollisionConfig::NONE,
            seat: false,
            storage: None,
            interaction: false,
            leashable: false,
            display_rotation: false,
        }
    }

    /// A plain solid block of the given mass.
    pub fn solid(mass: i32) -> Self {
        Self {
            allowed: true,
            mass: Some(mass),
            collision: CollisionConfig::FULL,
            ..Self::unknown()
        }
    }
}

/// Source of per-block properties.
pub trait PropertyLookup {
    fn properties_of(&self, state: &BlockState) -> BlockProperties;

    fn is_allowed(&self, material: &str) -> bool {
        self.properties_of(&BlockState::new(material)).allowed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum ColliderSpec {
    Toggle(bool),
    Box {
        size: f32,
        #[serde(default)]
        offset: Vec3,
    },
}

impl ColliderSpec {
    fn resolve(&self) -> CollisionConfig {
        match *self {
            ColliderSpec::Toggle(true) => CollisionConfig::FULL,
            ColliderSpec::Toggle(false) => CollisionConfig::NONE,
            ColliderSpec::Box { size, offset } => CollisionConfig {
                enabled: true,
                size,
                offset,
            },
        }
    }
}

/// Override applied when every `when` property matches the block state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRule {
    pub when: BTreeMap<String, String>,
    #[serde(default)]
    collider: Option<ColliderSpec>,
    #[serde(default)]
    pub seat: Option<bool>,
}

impl BlockRule {
    fn matches(&self, state: &BlockState) -> bool {
        self.when
            .iter()
            .all(|(key, value)| state.property(key).as_deref() == Some(value.as_str()))
    }
}

fn zero_mass() -> Option<i32> {
    Some(0)
}

fn nullable_mass<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    Option::<i32>::deserialize(deserializer)
}

fn default_true() -> bool {
    true
}

/// One entry of the block table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// Exact material name, or a pattern with `*` wildcards
    pub pattern: String,
    #[serde(default = "default_true")]
    pub allowed: bool,
    #[serde(default = "zero_mass", deserialize_with = "nullable_mass")]
    pub mass: Option<i32>,
    #[serde(default)]
    collider: Option<ColliderSpec>,
    #[serde(default)]
    pub seat: bool,
    #[serde(default)]
    pub storage: Option<StorageConfig>,
    #[serde(default)]
    pub interaction: bool,
    #[serde(default)]
    pub leashable: bool,
    #[serde(default)]
    pub display_rotation: bool,
    #[serde(default)]
    pub rules: Vec<BlockRule>,
}

impl BlockEntry {
    fn properties_for(&self, state: &BlockState) -> BlockProperties {
        let mut collision = self
            .collider
            .as_ref()
            .map_or(CollisionConfig::FULL, ColliderSpec::resolve);
        let mut seat = self.seat;
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(state)) {
            if let Some(spec) = &rule.collider {
                collision = spec.resolve();
            }
            if let Some(rule_seat) = rule.seat {
                seat = rule_seat;
            }
        }
        BlockProperties {
            allowed: self.allowed,
            mass: self.mass,
            collision,
            seat,
            storage: self.storage.clone(),
            interaction: self.interaction,
            leashable: self.leashable,
            display_rotation: self.display_rotation,
        }
    }
}

/// Glob match where `*` stands for any run of characters.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return false;
    };
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        // no `*` at all
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(at) => rest = &rest[at + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

/// Block property table.
///
/// Exact names take priority over patterns; among patterns the first listed
/// wins. Unlisted blocks are not allowed on ships.
#[derive(Debug, Clone, Default)]
pub struct BlockConfig {
    exact: BTreeMap<String, BlockEntry>,
    patterns: Vec<BlockEntry>,
}

impl BlockConfig {
    pub fn from_entries(entries: Vec<BlockEntry>) -> Self {
        let mut config = Self::default();
        for entry in entries {
            if entry.pattern.contains('*') {
                config.patterns.push(entry);
            } else if config.exact.contains_key(&entry.pattern) {
                debug!(pattern = %entry.pattern, "duplicate block entry ignored");
            } else {
                config.exact.insert(entry.pattern.clone(), entry);
            }
        }
        config
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let entries: Vec<BlockEntry> = serde_json::from_str(json)?;
        if let Some(bad) = entries.iter().find(|e| e.pattern.is_empty()) {
            return Err(ConfigError::Invalid(format!("empty block pattern in entry {bad:?}")));
        }
        Ok(Self::from_entries(entries))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        info!(path = %path.display(), entries = config.len(), "loaded block config");
        Ok(config)
    }

    /// The table bundled with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_BLOCKS)
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry_for(&self, material: &str) -> Option<&BlockEntry> {
        self.exact.get(material).or_else(|| {
            self.patterns
                .iter()
                .find(|entry| wildcard_match(&entry.pattern, material))
        })
    }
}

impl PropertyLookup for BlockConfig {
    fn properties_of(&self, state: &BlockState) -> BlockProperties {
        match self.entry_for(state.material()) {
            Some(entry) => entry.properties_for(state),
            None => BlockProperties::unknown(),
        }
    }

    fn is_allowed(&self, material: &str) -> bool {
        self.entry_for(material).is_some_and(|entry| entry.allowed)
    }
}
