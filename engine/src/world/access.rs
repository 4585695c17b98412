//! World cell access
//!
//! The ship code never owns the world; it reads and writes cells through
//! [`WorldAccess`]. Tile data that a block state string cannot carry
//! (container inventories, skull textures, banner patterns) goes through the
//! same trait.
//!
//! Containers follow a fetch, modify, commit protocol: a
//! [`ContainerSnapshot`] taken with `container_snapshot` must be committed
//! before the next fetch of the same container, otherwise the commit is
//! rejected as stale and its contents are lost.

use glam::IVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::block::BlockState;

/// One occupied inventory slot. `item` is an opaque serialized item stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoredItem {
    pub slot: u32,
    pub item: String,
}

impl StoredItem {
    pub fn new(slot: u32, item: impl Into<String>) -> Self {
        Self {
            slot,
            item: item.into(),
        }
    }
}

/// One layer of a banner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BannerPattern {
    pub color: String,
    pub pattern: String,
}

impl BannerPattern {
    pub fn new(color: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("no container at {0}")]
    NotAContainer(IVec3),
    #[error("container at {0} changed since the snapshot was taken")]
    StaleSnapshot(IVec3),
    #[error("slot {slot} is outside a container of {capacity} slots")]
    SlotOutOfRange { slot: u32, capacity: u32 },
    #[error("empty item in slot {0}")]
    EmptyItem(u32),
    #[error("block at {pos} does not hold {what}")]
    WrongTile { pos: IVec3, what: &'static str },
}

/// Detached copy of a container's inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSnapshot {
    pos: IVec3,
    revision: u64,
    capacity: u32,
    items: Vec<StoredItem>,
}

impl ContainerSnapshot {
    pub fn new(pos: IVec3, revision: u64, capacity: u32, items: Vec<StoredItem>) -> Self {
        Self {
            pos,
            revision,
            capacity,
            items,
        }
    }

    pub fn pos(&self) -> IVec3 {
        self.pos
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn items(&self) -> &[StoredItem] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Puts `item` into its slot, replacing whatever was there.
    pub fn set(&mut self, item: StoredItem) -> Result<(), WorldError> {
        if item.slot >= self.capacity {
            return Err(WorldError::SlotOutOfRange {
                slot: item.slot,
                capacity: self.capacity,
            });
        }
        if item.item.trim().is_empty() {
            return Err(WorldError::EmptyItem(item.slot));
        }
        self.items.retain(|existing| existing.slot != item.slot);
        self.items.push(item);
        self.items.sort_by_key(|i| i.slot);
        Ok(())
    }
}

/// Read/write access to world cells at absolute positions.
pub trait WorldAccess {
    /// State at `pos`; air when empty.
    fn block_at(&self, pos: IVec3) -> BlockState;

    fn set_block(&mut self, pos: IVec3, state: BlockState);

    /// Empties the cell. With `notify_neighbors` false, neighbours do not
    /// react (no drops, no physics updates).
    fn clear_block(&mut self, pos: IVec3, notify_neighbors: bool);

    /// Occupied slots of the container at `pos`, `None` if it is not one.
    fn container_contents(&self, pos: IVec3) -> Option<Vec<StoredItem>>;

    fn container_snapshot(&self, pos: IVec3) -> Option<ContainerSnapshot>;

    fn commit_container(&mut self, snapshot: ContainerSnapshot) -> Result<(), WorldError>;

    fn profile_texture(&self, pos: IVec3) -> Option<String>;

    fn set_profile_texture(&mut self, pos: IVec3, texture: &str) -> Result<(), WorldError>;

    fn banner_patterns(&self, pos: IVec3) -> Option<Vec<BannerPattern>>;

    fn set_banner_patterns(&mut self, pos: IVec3, patterns: &[BannerPattern]) -> Result<(), WorldError>;

    /// Ids of entities leashed to the block at `pos`.
    fn leashed_entities(&self, pos: IVec3) -> Vec<String>;
}
