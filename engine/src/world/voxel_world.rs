//! In-memory voxel world
//!
//! Cells live in 16x16x16 chunks keyed by chunk coordinate; tile data
//! (inventories, skull textures, banner layers, leashes) lives in side tables
//! keyed by absolute position. Every mutation is appended to a journal so
//! callers can see exactly what was written, and in which order.

use std::collections::HashMap;

use glam::IVec3;
use tracing::trace;

use super::access::{BannerPattern, ContainerSnapshot, StoredItem, WorldAccess, WorldError};
use crate::game::block::{BlockState, fallback_storage};

pub const CHUNK_EDGE_I32: i32 = 16;
const CHUNK_CELL_COUNT: usize = (CHUNK_EDGE_I32 as usize).pow(3);

/// One recorded world mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldOp {
    Set { pos: IVec3, state: String },
    Clear { pos: IVec3, notify: bool },
    CommitContainer { pos: IVec3 },
    SetProfileTexture { pos: IVec3 },
    SetBannerPatterns { pos: IVec3 },
}

impl WorldOp {
    pub fn pos(&self) -> IVec3 {
        match *self {
            WorldOp::Set { pos, .. }
            | WorldOp::Clear { pos, .. }
            | WorldOp::CommitContainer { pos }
            | WorldOp::SetProfileTexture { pos }
            | WorldOp::SetBannerPatterns { pos } => pos,
        }
    }
}

#[derive(Clone)]
struct VoxelChunk {
    cells: Vec<Option<BlockState>>,
    occupied: usize,
}

impl Default for VoxelChunk {
    fn default() -> Self {
        Self {
            cells: vec![None; CHUNK_CELL_COUNT],
            occupied: 0,
        }
    }
}

impl VoxelChunk {
    fn local_index(local: IVec3) -> Option<usize> {
        if local.cmplt(IVec3::ZERO).any() || local.cmpge(IVec3::splat(CHUNK_EDGE_I32)).any() {
            return None;
        }
        let edge = CHUNK_EDGE_I32 as usize;
        Some(local.x as usize + local.y as usize * edge + local.z as usize * edge * edge)
    }

    fn get(&self, local: IVec3) -> Option<&BlockState> {
        let idx = Self::local_index(local)?;
        self.cells.get(idx)?.as_ref()
    }

    fn set(&mut self, local: IVec3, state: BlockState) -> Option<BlockState> {
        let idx = Self::local_index(local)?;
        let previous = self.cells[idx].replace(state);
        if previous.is_none() {
            self.occupied += 1;
        }
        previous
    }

    fn remove(&mut self, local: IVec3) -> Option<BlockState> {
        let idx = Self::local_index(local)?;
        let removed = self.cells[idx].take();
        if removed.is_some() {
            self.occupied -= 1;
        }
        removed
    }
}

#[derive(Debug, Clone, Default)]
struct Inventory {
    capacity: u32,
    revision: u64,
    items: Vec<StoredItem>,
}

fn is_skull(material: &str) -> bool {
    material.ends_with("_head") || material.ends_with("_skull")
}

fn is_banner(material: &str) -> bool {
    material.ends_with("_banner")
}

#[derive(Default)]
pub struct VoxelWorld {
    chunks: HashMap<IVec3, VoxelChunk>,
    inventories: HashMap<IVec3, Inventory>,
    profiles: HashMap<IVec3, String>,
    banners: HashMap<IVec3, Vec<BannerPattern>>,
    leashes: HashMap<IVec3, Vec<String>>,
    journal: Vec<WorldOp>,
}

impl VoxelWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voxel_to_chunk_local(pos: IVec3) -> (IVec3, IVec3) {
        let chunk = pos.div_euclid(IVec3::splat(CHUNK_EDGE_I32));
        let local = pos.rem_euclid(IVec3::splat(CHUNK_EDGE_I32));
        (chunk, local)
    }

    pub fn get(&self, pos: IVec3) -> Option<&BlockState> {
        let (chunk_key, local) = Self::voxel_to_chunk_local(pos);
        self.chunks.get(&chunk_key)?.get(local)
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.chunks.values().map(|c| c.occupied).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attaches a leashed entity to the block at `pos`.
    pub fn attach_leash(&mut self, pos: IVec3, entity_id: impl Into<String>) {
        self.leashes.entry(pos).or_default().push(entity_id.into());
    }

    pub fn journal(&self) -> &[WorldOp] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Position of the first journal entry touching `pos`.
    pub fn journal_index_of(&self, pos: IVec3) -> Option<usize> {
        self.journal.iter().position(|op| op.pos() == pos)
    }

    fn drop_tiles(&mut self, pos: IVec3) {
        self.inventories.remove(&pos);
        self.profiles.remove(&pos);
        self.banners.remove(&pos);
        self.leashes.remove(&pos);
    }
}

impl WorldAccess for VoxelWorld {
    fn block_at(&self, pos: IVec3) -> BlockState {
        self.get(pos).cloned().unwrap_or_else(BlockState::air)
    }

    fn set_block(&mut self, pos: IVec3, state: BlockState) {
        trace!(?pos, %state, "set block");
        self.journal.push(WorldOp::Set {
            pos,
            state: state.to_canonical_string(),
        });

        let material = state.material().to_string();
        let (chunk_key, local) = Self::voxel_to_chunk_local(pos);
        let previous = self.chunks.entry(chunk_key).or_default().set(local, state);
        if previous.as_ref().map(BlockState::material) != Some(material.as_str()) {
            self.drop_tiles(pos);
            if let Some(storage) = fallback_storage(&material) {
                self.inventories.insert(
                    pos,
                    Inventory {
                        capacity: storage.kind.slots(),
                        ..Inventory::default()
                    },
                );
            }
        }
    }

    fn clear_block(&mut self, pos: IVec3, notify_neighbors: bool) {
        trace!(?pos, notify_neighbors, "clear block");
        self.journal.push(WorldOp::Clear {
            pos,
            notify: notify_neighbors,
        });
        let (chunk_key, local) = Self::voxel_to_chunk_local(pos);
        if let Some(chunk) = self.chunks.get_mut(&chunk_key) {
            chunk.remove(local);
        }
        self.drop_tiles(pos);
    }

    fn container_contents(&self, pos: IVec3) -> Option<Vec<StoredItem>> {
        self.inventories.get(&pos).map(|inv| inv.items.clone())
    }

    fn container_snapshot(&self, pos: IVec3) -> Option<ContainerSnapshot> {
        let inv = self.inventories.get(&pos)?;
        Some(ContainerSnapshot::new(pos, inv.revision, inv.capacity, inv.items.clone()))
    }

    fn commit_container(&mut self, snapshot: ContainerSnapshot) -> Result<(), WorldError> {
        let pos = snapshot.pos();
        let inv = self
            .inventories
            .get_mut(&pos)
            .ok_or(WorldError::NotAContainer(pos))?;
        if inv.revision != snapshot.revision() {
            return Err(WorldError::StaleSnapshot(pos));
        }
        inv.items = snapshot.items().to_vec();
        inv.revision += 1;
        self.journal.push(WorldOp::CommitContainer { pos });
        Ok(())
    }

    fn profile_texture(&self, pos: IVec3) -> Option<String> {
        self.profiles.get(&pos).cloned()
    }

    fn set_profile_texture(&mut self, pos: IVec3, texture: &str) -> Result<(), WorldError> {
        if !self.get(pos).is_some_and(|s| is_skull(s.material())) {
            return Err(WorldError::WrongTile { pos, what: "a profile texture" });
        }
        self.profiles.insert(pos, texture.to_string());
        self.journal.push(WorldOp::SetProfileTexture { pos });
        Ok(())
    }

    fn banner_patterns(&self, pos: IVec3) -> Option<Vec<BannerPattern>> {
        self.banners.get(&pos).cloned()
    }

    fn set_banner_patterns(&mut self, pos: IVec3, patterns: &[BannerPattern]) -> Result<(), WorldError> {
        if !self.get(pos).is_some_and(|s| is_banner(s.material())) {
            return Err(WorldError::WrongTile { pos, what: "banner patterns" });
        }
        self.banners.insert(pos, patterns.to_vec());
        self.journal.push(WorldOp::SetBannerPatterns { pos });
        Ok(())
    }

    fn leashed_entities(&self, pos: IVec3) -> Vec<String> {
        self.leashes.get(&pos).cloned().unwrap_or_default()
    }
}
