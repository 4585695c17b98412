//! Assembled ship model.
//!
//! Cells are stored in an arena; seats, cannons and colliders refer to them
//! by index, so a model survives serialization without fix-ups. A model is
//! built once by [`super::builder::build_model`] and stays read-only apart
//! from refreshing container contents right before it is placed back.

use std::collections::{BTreeMap, HashSet};

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::block::{BlockFace, BlockState, CollisionConfig, StorageConfig};
use crate::game::config::ShipConfig;
use crate::physics::buoyancy::{BuoyancyEstimate, BuoyancyInput, estimate_buoyancy};
use crate::physics::collision::{Aabb, ColliderSet};
use crate::physics::rotation::{rotate_offset, rotate_position, yaw_delta};
use crate::world::StoredItem;

/// Keys of [`ModelPart::extra`].
pub mod extra_keys {
    pub const BLOCK: &str = "block";
    pub const BLOCKDATA: &str = "blockdata";
    pub const INTERACTION: &str = "interaction";
    pub const LEADABLE: &str = "leadable";
    pub const LEASHED_ENTITY_UUIDS: &str = "leashed_entity_uuids";
    pub const DISPLAY_YAW: &str = "display_yaw";
    pub const CONTAINER_ITEMS: &str = "container_items";
    pub const STORAGE: &str = "storage";
    pub const SKULL_PROFILE: &str = "skull_profile";
    pub const SKULL_ROTATION: &str = "skull_rotation";
    pub const SKULL_FACING: &str = "skull_facing";
    pub const BANNER_PATTERNS: &str = "banner_patterns";
    pub const BANNER_ROTATION: &str = "banner_rotation";
    pub const BANNER_FACING: &str = "banner_facing";
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("two cells share offset {0}")]
    DuplicateOffset(IVec3),
    #[error("{what} refers to cell {index}, but the model has {len} cells")]
    DanglingIndex { what: &'static str, index: usize, len: usize },
    #[error("model must have exactly one driver seat, at index 0")]
    DriverSeat,
}

/// One captured voxel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPart {
    /// Position relative to the origin cell at assembly time
    pub offset: IVec3,
    pub state: BlockState,
    pub collision: CollisionConfig,
    pub storage: Option<StorageConfig>,
    /// Sparse extras; a key being present means the feature applies
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ModelPart {
    pub fn new(offset: IVec3, state: BlockState) -> Self {
        Self {
            offset,
            state,
            collision: CollisionConfig::FULL,
            storage: None,
            extra: BTreeMap::new(),
        }
    }

    /// Retained canonical state string, if any.
    pub fn blockdata(&self) -> Option<&str> {
        self.extra.get(extra_keys::BLOCKDATA)?.as_str()
    }

    pub fn flag(&self, key: &str) -> bool {
        self.extra.get(key).and_then(serde_json::Value::as_bool).unwrap_or(false)
    }

    /// Stored inventory, `None` when the cell has none recorded.
    pub fn container_items(&self) -> Option<Result<Vec<StoredItem>, serde_json::Error>> {
        let value = self.extra.get(extra_keys::CONTAINER_ITEMS)?;
        Some(Vec::<StoredItem>::deserialize(value))
    }

    /// Absolute position when the model sits at `origin` turned by `yaw_degrees`.
    pub fn world_pos(&self, origin: IVec3, yaw_degrees: f32) -> IVec3 {
        origin + rotate_offset(self.offset, yaw_degrees)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub offset: Vec3,
    pub cell_index: usize,
    pub is_driver: bool,
}

/// A firing cell paired with the anchor directly behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cannon {
    pub firing_cell_index: usize,
    pub anchor_cell_index: usize,
    pub facing: BlockFace,
    pub muzzle_offset: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipModel {
    pub(crate) cells: Vec<ModelPart>,
    pub(crate) seats: Vec<Seat>,
    pub(crate) cannons: Vec<Cannon>,
    pub(crate) assembly_yaw: f32,
    pub(crate) total_mass: i64,
    pub(crate) massed_cell_count: usize,
    pub(crate) center_of_volume: Vec3,
    pub(crate) min_y: i32,
    pub(crate) max_y: i32,
    pub(crate) max_health: f32,
    pub(crate) health_regen_per_second: f32,
    pub(crate) buoyancy_offset: f32,
}

impl ShipModel {
    pub fn cells(&self) -> &[ModelPart] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&ModelPart> {
        self.cells.get(index)
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn driver_seat(&self) -> Option<&Seat> {
        self.seats.first().filter(|seat| seat.is_driver)
    }

    pub fn cannons(&self) -> &[Cannon] {
        &self.cannons
    }

    /// Yaw of the origin facing when the ship was assembled.
    pub fn assembly_yaw(&self) -> f32 {
        self.assembly_yaw
    }

    /// Signed sum over mass-bearing cells.
    pub fn total_mass(&self) -> i64 {
        self.total_mass
    }

    pub fn massed_cell_count(&self) -> usize {
        self.massed_cell_count
    }

    pub fn center_of_volume(&self) -> Vec3 {
        self.center_of_volume
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn health_regen_per_second(&self) -> f32 {
        self.health_regen_per_second
    }

    pub fn buoyancy_offset(&self) -> f32 {
        self.buoyancy_offset
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the cell at `offset`.
    pub fn index_of(&self, offset: IVec3) -> Option<usize> {
        self.cells.iter().position(|cell| cell.offset == offset)
    }

    pub fn buoyancy_input(&self) -> BuoyancyInput {
        BuoyancyInput {
            total_mass: self.total_mass as f64,
            massed_cell_count: self.massed_cell_count,
            center_of_volume_y: self.center_of_volume.y as f64,
            min_y: self.min_y as f64,
        }
    }

    pub fn buoyancy(&self, config: &ShipConfig) -> BuoyancyEstimate {
        estimate_buoyancy(&self.buoyancy_input(), config.air_density, config.water_density)
            .with_fallback(config.fallback_float_offset)
    }

    /// Origin height that puts the ship's waterline on `water_surface_y`.
    pub fn float_target_y(&self, water_surface_y: f32, config: &ShipConfig) -> f32 {
        water_surface_y + self.buoyancy(config).offset
    }

    /// Replaces the recorded inventory of a storage cell.
    ///
    /// Returns false when `index` is out of range or the cell is not storage.
    pub fn refresh_container_items(&mut self, index: usize, items: Vec<StoredItem>) -> bool {
        let Some(cell) = self.cells.get_mut(index) else {
            return false;
        };
        if cell.storage.is_none() && !cell.extra.contains_key(extra_keys::CONTAINER_ITEMS) {
            return false;
        }
        match serde_json::to_value(items) {
            Ok(value) => {
                cell.extra.insert(extra_keys::CONTAINER_ITEMS.to_string(), value);
                true
            }
            Err(_) => false,
        }
    }

    /// Cell colliders in ship-local space for a ship heading `current_yaw`.
    ///
    /// Offsets are turned by the rotation since assembly, matching where
    /// placement would put each cell.
    pub fn colliders(&self, current_yaw: f32) -> ColliderSet {
        let yaw_degrees = yaw_delta(self.assembly_yaw, current_yaw);
        let mut set = ColliderSet::new();
        for (index, cell) in self.cells.iter().enumerate() {
            if !cell.collision.enabled {
                continue;
            }
            let center = rotate_offset(cell.offset, yaw_degrees).as_vec3()
                + rotate_position(cell.collision.offset, yaw_degrees);
            set.push(index, Aabb::cube(center, cell.collision.size));
        }
        set
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a model and checks its cross references.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: ShipModel = serde_json::from_str(json)?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for cell in &self.cells {
            if !seen.insert(cell.offset) {
                return Err(ModelError::DuplicateOffset(cell.offset));
            }
        }
        let len = self.cells.len();
        let in_range = |what, index: usize| {
            if index < len {
                Ok(())
            } else {
                Err(ModelError::DanglingIndex { what, index, len })
            }
        };
        for seat in &self.seats {
            in_range("seat", seat.cell_index)?;
        }
        for cannon in &self.cannons {
            in_range("cannon firing cell", cannon.firing_cell_index)?;
            in_range("cannon anchor", cannon.anchor_cell_index)?;
        }
        let drivers = self.seats.iter().filter(|seat| seat.is_driver).count();
        if drivers != 1 || !self.seats.first().is_some_and(|seat| seat.is_driver) {
            return Err(ModelError::DriverSeat);
        }
        Ok(())
    }
}
