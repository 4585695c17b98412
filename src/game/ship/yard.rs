//! Ship yard: owns assembled ships and the world origins linked to them.
//!
//! An origin belongs to at most one ship at a time; a second assemble at a
//! linked origin is rejected. Disassembly refreshes inventories from the
//! live ship, places the model, and only unlinks once placement succeeded.

use std::collections::{BTreeMap, HashMap};

use glam::{IVec3, Vec3};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::builder::{AssembleError, build_model};
use super::detector::ConnectivityProvider;
use super::model::ShipModel;
use super::placement::{PlacementConflicts, PlacementError, PlacementReport, place_model, remove_model, validate_placement};
use crate::game::block::{BlockFace, PropertyLookup};
use crate::game::config::ShipConfig;
use crate::physics::collision::CellHit;
use crate::physics::rotation::snap_yaw;
use crate::world::{StoredItem, WorldAccess};

pub type ShipId = u64;

#[derive(Debug, Error)]
pub enum YardError {
    #[error("origin {0} is already linked to ship {1}")]
    AlreadyLinked(IVec3, ShipId),
    #[error("no ship with id {0}")]
    UnknownShip(ShipId),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// A ship detached from the world.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledShip {
    pub id: ShipId,
    pub model: ShipModel,
    /// Where the origin cell currently is
    pub origin: IVec3,
    /// Current heading, always a multiple of 90
    pub yaw: f32,
}

impl AssembledShip {
    pub fn facing(&self) -> BlockFace {
        BlockFace::from_yaw(self.yaw)
    }
}

pub struct ShipYard {
    config: ShipConfig,
    ships: BTreeMap<ShipId, AssembledShip>,
    links: HashMap<IVec3, ShipId>,
    next_id: ShipId,
}

impl ShipYard {
    pub fn new(config: ShipConfig) -> Self {
        Self {
            config,
            ships: BTreeMap::new(),
            links: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &ShipConfig {
        &self.config
    }

    pub fn ship(&self, id: ShipId) -> Option<&AssembledShip> {
        self.ships.get(&id)
    }

    pub fn ships(&self) -> impl Iterator<Item = &AssembledShip> {
        self.ships.values()
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn linked_ship(&self, origin: IVec3) -> Option<ShipId> {
        self.links.get(&origin).copied()
    }

    /// Detaches the structure at `origin` from the world.
    pub fn assemble(
        &mut self,
        world: &mut dyn WorldAccess,
        detector: &dyn ConnectivityProvider,
        lookup: &dyn PropertyLookup,
        origin: IVec3,
        facing: BlockFace,
    ) -> Result<ShipId, YardError> {
        if let Some(id) = self.linked_ship(origin) {
            return Err(YardError::AlreadyLinked(origin, id));
        }

        let discovery = detector.discover(world, origin);
        let model = build_model(world, lookup, &discovery, origin, facing, &self.config)?;
        remove_model(world, origin, &model);

        let id = self.next_id;
        self.next_id += 1;
        let yaw = model.assembly_yaw();
        self.ships.insert(id, AssembledShip { id, model, origin, yaw });
        self.links.insert(origin, id);
        info!(id, ?origin, ?facing, "ship assembled");
        Ok(id)
    }

    /// Moves a ship; the heading snaps to the nearest quarter turn.
    pub fn move_ship(&mut self, id: ShipId, new_origin: IVec3, yaw_degrees: f32) -> Result<(), YardError> {
        if !self.ships.contains_key(&id) {
            return Err(YardError::UnknownShip(id));
        }
        if let Some(other) = self.linked_ship(new_origin).filter(|other| *other != id) {
            return Err(YardError::AlreadyLinked(new_origin, other));
        }
        let ship = self.ships.get_mut(&id).ok_or(YardError::UnknownShip(id))?;
        self.links.remove(&ship.origin);
        ship.origin = new_origin;
        ship.yaw = snap_yaw(yaw_degrees);
        self.links.insert(new_origin, id);
        debug!(id, ?new_origin, yaw = ship.yaw, "ship moved");
        Ok(())
    }

    /// Origin height at which the ship floats on water at `water_surface_y`.
    pub fn float_height(&self, id: ShipId, water_surface_y: f32) -> Result<f32, YardError> {
        let ship = self.ships.get(&id).ok_or(YardError::UnknownShip(id))?;
        Ok(ship.model.float_target_y(water_surface_y, &self.config))
    }

    /// Cell of the ship hit by a world-space ray, if any.
    pub fn pick_cell(
        &self,
        id: ShipId,
        ray_origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Result<Option<CellHit>, YardError> {
        let ship = self.ships.get(&id).ok_or(YardError::UnknownShip(id))?;
        let origin = ship.origin.as_vec3();
        let hit = ship
            .model
            .colliders(ship.yaw)
            .ray_cast(ray_origin - origin, direction, max_distance)
            .map(|hit| CellHit {
                position: hit.position + origin,
                ..hit
            });
        Ok(hit)
    }

    /// What would be in the way if the ship were disassembled now.
    pub fn preview_disassembly(&self, world: &dyn WorldAccess, id: ShipId) -> Result<PlacementConflicts, YardError> {
        let ship = self.ships.get(&id).ok_or(YardError::UnknownShip(id))?;
        Ok(validate_placement(world, ship.origin, &ship.model, ship.yaw))
    }

    /// Puts the ship back into the world.
    ///
    /// `live_containers` maps cell index to the current inventory of that
    /// storage cell. The ship stays in the yard when placement is declined.
    pub fn disassemble(
        &mut self,
        world: &mut dyn WorldAccess,
        id: ShipId,
        force: bool,
        live_containers: &BTreeMap<usize, Vec<StoredItem>>,
    ) -> Result<PlacementReport, YardError> {
        let ship = self.ships.get_mut(&id).ok_or(YardError::UnknownShip(id))?;
        for (&index, items) in live_containers {
            if !ship.model.refresh_container_items(index, items.clone()) {
                warn!(id, cell_index = index, "live inventory for a cell that is not storage");
            }
        }

        let report = place_model(world, ship.origin, &ship.model, ship.yaw, force)?;
        let origin = ship.origin;
        self.ships.remove(&id);
        self.links.remove(&origin);
        info!(id, ?origin, placed = report.placed, "ship disassembled");
        Ok(report)
    }
}
