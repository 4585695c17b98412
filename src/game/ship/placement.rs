//! Putting a ship model back into the world, and taking it out.
//!
//! Placement rotates every cell by the yaw the ship turned since assembly,
//! checks what occupies each target cell, then writes states and restores
//! tile data. Removal clears the cells the model occupies, hanging
//! decoration first so nothing drops when its support disappears.

use glam::IVec3;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fragile::{Occupancy, classify_occupant, is_air, is_attachable};
use super::model::{ModelPart, ShipModel, extra_keys};
use crate::game::block::{BlockFace, BlockState};
use crate::physics::rotation::yaw_delta;
use crate::world::{BannerPattern, WorldAccess};

/// Occupied target cells, by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacementConflicts {
    pub fragile: usize,
    pub hard: usize,
}

impl PlacementConflicts {
    pub fn total(&self) -> usize {
        self.fragile + self.hard
    }

    pub fn is_clear(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("placement blocked by {} fragile and {} hard conflicts", .0.fragile, .0.hard)]
    Conflicted(PlacementConflicts),
}

/// Tile data of one cell that could not be restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFailure {
    pub cell_index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    pub placed: usize,
    pub fragile_cleared: usize,
    /// Cells not written because something hard was in the way
    pub skipped_hard: Vec<usize>,
    pub metadata_failures: Vec<MetadataFailure>,
    /// Facing of the origin block after rotation
    pub facing: BlockFace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovalReport {
    pub attachables_cleared: usize,
    pub blocks_cleared: usize,
}

impl RemovalReport {
    pub fn total(&self) -> usize {
        self.attachables_cleared + self.blocks_cleared
    }
}

fn target_positions(origin: IVec3, model: &ShipModel, rotation: f32) -> impl Iterator<Item = (usize, &ModelPart, IVec3)> {
    model
        .cells()
        .iter()
        .enumerate()
        .map(move |(index, cell)| (index, cell, cell.world_pos(origin, rotation)))
}

/// Counts what is in the way of placing `model` at `origin` turned to `current_yaw`.
pub fn validate_placement(
    world: &dyn WorldAccess,
    origin: IVec3,
    model: &ShipModel,
    current_yaw: f32,
) -> PlacementConflicts {
    let rotation = yaw_delta(model.assembly_yaw(), current_yaw);
    let mut conflicts = PlacementConflicts::default();
    for (_, _, pos) in target_positions(origin, model, rotation) {
        match classify_occupant(&world.block_at(pos)) {
            Occupancy::Clear => {}
            Occupancy::Fragile => conflicts.fragile += 1,
            Occupancy::Hard => conflicts.hard += 1,
        }
    }
    conflicts
}

/// Writes `model` into the world at `origin`, turned to `current_yaw`.
///
/// Without `force` any conflict aborts before the first write. With `force`
/// fragile occupants are cleared silently and cells blocked by hard
/// occupants are skipped.
pub fn place_model(
    world: &mut dyn WorldAccess,
    origin: IVec3,
    model: &ShipModel,
    current_yaw: f32,
    force: bool,
) -> Result<PlacementReport, PlacementError> {
    let rotation = yaw_delta(model.assembly_yaw(), current_yaw);
    let conflicts = validate_placement(world, origin, model, current_yaw);
    if !force && !conflicts.is_clear() {
        debug!(?origin, fragile = conflicts.fragile, hard = conflicts.hard, "placement declined");
        return Err(PlacementError::Conflicted(conflicts));
    }

    let mut report = PlacementReport {
        placed: 0,
        fragile_cleared: 0,
        skipped_hard: Vec::new(),
        metadata_failures: Vec::new(),
        facing: BlockFace::from_yaw(model.assembly_yaw()).rotated(rotation),
    };

    for (index, cell, pos) in target_positions(origin, model, rotation) {
        match classify_occupant(&world.block_at(pos)) {
            Occupancy::Clear => {}
            Occupancy::Fragile => {
                world.clear_block(pos, false);
                report.fragile_cleared += 1;
            }
            Occupancy::Hard => {
                report.skipped_hard.push(index);
                continue;
            }
        }

        world.set_block(pos, placed_state(index, cell, rotation));
        for reason in restore_metadata(world, pos, cell) {
            warn!(cell_index = index, ?pos, %reason, "failed to restore cell metadata");
            report.metadata_failures.push(MetadataFailure { cell_index: index, reason });
        }
        report.placed += 1;
    }

    info!(
        ?origin,
        rotation,
        placed = report.placed,
        fragile_cleared = report.fragile_cleared,
        skipped_hard = report.skipped_hard.len(),
        metadata_failures = report.metadata_failures.len(),
        "placed ship model"
    );
    Ok(report)
}

/// Rotated state for a cell, preferring its retained state string.
fn placed_state(index: usize, cell: &ModelPart, rotation: f32) -> BlockState {
    match cell.blockdata().map(BlockState::parse) {
        Some(Ok(state)) => state.rotated(rotation),
        Some(Err(err)) => {
            warn!(cell_index = index, %err, "stored block state unreadable, using typed state");
            cell.state.rotated(rotation)
        }
        None => cell.state.rotated(rotation),
    }
}

/// Restores skull textures, banner layers and inventories. Returns one
/// reason per failed step.
fn restore_metadata(world: &mut dyn WorldAccess, pos: IVec3, cell: &ModelPart) -> Vec<String> {
    let mut failures = Vec::new();

    if let Some(value) = cell.extra.get(extra_keys::SKULL_PROFILE) {
        match value.as_str() {
            Some(texture) => {
                if let Err(err) = world.set_profile_texture(pos, texture) {
                    failures.push(err.to_string());
                }
            }
            None => failures.push("skull profile is not a string".to_string()),
        }
    }

    if let Some(value) = cell.extra.get(extra_keys::BANNER_PATTERNS) {
        match Vec::<BannerPattern>::deserialize(value) {
            Ok(patterns) => {
                if let Err(err) = world.set_banner_patterns(pos, &patterns) {
                    failures.push(err.to_string());
                }
            }
            Err(err) => failures.push(format!("malformed banner patterns: {err}")),
        }
    }

    match cell.container_items() {
        None => {}
        Some(Err(err)) => failures.push(format!("malformed container items: {err}")),
        Some(Ok(items)) => {
            // Fetch a fresh snapshot, fill it, and commit before anything
            // else reads this container.
            let Some(mut snapshot) = world.container_snapshot(pos) else {
                failures.push(format!("no container at {pos} to restore items into"));
                return failures;
            };
            snapshot.clear();
            for item in items {
                if let Err(err) = snapshot.set(item) {
                    failures.push(err.to_string());
                }
            }
            if let Err(err) = world.commit_container(snapshot) {
                failures.push(err.to_string());
            }
        }
    }

    failures
}

/// Clears the cells `model` occupies at `origin`, attachables first.
pub fn remove_model(world: &mut dyn WorldAccess, origin: IVec3, model: &ShipModel) -> RemovalReport {
    let mut attachables = Vec::new();
    let mut solids = Vec::new();
    for cell in model.cells() {
        let pos = origin + cell.offset;
        let state = world.block_at(pos);
        if is_air(state.material()) {
            continue;
        }
        if is_attachable(state.material()) {
            attachables.push(pos);
        } else {
            solids.push(pos);
        }
    }

    for &pos in &attachables {
        world.clear_block(pos, true);
    }
    for &pos in &solids {
        world.clear_block(pos, true);
    }

    let report = RemovalReport {
        attachables_cleared: attachables.len(),
        blocks_cleared: solids.len(),
    };
    info!(?origin, attachables = report.attachables_cleared, blocks = report.blocks_cleared, "removed ship blocks");
    report
}
