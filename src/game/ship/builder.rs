//! Builds a [`ShipModel`] from discovered world cells.

use std::collections::HashMap;

use glam::{DVec3, IVec3, Vec3};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::detector::Discovery;
use super::model::{Cannon, ModelPart, Seat, ShipModel, extra_keys};
use crate::game::block::{BlockFace, PropertyLookup, fallback_storage};
use crate::game::config::ShipConfig;
use crate::physics::buoyancy::estimate_buoyancy;
use crate::world::WorldAccess;

#[derive(Debug, Error)]
pub enum AssembleError {
    /// The connectivity search failed; carries its message.
    #[error("{0}")]
    Discovery(String),
    #[error("no blocks to assemble")]
    EmptyStructure,
    #[error("failed to record cell metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

#[derive(Default)]
struct MassTally {
    total: i64,
    positive: i64,
    count: usize,
    offset_sum: DVec3,
}

impl MassTally {
    fn add(&mut self, mass: i32, offset: IVec3) {
        self.total += mass as i64;
        if mass > 0 {
            self.positive += mass as i64;
        }
        self.count += 1;
        self.offset_sum += offset.as_dvec3();
    }

    fn center_of_volume(&self) -> Vec3 {
        if self.count == 0 {
            Vec3::ZERO
        } else {
            (self.offset_sum / self.count as f64).as_vec3()
        }
    }
}

/// Captures every discovered cell relative to `origin`.
///
/// `facing` is the direction the origin block exposes; the driver sits one
/// step behind it and the model remembers its yaw for later rotation.
pub fn build_model(
    world: &dyn WorldAccess,
    lookup: &dyn PropertyLookup,
    discovery: &Discovery,
    origin: IVec3,
    facing: BlockFace,
    config: &ShipConfig,
) -> Result<ShipModel, AssembleError> {
    if !discovery.success {
        let message = discovery
            .message
            .clone()
            .unwrap_or_else(|| "discovery failed".to_string());
        return Err(AssembleError::Discovery(message));
    }
    if discovery.cells.is_empty() {
        return Err(AssembleError::EmptyStructure);
    }

    let mut cells: Vec<ModelPart> = Vec::with_capacity(discovery.count());
    let mut index_by_offset: HashMap<IVec3, usize> = HashMap::with_capacity(discovery.count());
    let mut seats = Vec::new();
    let mut mass = MassTally::default();
    let mut min_y = i32::MAX;
    let mut max_y = i32::MIN;

    for &pos in &discovery.cells {
        let offset = pos - origin;
        if index_by_offset.contains_key(&offset) {
            debug!(?pos, "duplicate cell in discovery skipped");
            continue;
        }
        let index = cells.len();
        let state = world.block_at(pos);
        let props = lookup.properties_of(&state);

        min_y = min_y.min(offset.y);
        max_y = max_y.max(offset.y);
        if let Some(cell_mass) = props.mass {
            mass.add(cell_mass, offset);
        }

        let mut part = ModelPart::new(offset, state.clone());
        part.collision = props.collision;
        let extra = &mut part.extra;
        extra.insert(extra_keys::BLOCK.to_string(), Value::from(state.material()));
        extra.insert(extra_keys::BLOCKDATA.to_string(), Value::from(state.to_canonical_string()));

        if props.seat {
            seats.push(Seat {
                offset: offset.as_vec3(),
                cell_index: index,
                is_driver: false,
            });
        }

        let contents = world.container_contents(pos);
        let storage = props
            .storage
            .clone()
            .or_else(|| contents.as_ref().and_then(|_| fallback_storage(state.material())));
        if let Some(storage) = storage {
            extra.insert(
                extra_keys::CONTAINER_ITEMS.to_string(),
                serde_json::to_value(contents.unwrap_or_default())?,
            );
            extra.insert(extra_keys::STORAGE.to_string(), serde_json::to_value(&storage)?);
            part.storage = Some(storage);
        }

        if props.interaction {
            extra.insert(extra_keys::INTERACTION.to_string(), Value::Bool(true));
        }
        if props.leashable {
            extra.insert(extra_keys::LEADABLE.to_string(), Value::Bool(true));
            let leashed = world.leashed_entities(pos);
            if !leashed.is_empty() {
                extra.insert(extra_keys::LEASHED_ENTITY_UUIDS.to_string(), serde_json::to_value(leashed)?);
            }
        }
        if props.display_rotation {
            if let Some(face) = state.facing().filter(|f| f.is_horizontal()) {
                extra.insert(extra_keys::DISPLAY_YAW.to_string(), Value::from(face.yaw()));
            }
        }

        if let Some(texture) = world.profile_texture(pos) {
            extra.insert(extra_keys::SKULL_PROFILE.to_string(), Value::from(texture));
            if let Some(step) = state.rotation16() {
                extra.insert(extra_keys::SKULL_ROTATION.to_string(), Value::from(step));
            }
            if let Some(face) = state.facing() {
                extra.insert(extra_keys::SKULL_FACING.to_string(), Value::from(face.name()));
            }
        }
        if let Some(patterns) = world.banner_patterns(pos) {
            extra.insert(extra_keys::BANNER_PATTERNS.to_string(), serde_json::to_value(patterns)?);
            if let Some(step) = state.rotation16() {
                extra.insert(extra_keys::BANNER_ROTATION.to_string(), Value::from(step));
            }
            if let Some(face) = state.facing() {
                extra.insert(extra_keys::BANNER_FACING.to_string(), Value::from(face.name()));
            }
        }

        index_by_offset.insert(offset, index);
        cells.push(part);
    }

    seats.insert(0, driver_seat(&index_by_offset, facing));

    let center_of_volume = mass.center_of_volume();
    let max_health = health_from_mass(mass.positive, config.max_health);
    let mut model = ShipModel {
        cells,
        seats,
        cannons: Vec::new(),
        assembly_yaw: facing.yaw(),
        total_mass: mass.total,
        massed_cell_count: mass.count,
        center_of_volume,
        min_y,
        max_y,
        max_health,
        health_regen_per_second: config.health_regen_per_second,
        buoyancy_offset: 0.0,
    };
    model.buoyancy_offset = estimate_buoyancy(&model.buoyancy_input(), config.air_density, config.water_density)
        .with_fallback(config.fallback_float_offset)
        .offset;
    model.cannons = pair_cannons(&model.cells, &index_by_offset, config);

    info!(
        ?origin,
        cells = model.cells.len(),
        total_mass = model.total_mass,
        seats = model.seats.len(),
        cannons = model.cannons.len(),
        buoyancy_offset = model.buoyancy_offset,
        "assembled ship model"
    );
    Ok(model)
}

/// Health from the positive mass sum, kept within `[1, max_health]`.
///
/// A cap below 1 or NaN falls back to 1.
fn health_from_mass(positive_mass: i64, max_health: f32) -> f32 {
    let cap = if max_health >= 1.0 { max_health } else { 1.0 };
    (positive_mass as f32).max(1.0).min(cap)
}

/// Synthesized driver seat one step behind the origin facing.
///
/// It binds to the cell at that spot, else the one below it, else the origin.
fn driver_seat(index_by_offset: &HashMap<IVec3, usize>, facing: BlockFace) -> Seat {
    let behind = facing.opposite().offset();
    let cell_index = [behind, behind - IVec3::Y, IVec3::ZERO]
        .iter()
        .find_map(|offset| index_by_offset.get(offset).copied())
        .unwrap_or(0);
    Seat {
        offset: behind.as_vec3(),
        cell_index,
        is_driver: true,
    }
}

/// Firing cells with the anchor material exactly one step behind them.
fn pair_cannons(
    cells: &[ModelPart],
    index_by_offset: &HashMap<IVec3, usize>,
    config: &ShipConfig,
) -> Vec<Cannon> {
    let cannon = &config.cannon;
    cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.state.material() == cannon.firing_material)
        .filter_map(|(firing_cell_index, cell)| {
            let facing = cell.state.facing()?;
            let anchor_offset = cell.offset + facing.opposite().offset();
            let anchor_cell_index = *index_by_offset.get(&anchor_offset)?;
            if cells[anchor_cell_index].state.material() != cannon.anchor_material {
                return None;
            }
            Some(Cannon {
                firing_cell_index,
                anchor_cell_index,
                facing,
                muzzle_offset: cell.offset.as_vec3() + facing.offset().as_vec3() * cannon.muzzle_distance,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::block::{BlockConfig, BlockState};
    use crate::world::{BannerPattern, StoredItem, VoxelWorld};

    const TABLE: &str = r#"[
        { "pattern": "oak_planks", "mass": 2 },
        { "pattern": "white_wool", "mass": null },
        { "pattern": "oak_stairs", "mass": 1, "seat": true, "display_rotation": true },
        { "pattern": "oak_fence", "mass": 1, "leashable": true },
        { "pattern": "lever", "mass": 0, "interaction": true, "collider": false },
        { "pattern": "chest", "mass": 2 },
        { "pattern": "white_banner", "mass": 0, "collider": false },
        { "pattern": "player_head", "mass": 0 }
    ]"#;

    fn table() -> BlockConfig {
        BlockConfig::from_json(TABLE).expect("table parses")
    }

    fn build(world: &VoxelWorld, cells: Vec<IVec3>, facing: BlockFace) -> ShipModel {
        let lookup = table();
        build_model(world, &lookup, &Discovery::found(cells), IVec3::ZERO, facing, &ShipConfig::default())
            .expect("model builds")
    }

    #[test]
    fn failed_or_empty_discovery_produces_no_model() {
        let world = VoxelWorld::new();
        let lookup = table();
        let config = ShipConfig::default();
        let err = build_model(&world, &lookup, &Discovery::failed("too big"), IVec3::ZERO, BlockFace::North, &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "too big");
        let err = build_model(&world, &lookup, &Discovery::found(Vec::new()), IVec3::ZERO, BlockFace::North, &config)
            .unwrap_err();
        assert!(matches!(err, AssembleError::EmptyStructure));
    }

    #[test]
    fn duplicate_positions_are_captured_once() {
        let mut world = VoxelWorld::new();
        world.set_block(IVec3::ZERO, BlockState::new("oak_planks"));
        let model = build(&world, vec![IVec3::ZERO, IVec3::ZERO], BlockFace::North);
        assert_eq!(model.len(), 1);
        assert_eq!(model.total_mass(), 2);
    }

    #[test]
    fn health_uses_positive_mass_and_is_clamped() {
        let mut world = VoxelWorld::new();
        world.set_block(IVec3::ZERO, BlockState::new("white_wool"));
        let model = build(&world, vec![IVec3::ZERO], BlockFace::North);
        assert_eq!(model.max_health(), 1.0);
        assert_eq!(model.massed_cell_count(), 0);
        assert_eq!(model.buoyancy_offset(), 0.25);
        assert_eq!(model.health_regen_per_second(), 0.5);
    }

    #[test]
    fn health_survives_a_cap_below_one() {
        let mut world = VoxelWorld::new();
        world.set_block(IVec3::ZERO, BlockState::new("oak_planks"));
        let lookup = table();
        for max_health in [0.5, -3.0, f32::NAN] {
            let config = ShipConfig {
                max_health,
                ..ShipConfig::default()
            };
            let discovery = Discovery::found(vec![IVec3::ZERO]);
            let model = build_model(&world, &lookup, &discovery, IVec3::ZERO, BlockFace::North, &config)
                .expect("model builds");
            assert_eq!(model.max_health(), 1.0, "cap {max_health}");
        }
        assert_eq!(health_from_mass(300, 64.0), 64.0);
        assert_eq!(health_from_mass(-5, 64.0), 1.0);
    }

    #[test]
    fn classification_records_extras() {
        let mut world = VoxelWorld::new();
        world.set_block(IVec3::ZERO, BlockState::new("oak_planks"));
        world.set_block(IVec3::X, BlockState::new("oak_stairs").with_facing(BlockFace::East));
        world.set_block(IVec3::new(2, 0, 0), BlockState::new("oak_fence"));
        world.attach_leash(IVec3::new(2, 0, 0), "3f2a-llama");
        world.set_block(IVec3::new(0, 1, 0), BlockState::new("lever"));
        let chest_pos = IVec3::new(-1, 0, 0);
        world.set_block(chest_pos, BlockState::new("chest").with_facing(BlockFace::North));
        let mut snapshot = world.container_snapshot(chest_pos).expect("chest");
        snapshot.set(StoredItem::new(4, "spyglass")).expect("fits");
        world.commit_container(snapshot).expect("fresh snapshot");

        let cells = vec![IVec3::ZERO, IVec3::X, IVec3::new(2, 0, 0), IVec3::new(0, 1, 0), chest_pos];
        let model = build(&world, cells, BlockFace::North);

        let stairs = &model.cells()[1];
        assert_eq!(stairs.extra.get(extra_keys::DISPLAY_YAW), Some(&Value::from(270.0f32)));
        assert_eq!(stairs.blockdata(), Some("minecraft:oak_stairs[facing=east]"));
        assert_eq!(model.seats().len(), 2);
        assert!(!model.seats()[1].is_driver);
        assert_eq!(model.seats()[1].cell_index, 1);

        let fence = &model.cells()[2];
        assert!(fence.flag(extra_keys::LEADABLE));
        assert_eq!(
            fence.extra.get(extra_keys::LEASHED_ENTITY_UUIDS),
            Some(&serde_json::json!(["3f2a-llama"]))
        );

        let lever = &model.cells()[3];
        assert!(lever.flag(extra_keys::INTERACTION));
        assert!(!lever.collision.enabled);

        let chest = &model.cells()[4];
        assert_eq!(chest.storage.as_ref().map(|s| s.name.as_str()), Some("Ship Chest"));
        let items = chest.container_items().expect("recorded").expect("well formed");
        assert_eq!(items, vec![StoredItem::new(4, "spyglass")]);
    }

    #[test]
    fn skulls_and_banners_keep_their_tile_data() {
        let mut world = VoxelWorld::new();
        world.set_block(IVec3::ZERO, BlockState::new("oak_planks"));
        let head = IVec3::new(0, 1, 0);
        world.set_block(head, BlockState::new("player_head").with_rotation16(6));
        world.set_profile_texture(head, "eyJ0ZXh0dXJlcyI6e319").expect("head");
        let banner = IVec3::new(1, 0, 0);
        world.set_block(banner, BlockState::new("white_banner").with_rotation16(8));
        world
            .set_banner_patterns(banner, &[BannerPattern::new("black", "skull")])
            .expect("banner");

        let model = build(&world, vec![IVec3::ZERO, head, banner], BlockFace::South);
        let head_cell = &model.cells()[1];
        assert_eq!(head_cell.extra.get(extra_keys::SKULL_PROFILE), Some(&Value::from("eyJ0ZXh0dXJlcyI6e319")));
        assert_eq!(head_cell.extra.get(extra_keys::SKULL_ROTATION), Some(&Value::from(6u8)));
        let banner_cell = &model.cells()[2];
        assert_eq!(
            banner_cell.extra.get(extra_keys::BANNER_PATTERNS),
            Some(&serde_json::json!([{ "color": "black", "pattern": "skull" }]))
        );
        assert_eq!(banner_cell.extra.get(extra_keys::BANNER_ROTATION), Some(&Value::from(8u8)));
    }

    #[test]
    fn driver_seat_binds_behind_then_below_then_origin() {
        let mut world = VoxelWorld::new();
        world.set_block(IVec3::ZERO, BlockState::new("oak_planks"));
        world.set_block(IVec3::new(0, -1, -1), BlockState::new("oak_planks"));

        // facing south: behind is north (0, 0, -1), empty; below it is cell 1
        let model = build(&world, vec![IVec3::ZERO, IVec3::new(0, -1, -1)], BlockFace::South);
        let driver = model.driver_seat().expect("driver");
        assert_eq!(driver.offset, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(driver.cell_index, 1);

        // facing west: behind is east, nothing there or below, so the origin
        let model = build(&world, vec![IVec3::new(0, -1, -1), IVec3::ZERO], BlockFace::West);
        assert_eq!(model.driver_seat().map(|s| s.cell_index), Some(1));
    }

    #[test]
    fn several_cannons_may_share_an_anchor() {
        let mut world = VoxelWorld::new();
        world.set_block(IVec3::ZERO, BlockState::new("obsidian"));
        world.set_block(IVec3::X, BlockState::new("dispenser").with_facing(BlockFace::East));
        world.set_block(IVec3::Z, BlockState::new("dispenser").with_facing(BlockFace::South));
        let model = build(&world, vec![IVec3::ZERO, IVec3::X, IVec3::Z], BlockFace::North);
        assert_eq!(model.cannons().len(), 2);
        assert!(model.cannons().iter().all(|c| c.anchor_cell_index == 0));
    }
}
