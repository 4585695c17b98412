//! Ship Tests - Assembly, Placement, Removal, and Buoyancy
//!
//! End-to-end checks of the ship pipeline against the in-memory voxel world,
//! observing world writes through its operation journal.

use approx::assert_relative_eq;
use block_ships_engine::game::block::{BlockConfig, BlockFace, BlockState};
use block_ships_engine::game::config::ShipConfig;
use block_ships_engine::game::ship::{
    Discovery, PlacementConflicts, PlacementError, ShipModel, build_model, place_model, remove_model,
    validate_placement,
};
use block_ships_engine::physics::{BuoyancyInput, FloatRegime, estimate_buoyancy};
use block_ships_engine::world::{VoxelWorld, WorldAccess, WorldOp};
use glam::{IVec3, Vec3};

const TABLE: &str = r#"[
    { "pattern": "oak_planks", "mass": 5 },
    { "pattern": "white_wool", "mass": null },
    { "pattern": "light_planks", "mass": 0 },
    { "pattern": "torch", "mass": 0, "collider": false },
    { "pattern": "dispenser", "mass": 3 },
    { "pattern": "obsidian", "mass": 8 }
]"#;

fn lookup() -> BlockConfig {
    BlockConfig::from_json(TABLE).expect("test table parses")
}

fn assemble(world: &VoxelWorld, cells: &[IVec3], facing: BlockFace) -> ShipModel {
    build_model(
        world,
        &lookup(),
        &Discovery::found(cells.to_vec()),
        IVec3::ZERO,
        facing,
        &ShipConfig::default(),
    )
    .expect("model builds")
}

fn world_with(blocks: &[(IVec3, BlockState)]) -> VoxelWorld {
    let mut world = VoxelWorld::new();
    for (pos, state) in blocks {
        world.set_block(*pos, state.clone());
    }
    world.clear_journal();
    world
}

// ============================================================================
// Model builder
// ============================================================================

#[test]
fn test_massless_cells_are_excluded_from_mass_math() {
    let heavy = IVec3::new(2, 1, -1);
    let world = world_with(&[
        (IVec3::ZERO, BlockState::new("white_wool")),
        (heavy, BlockState::new("oak_planks")),
    ]);
    let model = assemble(&world, &[IVec3::ZERO, heavy], BlockFace::North);

    assert_eq!(model.total_mass(), 5);
    assert_eq!(model.massed_cell_count(), 1);
    assert_eq!(model.center_of_volume(), heavy.as_vec3());
    // both cells still count towards the vertical extent
    assert_eq!((model.min_y(), model.max_y()), (0, 1));
    assert_eq!(model.max_health(), 5.0);
}

#[test]
fn test_driver_seat_is_synthesized_behind_the_facing() {
    let world = world_with(&[(IVec3::ZERO, BlockState::new("oak_planks"))]);
    let model = assemble(&world, &[IVec3::ZERO], BlockFace::North);

    assert_eq!(model.seats().len(), 1);
    let driver = &model.seats()[0];
    assert!(driver.is_driver);
    assert_eq!(driver.offset, Vec3::new(0.0, 0.0, 1.0));
    // nothing behind or below, so the seat binds to the origin cell
    assert_eq!(driver.cell_index, 0);
    assert_eq!(model.assembly_yaw(), 180.0);
}

#[test]
fn test_health_is_clamped_to_the_configured_maximum() {
    let cells: Vec<IVec3> = (0..300).map(|x| IVec3::new(x, 0, 0)).collect();
    let blocks: Vec<(IVec3, BlockState)> = cells.iter().map(|p| (*p, BlockState::new("oak_planks"))).collect();
    let world = world_with(&blocks);
    let model = assemble(&world, &cells, BlockFace::North);
    assert_eq!(model.total_mass(), 1500);
    assert_eq!(model.max_health(), 1024.0);
}

// ============================================================================
// Cannon pairing
// ============================================================================

#[test]
fn test_cannon_pairs_with_anchor_behind_it() {
    let world = world_with(&[
        (IVec3::ZERO, BlockState::new("dispenser").with_facing(BlockFace::East)),
        (IVec3::new(-1, 0, 0), BlockState::new("obsidian")),
    ]);
    let model = assemble(&world, &[IVec3::ZERO, IVec3::new(-1, 0, 0)], BlockFace::North);

    assert_eq!(model.cannons().len(), 1);
    let cannon = &model.cannons()[0];
    assert_eq!(cannon.firing_cell_index, 0);
    assert_eq!(cannon.anchor_cell_index, 1);
    assert_eq!(cannon.facing, BlockFace::East);
    assert_relative_eq!(cannon.muzzle_offset.x, 0.6);
    assert_eq!(cannon.muzzle_offset.z, 0.0);
}

#[test]
fn test_cannon_with_anchor_in_front_does_not_pair() {
    let world = world_with(&[
        (IVec3::ZERO, BlockState::new("dispenser").with_facing(BlockFace::East)),
        (IVec3::new(1, 0, 0), BlockState::new("obsidian")),
    ]);
    let model = assemble(&world, &[IVec3::ZERO, IVec3::new(1, 0, 0)], BlockFace::North);
    assert!(model.cannons().is_empty());
}

// ============================================================================
// Placement
// ============================================================================

fn four_plank_model() -> ShipModel {
    let cells = [IVec3::ZERO, IVec3::X, IVec3::new(2, 0, 0), IVec3::new(3, 0, 0)];
    let blocks: Vec<(IVec3, BlockState)> = cells.iter().map(|p| (*p, BlockState::new("oak_planks"))).collect();
    let world = world_with(&blocks);
    assemble(&world, &cells, BlockFace::North)
}

#[test]
fn test_validate_and_execute_agree_on_conflicts() {
    let model = four_plank_model();
    let origin = IVec3::new(50, 10, 50);
    let mut world = world_with(&[
        (origin + IVec3::X, BlockState::new("short_grass")),
        (origin + IVec3::new(2, 0, 0), BlockState::new("stone")),
        (origin + IVec3::new(3, 0, 0), BlockState::new("water")),
    ]);

    let conflicts = validate_placement(&world, origin, &model, model.assembly_yaw());
    assert_eq!(conflicts, PlacementConflicts { fragile: 1, hard: 1 });
    assert_eq!(conflicts.total(), 2);
    assert!(!conflicts.is_clear());

    let err = place_model(&mut world, origin, &model, model.assembly_yaw(), false).unwrap_err();
    assert_eq!(err, PlacementError::Conflicted(conflicts));
    assert!(world.journal().is_empty(), "declined placement must not touch the world");

    let report = place_model(&mut world, origin, &model, model.assembly_yaw(), true).expect("forced");
    assert_eq!(report.placed, 3);
    assert_eq!(report.fragile_cleared, 1);
    assert_eq!(report.skipped_hard, vec![2]);
    assert!(world.journal().contains(&WorldOp::Clear { pos: origin + IVec3::X, notify: false }));
    assert_eq!(world.block_at(origin + IVec3::X).material(), "oak_planks");
    assert_eq!(world.block_at(origin + IVec3::new(2, 0, 0)).material(), "stone");
    assert_eq!(world.block_at(origin + IVec3::new(3, 0, 0)).material(), "oak_planks");
    assert_eq!(world.block_at(origin).material(), "oak_planks");
}

#[test]
fn test_placement_uses_rotation_since_assembly() {
    let model = four_plank_model();
    let origin = IVec3::new(0, 5, 0);
    let mut world = VoxelWorld::new();

    // assembled facing north (180), placed facing east (270): a quarter turn
    let report = place_model(&mut world, origin, &model, 270.0, false).expect("empty world");
    assert_eq!(report.facing, BlockFace::East);
    for z in 0..4 {
        assert_eq!(world.block_at(origin + IVec3::new(0, 0, z)).material(), "oak_planks");
    }
    assert_eq!(world.len(), 4);
}

#[test]
fn test_colliders_sit_where_placement_writes_cells() {
    let cells = [IVec3::ZERO, IVec3::X, IVec3::new(1, 0, -1), IVec3::new(1, 1, -1)];
    let blocks: Vec<(IVec3, BlockState)> = cells.iter().map(|p| (*p, BlockState::new("oak_planks"))).collect();
    let model = assemble(&world_with(&blocks), &cells, BlockFace::North);
    let origin = IVec3::new(-7, 3, 12);

    for yaw in [0.0, 90.0, 180.0, 270.0] {
        let mut world = VoxelWorld::new();
        place_model(&mut world, origin, &model, yaw, false).expect("empty world");

        let colliders = model.colliders(yaw);
        assert_eq!(colliders.len(), cells.len());
        for collider in colliders.iter() {
            let cell = (origin.as_vec3() + collider.bounds.center()).round().as_ivec3();
            assert_eq!(world.block_at(cell).material(), "oak_planks", "yaw {yaw}, cell {}", collider.cell_index);
        }
    }
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn test_removal_clears_attachables_before_their_support() {
    let solid = IVec3::ZERO;
    let torch = IVec3::new(0, 0, -1);
    let mut world = world_with(&[
        (solid, BlockState::new("oak_planks")),
        (torch, BlockState::new("wall_torch").with_facing(BlockFace::North)),
    ]);
    // solid first in model order, so the order below comes from classification
    let model = assemble(&world, &[solid, torch], BlockFace::North);

    let report = remove_model(&mut world, IVec3::ZERO, &model);
    assert_eq!(report.attachables_cleared, 1);
    assert_eq!(report.blocks_cleared, 1);

    let torch_at = world.journal_index_of(torch).expect("torch cleared");
    let solid_at = world.journal_index_of(solid).expect("solid cleared");
    assert!(torch_at < solid_at);
    assert!(world.is_empty());
}

// ============================================================================
// Buoyancy
// ============================================================================

#[test]
fn test_air_density_puts_waterline_at_the_keel() {
    let cells = [IVec3::ZERO, IVec3::new(0, -1, 0), IVec3::new(0, -2, 0)];
    let blocks: Vec<(IVec3, BlockState)> = cells.iter().map(|p| (*p, BlockState::new("light_planks"))).collect();
    let world = world_with(&blocks);
    let model = assemble(&world, &cells, BlockFace::North);

    // mass 0 per cell, air density 0: t == 0
    assert_eq!(model.massed_cell_count(), 3);
    assert_relative_eq!(model.buoyancy_offset(), 2.0);
    assert_relative_eq!(model.buoyancy_offset(), -(model.min_y() as f32));
}

#[test]
fn test_unweighted_ship_uses_the_fallback_offset() {
    let world = world_with(&[(IVec3::ZERO, BlockState::new("white_wool"))]);
    let model = assemble(&world, &[IVec3::ZERO], BlockFace::North);
    assert_eq!(model.buoyancy_offset(), 0.25);
    assert_eq!(model.buoyancy(&ShipConfig::default()).regime(), FloatRegime::Unweighted);
}

#[test]
fn test_preview_and_model_share_the_buoyancy_formula() {
    let model = four_plank_model();
    let config = ShipConfig::default();
    let direct = estimate_buoyancy(
        &BuoyancyInput {
            total_mass: 20.0,
            massed_cell_count: 4,
            center_of_volume_y: 0.0,
            min_y: 0.0,
        },
        config.air_density,
        config.water_density,
    );
    assert_eq!(model.buoyancy(&config).offset, direct.offset);
    assert_eq!(model.buoyancy_offset(), direct.offset);
    assert_eq!(model.float_target_y(62.0, &config), 62.0 + direct.offset);
    // mean density 5 is twice water density
    assert_eq!(direct.regime(), FloatRegime::Sinking);
}
