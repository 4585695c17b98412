//! Rotation Tests - Positions, Faces, and Oriented Block States
//!
//! Quarter-turn composition for every orientation category, and the
//! integer round trip of rotated positions.

use block_ships_engine::game::block::{Axis, BlockFace, BlockState, FaceSet, Orientation};
use block_ships_engine::physics::{rotate_offset, rotate_position};
use glam::{IVec3, Vec3};

fn turn(state: &BlockState, yaw: f32, times: usize) -> BlockState {
    (0..times).fold(state.clone(), |s, _| s.rotated(yaw))
}

// ============================================================================
// Position rotation
// ============================================================================

#[test]
fn test_position_round_trip_restores_integer_points() {
    for x in -6..=6 {
        for y in [-3, 0, 5] {
            for z in -6..=6 {
                let p = IVec3::new(x, y, z);
                let there = rotate_position(p.as_vec3(), 90.0);
                let back = rotate_position(there, -90.0);
                assert_eq!(back.round().as_ivec3(), p, "round trip failed for {p}");
            }
        }
    }
}

#[test]
fn test_quarter_turns_walk_the_compass() {
    let south = IVec3::new(0, 0, 1);
    assert_eq!(rotate_offset(south, 90.0), IVec3::new(-1, 0, 0));
    assert_eq!(rotate_offset(south, 180.0), IVec3::new(0, 0, -1));
    assert_eq!(rotate_offset(south, 270.0), IVec3::new(1, 0, 0));
    assert_eq!(rotate_offset(south, 360.0), south);
}

#[test]
fn test_rotation_keeps_height() {
    let p = rotate_position(Vec3::new(2.0, 7.5, -1.0), 270.0);
    assert_eq!(p.y, 7.5);
}

// ============================================================================
// Faces
// ============================================================================

#[test]
fn test_face_yaw_mapping() {
    assert_eq!(BlockFace::South.yaw(), 0.0);
    assert_eq!(BlockFace::West.yaw(), 90.0);
    assert_eq!(BlockFace::North.yaw(), 180.0);
    assert_eq!(BlockFace::East.yaw(), 270.0);
    assert_eq!(BlockFace::from_yaw(-90.0), BlockFace::East);
    assert_eq!(BlockFace::from_yaw(359.0), BlockFace::South);
    assert_eq!(BlockFace::from_yaw(44.0), BlockFace::South);
}

#[test]
fn test_face_rotation_agrees_with_offset_rotation() {
    for face in BlockFace::HORIZONTAL {
        for yaw in [90.0, 180.0, 270.0] {
            assert_eq!(
                face.rotated(yaw).offset(),
                rotate_offset(face.offset(), yaw),
                "{face} turned by {yaw}"
            );
        }
    }
}

// ============================================================================
// Oriented states: four quarter turns are the identity
// ============================================================================

#[test]
fn test_directional_composition() {
    for face in BlockFace::ALL {
        let state = BlockState::new("observer").with_facing(face);
        assert_eq!(turn(&state, 90.0, 4), state);
        let stairs = BlockState::new("oak_stairs")
            .with_property("half", "top")
            .with_facing(if face.is_horizontal() { face } else { BlockFace::North });
        assert_eq!(turn(&stairs, 90.0, 4), stairs);
    }
}

#[test]
fn test_axis_composition() {
    for axis in [Axis::X, Axis::Y, Axis::Z] {
        let state = BlockState::new("spruce_log").with_axis(axis);
        assert_eq!(turn(&state, 90.0, 4), state);
        assert_eq!(turn(&state, 90.0, 2), state);
    }
}

#[test]
fn test_rotation16_composition() {
    for step in 0..16 {
        let state = BlockState::new("oak_sign").with_rotation16(step);
        assert_eq!(turn(&state, 90.0, 4), state);
        assert_eq!(state.rotated(90.0).rotation16(), Some((step + 4) % 16));
    }
}

#[test]
fn test_face_set_composition() {
    let allowed = FaceSet::ALL;
    for bits in 0..64u8 {
        let set: FaceSet = BlockFace::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| bits & (1 << i) != 0)
            .map(|(_, f)| f)
            .collect();
        let state = BlockState::new("glow_lichen").with_faces(set, allowed);
        assert_eq!(turn(&state, 90.0, 4), state);
    }
}

#[test]
fn test_face_set_composition_with_partial_support() {
    // a shape that supports every horizontal face keeps all of them
    let state = BlockState::parse("minecraft:iron_bars[east=true,north=false,south=false,waterlogged=false,west=true]")
        .expect("bars parse");
    assert_eq!(turn(&state, 90.0, 4), state);
    let turned = state.rotated(90.0);
    assert_eq!(
        turned.faces(),
        Some(FaceSet::EMPTY.with(BlockFace::North).with(BlockFace::South))
    );
}

#[test]
fn test_mixed_categories_rotate_together() {
    let state = BlockState::new("odd_block")
        .with_orientation(Orientation::Axis(Axis::X))
        .with_rotation16(3)
        .with_facing(BlockFace::West);
    let turned = state.rotated(90.0);
    assert_eq!(turned.axis(), Some(Axis::Z));
    assert_eq!(turned.rotation16(), Some(7));
    assert_eq!(turned.facing(), Some(BlockFace::North));
    assert_eq!(turn(&state, 90.0, 4), state);
}

#[test]
fn test_canonical_string_survives_rotation() {
    let text = "minecraft:oak_stairs[facing=east,half=bottom,shape=inner_left,waterlogged=true]";
    let state = BlockState::parse(text).expect("stairs parse");
    assert_eq!(state.to_canonical_string(), text);
    let turned = state.rotated(180.0);
    assert_eq!(
        turned.to_canonical_string(),
        "minecraft:oak_stairs[facing=west,half=bottom,shape=inner_left,waterlogged=true]"
    );
}
