//! Block Ships Engine Library
//!
//! Voxel ship assembly: detach a connected cluster of blocks from the world
//! as a rotatable structure, float it, and put it back.
//!
//! # Modules
//!
//! - [`physics`] - Quarter-turn rotation, cell colliders, buoyancy
//! - [`world`] - World cell access and an in-memory chunked world
//! - [`game`] - Block states, property table, ship model, placement, yard
//!
//! # Example
//!
//! ```ignore
//! use block_ships_engine::game::{BlockConfig, BlockFace, ShipConfig, ShipYard};
//! use block_ships_engine::game::ship::FloodFillDetector;
//! use block_ships_engine::world::VoxelWorld;
//! use glam::IVec3;
//!
//! let lookup = BlockConfig::builtin()?;
//! let config = ShipConfig::default();
//! let detector = FloodFillDetector::new(&lookup, config.max_ship_size);
//! let mut yard = ShipYard::new(config);
//! let mut world = VoxelWorld::new();
//!
//! let id = yard.assemble(&mut world, &detector, &lookup, IVec3::ZERO, BlockFace::North)?;
//! yard.move_ship(id, IVec3::new(40, 62, 0), 90.0)?;
//! let report = yard.disassemble(&mut world, id, false, &Default::default())?;
//! ```

pub mod physics;
pub mod world;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

pub use physics::{normalize_yaw, rotate_offset, rotate_position};
pub use world::{VoxelWorld, WorldAccess};
