//! Game Module
//!
//! Ship-specific systems that build on top of the engine.

pub mod block;
pub mod config;
pub mod ship;

pub use block::{BlockConfig, BlockFace, BlockState, PropertyLookup};
pub use config::ShipConfig;
pub use ship::{ShipModel, ShipYard, build_model, place_model, remove_model, validate_placement};
