//! Ship Module
//!
//! Turning a connected cluster of blocks into a ship model and back:
//! - `detector` - bounded flood fill over allowed blocks
//! - `builder` - captures cells, mass, seats and cannons into a `ShipModel`
//! - `model` - the assembled ship, cells in an arena addressed by index
//! - `placement` - conflict check, rotated placement, two-phase removal
//! - `fragile` - which occupants may be destroyed or must be cleared first
//! - `yard` - owns assembled ships and the origins linked to them

pub mod builder;
pub mod detector;
pub mod fragile;
pub mod model;
pub mod placement;
pub mod yard;

pub use builder::{AssembleError, build_model};
pub use detector::{ConnectivityProvider, Discovery, FloodFillDetector};
pub use fragile::{Occupancy, classify_occupant, is_attachable, is_fragile};
pub use model::{Cannon, ModelError, ModelPart, Seat, ShipModel, extra_keys};
pub use placement::{
    MetadataFailure, PlacementConflicts, PlacementError, PlacementReport, RemovalReport, place_model,
    remove_model, validate_placement,
};
pub use yard::{AssembledShip, ShipId, ShipYard, YardError};
