//! Block Module
//!
//! Faces, oriented block states, and the property table that says what a
//! block weighs and does once it is part of a ship.

pub mod face;
pub mod properties;
pub mod state;

pub use face::{Axis, BlockFace, FaceSet};
pub use properties::{
    BlockConfig, BlockEntry, BlockProperties, BlockRule, CollisionConfig, PropertyLookup,
    StorageConfig, StorageKind, fallback_storage,
};
pub use state::{BlockState, Orientation, StateParseError, directional_faces};
