//! Physics module
//!
//! Closed-form physics for rigid voxel structures. There is no simulation
//! here: only the math that decides how a structure is oriented, where its
//! cells collide, and how high it floats.
//!
//! # Unit System
//!
//! **1 unit = 1 voxel cell**
//!
//! - Positions and offsets in cells, relative to a structure origin
//! - Yaw in degrees, 0 = south, 90 = west, 180 = north, 270 = east
//! - Density in mass units per cell
//!
//! # Submodules
//!
//! - [`types`] - Vector types re-exported from glam
//! - [`rotation`] - Quarter-turn yaw rotation of positions and offsets
//! - [`collision`] - Cell colliders and ray picking
//! - [`buoyancy`] - Float offset from mean density and vertical extent

pub mod buoyancy;
pub mod collision;
pub mod rotation;
pub mod types;

pub use buoyancy::{BuoyancyEstimate, BuoyancyInput, FloatRegime, estimate_buoyancy};
pub use collision::{Aabb, CellCollider, CellHit, ColliderSet, aabb_surface_normal, ray_aabb_intersect};
pub use rotation::{normalize_yaw, quarter_turns, rotate_offset, rotate_position, snap_yaw, yaw_delta};
pub use types::{IVec3, Vec3};
