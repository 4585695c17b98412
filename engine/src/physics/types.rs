//! Physics type re-exports from glam
//!
//! Integer vectors address voxel cells, float vectors hold continuous
//! positions such as seat offsets and muzzle points.

pub use glam::{IVec3, Vec3};
