//! World Module
//!
//! How ship code reaches world cells: the [`WorldAccess`] trait and an
//! in-memory chunked [`VoxelWorld`] that implements it.

pub mod access;
pub mod voxel_world;

pub use access::{BannerPattern, ContainerSnapshot, StoredItem, WorldAccess, WorldError};
pub use voxel_world::{VoxelWorld, WorldOp};
