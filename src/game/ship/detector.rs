//! Ship discovery: which world cells belong to the structure at an origin.

use std::collections::{HashSet, VecDeque};

use glam::IVec3;
use tracing::debug;

use super::fragile::is_air;
use crate::game::block::PropertyLookup;
use crate::world::WorldAccess;

/// Result of a connectivity search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Absolute positions, origin first
    pub cells: Vec<IVec3>,
    pub success: bool,
    pub message: Option<String>,
}

impl Discovery {
    pub fn found(cells: Vec<IVec3>) -> Self {
        Self {
            cells,
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            cells: Vec::new(),
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn count(&self) -> usize {
        self.cells.len()
    }
}

/// Finds the cells connected to an origin.
pub trait ConnectivityProvider {
    fn discover(&self, world: &dyn WorldAccess, origin: IVec3) -> Discovery;
}

/// Bounded six-neighbour flood fill over allowed, non-air blocks.
pub struct FloodFillDetector<'a> {
    lookup: &'a dyn PropertyLookup,
    max_size: usize,
}

impl<'a> FloodFillDetector<'a> {
    pub fn new(lookup: &'a dyn PropertyLookup, max_size: usize) -> Self {
        Self { lookup, max_size }
    }
}

impl ConnectivityProvider for FloodFillDetector<'_> {
    fn discover(&self, world: &dyn WorldAccess, origin: IVec3) -> Discovery {
        if is_air(world.block_at(origin).material()) {
            return Discovery::failed("No valid blocks found for ship");
        }

        let mut visited = HashSet::from([origin]);
        let mut queue = VecDeque::from([origin]);
        let mut cells = Vec::new();

        while let Some(pos) = queue.pop_front() {
            cells.push(pos);
            if cells.len() > self.max_size {
                debug!(?origin, max_size = self.max_size, "flood fill hit the size cap");
                return Discovery::failed(format!(
                    "Ship exceeds maximum size of {} blocks",
                    self.max_size
                ));
            }
            for next in neighbors6(pos) {
                if !visited.insert(next) {
                    continue;
                }
                let material = world.block_at(next).material().to_string();
                if is_air(&material) || !self.lookup.is_allowed(&material) {
                    continue;
                }
                queue.push_back(next);
            }
        }

        debug!(?origin, count = cells.len(), "flood fill finished");
        Discovery::found(cells)
    }
}

#[inline]
pub fn neighbors6(c: IVec3) -> [IVec3; 6] {
    [
        IVec3::new(c.x + 1, c.y, c.z),
        IVec3::new(c.x - 1, c.y, c.z),
        IVec3::new(c.x, c.y + 1, c.z),
        IVec3::new(c.x, c.y - 1, c.z),
        IVec3::new(c.x, c.y, c.z + 1),
        IVec3::new(c.x, c.y, c.z - 1),
    ]
}
