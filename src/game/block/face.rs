//! Block faces, axes, and face sets.
//!
//! Direction convention matches the voxel world: North is -Z, South is +Z,
//! East is +X, West is -X.

use std::fmt;
use std::str::FromStr;

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::physics::rotation::quarter_turns;

/// One of the six faces of a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockFace {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl BlockFace {
    pub const ALL: [BlockFace; 6] = [
        BlockFace::North,
        BlockFace::East,
        BlockFace::South,
        BlockFace::West,
        BlockFace::Up,
        BlockFace::Down,
    ];

    pub const HORIZONTAL: [BlockFace; 4] = [
        BlockFace::North,
        BlockFace::East,
        BlockFace::South,
        BlockFace::West,
    ];

    /// Unit step from a cell towards its neighbour on this face.
    pub const fn offset(self) -> IVec3 {
        match self {
            BlockFace::North => IVec3::new(0, 0, -1),
            BlockFace::South => IVec3::new(0, 0, 1),
            BlockFace::East => IVec3::new(1, 0, 0),
            BlockFace::West => IVec3::new(-1, 0, 0),
            BlockFace::Up => IVec3::new(0, 1, 0),
            BlockFace::Down => IVec3::new(0, -1, 0),
        }
    }

    pub const fn opposite(self) -> BlockFace {
        match self {
            BlockFace::North => BlockFace::South,
            BlockFace::South => BlockFace::North,
            BlockFace::East => BlockFace::West,
            BlockFace::West => BlockFace::East,
            BlockFace::Up => BlockFace::Down,
            BlockFace::Down => BlockFace::Up,
        }
    }

    pub const fn is_horizontal(self) -> bool {
        !matches!(self, BlockFace::Up | BlockFace::Down)
    }

    pub const fn name(self) -> &'static str {
        match self {
            BlockFace::North => "north",
            BlockFace::East => "east",
            BlockFace::South => "south",
            BlockFace::West => "west",
            BlockFace::Up => "up",
            BlockFace::Down => "down",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            BlockFace::North => 1 << 0,
            BlockFace::East => 1 << 1,
            BlockFace::South => 1 << 2,
            BlockFace::West => 1 << 3,
            BlockFace::Up => 1 << 4,
            BlockFace::Down => 1 << 5,
        }
    }
}

impl BlockFace {
    /// Yaw of a horizontal face: South 0, West 90, North 180, East 270.
    /// Vertical faces report 0.
    pub const fn yaw(self) -> f32 {
        match self {
            BlockFace::South => 0.0,
            BlockFace::West => 90.0,
            BlockFace::North => 180.0,
            BlockFace::East => 270.0,
            BlockFace::Up | BlockFace::Down => 0.0,
        }
    }

    /// Horizontal face closest to `yaw_degrees`.
    pub fn from_yaw(yaw_degrees: f32) -> BlockFace {
        match quarter_turns(yaw_degrees) {
            0 => BlockFace::South,
            1 => BlockFace::West,
            2 => BlockFace::North,
            _ => BlockFace::East,
        }
    }

    /// Rotates a horizontal face by `yaw_degrees`; up and down are fixed points.
    pub fn rotated(self, yaw_degrees: f32) -> BlockFace {
        if !self.is_horizontal() {
            return self;
        }
        BlockFace::from_yaw(self.yaw() + yaw_degrees)
    }
}

impl fmt::Display for BlockFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockFace {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockFace::ALL
            .into_iter()
            .find(|face| face.name().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Block axis for pillar-like shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            _ => Err(()),
        }
    }
}

/// Compact set of block faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceSet(u8);

impl FaceSet {
    pub const EMPTY: FaceSet = FaceSet(0);
    pub const ALL: FaceSet = FaceSet(0b11_1111);
    pub const HORIZONTAL: FaceSet = FaceSet(0b00_1111);

    pub const fn contains(self, face: BlockFace) -> bool {
        self.0 & face.bit() != 0
    }

    pub fn insert(&mut self, face: BlockFace) {
        self.0 |= face.bit();
    }

    pub fn remove(&mut self, face: BlockFace) {
        self.0 &= !face.bit();
    }

    pub const fn with(self, face: BlockFace) -> FaceSet {
        FaceSet(self.0 | face.bit())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Faces in canonical (north, east, south, west, up, down) order.
    pub fn iter(self) -> impl Iterator<Item = BlockFace> {
        BlockFace::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl FromIterator<BlockFace> for FaceSet {
    fn from_iter<I: IntoIterator<Item = BlockFace>>(iter: I) -> Self {
        let mut set = FaceSet::EMPTY;
        for face in iter {
            set.insert(face);
        }
        set
    }
}
