//! Oriented block state.
//!
//! A [`BlockState`] is a material name plus the rotation-sensitive parts of
//! its shape, held as typed [`Orientation`] entries, and every other property
//! kept verbatim. The canonical string form is the one the voxel world uses:
//!
//! ```text
//! minecraft:oak_stairs[facing=north,half=bottom,shape=straight,waterlogged=false]
//! ```
//!
//! Keys are always written sorted, so parsing a canonical string and writing
//! it back yields the same text. Properties the typed model does not know
//! about survive untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::face::{Axis, BlockFace, FaceSet};
use crate::physics::rotation::quarter_turns;

const DEFAULT_NAMESPACE: &str = "minecraft";

/// Errors raised while parsing a canonical block-state string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateParseError {
    #[error("block state string is empty")]
    Empty,
    #[error("block state `{0}` has an unterminated property list")]
    Unterminated(String),
    #[error("malformed property `{0}`")]
    MalformedProperty(String),
    #[error("property `{0}` appears more than once")]
    DuplicateKey(String),
    #[error("invalid value `{value}` for property `{key}`")]
    InvalidValue { key: String, value: String },
}

/// One rotation-sensitive category of a block shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// A single facing. `allowed` lists the faces this shape can point at.
    Directional { facing: BlockFace, allowed: FaceSet },
    /// Pillar-like alignment.
    Axis(Axis),
    /// Sixteen-step rotation, 0 = south, 4 = west, 8 = north, 12 = east.
    Rotation16(u8),
    /// Connected faces. `allowed` lists every face the shape can expose.
    Faces { set: FaceSet, allowed: FaceSet },
}

impl Orientation {
    /// Rotates this orientation by a yaw angle. Only quarter turns are
    /// meaningful; other angles are rounded to the nearest one.
    pub fn rotated(self, yaw_degrees: f32) -> Orientation {
        match self {
            Orientation::Directional { facing, allowed } => {
                let turned = facing.rotated(yaw_degrees);
                let facing = if allowed.contains(turned) { turned } else { facing };
                Orientation::Directional { facing, allowed }
            }
            Orientation::Axis(axis) => {
                let odd = quarter_turns(yaw_degrees) % 2 == 1;
                Orientation::Axis(match axis {
                    Axis::X if odd => Axis::Z,
                    Axis::Z if odd => Axis::X,
                    other => other,
                })
            }
            Orientation::Rotation16(step) => {
                let steps = quarter_turns(yaw_degrees) * 4;
                Orientation::Rotation16((step + steps) % 16)
            }
            Orientation::Faces { set, allowed } => {
                let set = set
                    .iter()
                    .map(|face| face.rotated(yaw_degrees))
                    .filter(|face| allowed.contains(*face))
                    .collect();
                Orientation::Faces { set, allowed }
            }
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Orientation::Directional { .. } => 0,
            Orientation::Axis(_) => 1,
            Orientation::Rotation16(_) => 2,
            Orientation::Faces { .. } => 3,
        }
    }

    fn write_properties(&self, out: &mut BTreeMap<String, String>) {
        match *self {
            Orientation::Directional { facing, .. } => {
                out.insert("facing".to_string(), facing.name().to_string());
            }
            Orientation::Axis(axis) => {
                out.insert("axis".to_string(), axis.name().to_string());
            }
            Orientation::Rotation16(step) => {
                out.insert("rotation".to_string(), step.to_string());
            }
            Orientation::Faces { set, allowed } => {
                for face in allowed.iter() {
                    out.insert(face.name().to_string(), set.contains(face).to_string());
                }
            }
        }
    }
}

/// Faces a directional block of `material` can point at.
///
/// Blocks that aim anywhere get all six, hoppers get down plus the four
/// horizontals, everything else is horizontal only.
pub fn directional_faces(material: &str) -> FaceSet {
    const OMNI: [&str; 11] = [
        "dispenser",
        "dropper",
        "observer",
        "piston",
        "sticky_piston",
        "end_rod",
        "amethyst_cluster",
        "lightning_rod",
        "barrel",
        "command_block",
        "shulker_box",
    ];
    let name = material.rsplit(':').next().unwrap_or(material);
    if OMNI.iter().any(|m| name == *m || name.ends_with(&format!("_{m}")))
        || name.ends_with("amethyst_bud")
    {
        FaceSet::ALL
    } else if name == "hopper" {
        FaceSet::HORIZONTAL.with(BlockFace::Down)
    } else {
        FaceSet::HORIZONTAL
    }
}

/// A material plus its full discrete state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockState {
    material: String,
    orientations: Vec<Orientation>,
    properties: BTreeMap<String, String>,
}

impl BlockState {
    /// A state with no properties.
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into().to_ascii_lowercase(),
            orientations: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn air() -> Self {
        Self::new("air")
    }

    /// Sets a facing, using the shape table for the allowed faces.
    pub fn with_facing(self, facing: BlockFace) -> Self {
        let allowed = directional_faces(&self.material);
        self.with_orientation(Orientation::Directional { facing, allowed })
    }

    pub fn with_axis(self, axis: Axis) -> Self {
        self.with_orientation(Orientation::Axis(axis))
    }

    pub fn with_rotation16(self, step: u8) -> Self {
        self.with_orientation(Orientation::Rotation16(step % 16))
    }

    pub fn with_faces(self, set: FaceSet, allowed: FaceSet) -> Self {
        self.with_orientation(Orientation::Faces { set, allowed })
    }

    /// Adds or replaces the orientation of the same category.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        let rank = orientation.rank();
        self.orientations.retain(|o| o.rank() != rank);
        self.orientations.push(orientation);
        self.orientations.sort_by_key(|o| o.rank());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Material name without namespace, e.g. `oak_stairs`.
    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn orientations(&self) -> &[Orientation] {
        &self.orientations
    }

    pub fn facing(&self) -> Option<BlockFace> {
        self.orientations.iter().find_map(|o| match o {
            Orientation::Directional { facing, .. } => Some(*facing),
            _ => None,
        })
    }

    pub fn axis(&self) -> Option<Axis> {
        self.orientations.iter().find_map(|o| match o {
            Orientation::Axis(axis) => Some(*axis),
            _ => None,
        })
    }

    pub fn rotation16(&self) -> Option<u8> {
        self.orientations.iter().find_map(|o| match o {
            Orientation::Rotation16(step) => Some(*step),
            _ => None,
        })
    }

    pub fn faces(&self) -> Option<FaceSet> {
        self.orientations.iter().find_map(|o| match o {
            Orientation::Faces { set, .. } => Some(*set),
            _ => None,
        })
    }

    /// Value of any property, typed or verbatim, in its string form.
    pub fn property(&self, key: &str) -> Option<String> {
        self.key_values().remove(key)
    }

    /// Rotates every orientation category the state carries.
    pub fn rotated(&self, yaw_degrees: f32) -> BlockState {
        BlockState {
            material: self.material.clone(),
            orientations: self
                .orientations
                .iter()
                .map(|o| o.rotated(yaw_degrees))
                .collect(),
            properties: self.properties.clone(),
        }
    }

    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }

    pub fn parse(s: &str) -> Result<BlockState, StateParseError> {
        s.parse()
    }

    fn key_values(&self) -> BTreeMap<String, String> {
        let mut out = self.properties.clone();
        for orientation in &self.orientations {
            orientation.write_properties(&mut out);
        }
        out
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.material.contains(':') {
            f.write_str(&self.material)?;
        } else {
            write!(f, "{DEFAULT_NAMESPACE}:{}", self.material)?;
        }
        let pairs = self.key_values();
        if pairs.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, (key, value)) in pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("]")
    }
}

impl FromStr for BlockState {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StateParseError::Empty);
        }

        let (name, body) = match s.find('[') {
            Some(open) => {
                let Some(inner) = s[open + 1..].strip_suffix(']') else {
                    return Err(StateParseError::Unterminated(s.to_string()));
                };
                (&s[..open], Some(inner))
            }
            None => (s, None),
        };
        let name = name.strip_prefix("minecraft:").unwrap_or(name);
        if name.is_empty() {
            return Err(StateParseError::Empty);
        }

        let mut raw = BTreeMap::new();
        for pair in body.into_iter().flat_map(|b| b.split(',')).filter(|p| !p.is_empty()) {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(StateParseError::MalformedProperty(pair.to_string()));
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(StateParseError::MalformedProperty(pair.to_string()));
            }
            if raw.insert(key.to_string(), value.to_string()).is_some() {
                return Err(StateParseError::DuplicateKey(key.to_string()));
            }
        }

        let mut state = BlockState::new(name);
        if let Some(value) = raw.remove("facing") {
            let facing = parse_value::<BlockFace>("facing", &value)?;
            state = state.with_facing(facing);
        }
        if let Some(value) = raw.remove("axis") {
            let axis = parse_value::<Axis>("axis", &value)?;
            state = state.with_axis(axis);
        }
        if let Some(value) = raw.remove("rotation") {
            let step = value
                .parse::<u8>()
                .ok()
                .filter(|step| *step < 16)
                .ok_or_else(|| StateParseError::InvalidValue {
                    key: "rotation".to_string(),
                    value: value.clone(),
                })?;
            state = state.with_rotation16(step);
        }

        // Face keys only form a connection set when every one of them is a
        // boolean; walls and redstone use other values and stay verbatim.
        let face_keys: Vec<BlockFace> = BlockFace::ALL
            .into_iter()
            .filter(|face| raw.contains_key(face.name()))
            .collect();
        let all_boolean = face_keys
            .iter()
            .all(|face| matches!(raw.get(face.name()).map(String::as_str), Some("true" | "false")));
        if !face_keys.is_empty() && all_boolean {
            let mut set = FaceSet::EMPTY;
            let mut allowed = FaceSet::EMPTY;
            for face in face_keys {
                allowed.insert(face);
                if raw.remove(face.name()).as_deref() == Some("true") {
                    set.insert(face);
                }
            }
            state = state.with_faces(set, allowed);
        }

        state.properties = raw;
        Ok(state)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, StateParseError> {
    value.parse().map_err(|_| StateParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl TryFrom<String> for BlockState {
    type Error = StateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockState> for String {
    fn from(state: BlockState) -> Self {
        state.to_string()
    }
}
