//! Buoyancy estimation
//!
//! Decides how high a rigid voxel structure rides in water from its mean
//! density and vertical extent. No simulation; one closed-form waterline.
//!
//! With `t = (mean - air) / (water - air)` the waterline sits at
//! `min_y + t * (cov_y - min_y)`:
//!
//! - `t < 0`: lighter than air, the structure rises (airship)
//! - `0 <= t < 1`: floats with the waterline between keel and center
//! - `t >= 1`: sits at or below its center of volume
//!
//! The float offset is the negated waterline, so adding it to the water
//! surface height gives the origin height that puts the waterline on the
//! surface.

/// Offset used when nothing in the structure carries mass.
pub const DEFAULT_FALLBACK_OFFSET: f32 = 0.25;

/// Mass summary of a structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuoyancyInput {
    /// Signed sum of every reported mass
    pub total_mass: f64,
    /// Number of cells that reported a mass
    pub massed_cell_count: usize,
    /// Y of the center of volume, relative to the origin cell
    pub center_of_volume_y: f64,
    /// Lowest cell Y, relative to the origin cell
    pub min_y: f64,
}

/// How a structure settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatRegime {
    Airship,
    Floating,
    Sinking,
    /// No mass-bearing cells; the fallback offset applies.
    Unweighted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuoyancyEstimate {
    /// Vertical offset from the water surface to the structure origin
    pub offset: f32,
    /// Interpolation factor `t`, absent when unweighted
    pub factor: Option<f64>,
    /// Mean density of the mass-bearing cells
    pub mean_density: Option<f64>,
}

impl BuoyancyEstimate {
    pub fn regime(&self) -> FloatRegime {
        match self.factor {
            None => FloatRegime::Unweighted,
            Some(t) if t < 0.0 => FloatRegime::Airship,
            Some(t) if t < 1.0 => FloatRegime::Floating,
            Some(_) => FloatRegime::Sinking,
        }
    }

    /// Replaces the offset of an unweighted estimate.
    pub fn with_fallback(mut self, fallback_offset: f32) -> Self {
        if self.factor.is_none() {
            self.offset = fallback_offset;
        }
        self
    }
}

/// Computes the float offset for a structure.
///
/// `air_density` must be below `water_density`; equal densities are treated
/// as `t = 0`.
pub fn estimate_buoyancy(input: &BuoyancyInput, air_density: f32, water_density: f32) -> BuoyancyEstimate {
    if input.massed_cell_count == 0 {
        return BuoyancyEstimate {
            offset: DEFAULT_FALLBACK_OFFSET,
            factor: None,
            mean_density: None,
        };
    }

    let (air, water) = (air_density as f64, water_density as f64);
    let mean = input.total_mass / input.massed_cell_count as f64;
    let span = water - air;
    let t = if span.abs() > f64::EPSILON { (mean - air) / span } else { 0.0 };
    let waterline = input.min_y + t * (input.center_of_volume_y - input.min_y);

    BuoyancyEstimate {
        offset: -waterline as f32,
        factor: Some(t),
        mean_density: Some(mean),
    }
}
