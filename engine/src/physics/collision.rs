//! Cell colliders and ray picking
//!
//! Every solid cell of a structure gets an axis-aligned box. Boxes refer back
//! to their cell by index, so a hit tells the caller which cell was picked
//! (a seat to sit in, a chest to open) without holding references into the
//! model.
//!
//! # Ray-AABB Intersection
//!
//! The slab method is used: entry and exit times are computed per axis and
//! the ray hits when the latest entry comes before the earliest exit.

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Cube of edge `size` centered on `center`.
    pub fn cube(center: Vec3, size: f32) -> Self {
        let half = Vec3::splat(size * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Smallest box holding both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Performs ray-AABB intersection using the slab method.
///
/// # Arguments
///
/// * `ray_origin` - Starting point of the ray
/// * `ray_dir` - Direction of the ray (must be normalized)
/// * `aabb_min` - Minimum corner of the AABB
/// * `aabb_max` - Maximum corner of the AABB
///
/// # Returns
///
/// * `Some(t)` - Distance along the ray to the intersection point (t >= 0)
/// * `None` - No intersection or intersection is behind the ray origin
pub fn ray_aabb_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    // Near-zero direction components get a huge inverse so the slab is
    // either always or never crossed
    let inv = |d: f32| if d.abs() > 1e-10 { 1.0 / d } else { f32::MAX * d.signum() };
    let inv_dir = Vec3::new(inv(ray_dir.x), inv(ray_dir.y), inv(ray_dir.z));

    let t1 = (aabb_min - ray_origin) * inv_dir;
    let t2 = (aabb_max - ray_origin) * inv_dir;

    let t_min = t1.min(t2).max_element();
    let t_max = t1.max(t2).min_element();

    if t_max >= t_min && t_max >= 0.0 {
        // Ray starting inside the box reports its exit
        Some(if t_min >= 0.0 { t_min } else { t_max })
    } else {
        None
    }
}

/// Outward normal of the AABB face closest to `point`.
pub fn aabb_surface_normal(point: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Vec3 {
    let center = (aabb_min + aabb_max) * 0.5;
    let half_extents = (aabb_max - aabb_min) * 0.5;
    let normalized = (point - center) / half_extents;
    let abs = normalized.abs();

    if abs.x >= abs.y && abs.x >= abs.z {
        Vec3::new(normalized.x.signum(), 0.0, 0.0)
    } else if abs.y >= abs.z {
        Vec3::new(0.0, normalized.y.signum(), 0.0)
    } else {
        Vec3::new(0.0, 0.0, normalized.z.signum())
    }
}

/// Box belonging to one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellCollider {
    pub cell_index: usize,
    pub bounds: Aabb,
}

/// Result of picking a cell with a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellHit {
    pub cell_index: usize,
    pub position: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Colliders of one structure, in structure-local space.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    colliders: Vec<CellCollider>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cell_index: usize, bounds: Aabb) {
        self.colliders.push(CellCollider { cell_index, bounds });
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellCollider> {
        self.colliders.iter()
    }

    /// Box enclosing every collider, `None` when the set is empty.
    pub fn bounds(&self) -> Option<Aabb> {
        self.colliders
            .iter()
            .map(|c| c.bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Nearest cell hit by the ray within `max_distance`.
    pub fn ray_cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<CellHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        self.colliders
            .iter()
            .filter_map(|c| {
                let t = ray_aabb_intersect(origin, direction, c.bounds.min, c.bounds.max)?;
                (t <= max_distance).then_some((c, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, t)| {
                let position = origin + direction * t;
                CellHit {
                    cell_index: c.cell_index,
                    position,
                    normal: aabb_surface_normal(position, c.bounds.min, c.bounds.max),
                    distance: t,
                }
            })
    }
}
