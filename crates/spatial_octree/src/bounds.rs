//! Axis-aligned bounding box with double precision.
//!
//! Node bounds, octant bounds and item bounds all use [`DAabb3`]. The
//! containment test distinguishes "fully inside" from "merely touching" so
//! the partition step can keep straddling items at the parent level.

use glam::DVec3;

use crate::ray::Ray;
use crate::sphere::BoundingSphere;

/// Result of testing one box against another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
  /// No shared points.
  Disjoint,
  /// Overlapping (or touching) but not fully inside.
  Intersects,
  /// Fully inside (boundary inclusive).
  Contains,
}

/// Double-precision axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DAabb3 {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl DAabb3 {
  /// Zero-size box at the origin. Degenerate by definition.
  pub const ZERO: Self = Self {
    min: DVec3::ZERO,
    max: DVec3::ZERO,
  };

  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create a new AABB from center and half-extents.
  pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// Smallest box enclosing all points. `None` for an empty iterator.
  pub fn from_points<I: IntoIterator<Item = DVec3>>(points: I) -> Option<Self> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let mut aabb = Self {
      min: first,
      max: first,
    };
    for p in iter {
      aabb.encapsulate(p);
    }
    Some(aabb)
  }

  /// Box of a single point (zero size).
  #[inline]
  pub fn from_point(point: DVec3) -> Self {
    Self {
      min: point,
      max: point,
    }
  }

  /// Grow to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: DVec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Smallest box enclosing both.
  #[inline]
  pub fn union(&self, other: &DAabb3) -> DAabb3 {
    DAabb3 {
      min: self.min.min(other.min),
      max: self.max.max(other.max),
    }
  }

  /// Both corners finite and ordered.
  pub fn is_valid(&self) -> bool {
    self.min.is_finite()
      && self.max.is_finite()
      && self.min.x <= self.max.x
      && self.min.y <= self.max.y
      && self.min.z <= self.max.z
  }

  /// Zero-size box (min == max).
  #[inline]
  pub fn is_degenerate(&self) -> bool {
    self.min == self.max
  }

  /// Check if this AABB overlaps with another.
  ///
  /// Two AABBs overlap if they share any interior or boundary points.
  #[inline]
  pub fn overlaps(&self, other: &DAabb3) -> bool {
    self.min.x <= other.max.x
      && self.max.x >= other.min.x
      && self.min.y <= other.max.y
      && self.max.y >= other.min.y
      && self.min.z <= other.max.z
      && self.max.z >= other.min.z
  }

  /// Check if this AABB contains a point.
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Classify `other` against this box.
  #[inline]
  pub fn contains(&self, other: &DAabb3) -> Containment {
    if !self.overlaps(other) {
      Containment::Disjoint
    } else if self.contains_point(other.min) && self.contains_point(other.max) {
      Containment::Contains
    } else {
      Containment::Intersects
    }
  }

  /// Shorthand for `contains(other) == Containment::Contains`.
  #[inline]
  pub fn fully_contains(&self, other: &DAabb3) -> bool {
    self.contains(other) == Containment::Contains
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> DVec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }

  /// Smallest cube sharing this box's center.
  pub fn cubify(&self) -> DAabb3 {
    let half = self.size().max_element() * 0.5;
    Self::from_center_half_extents(self.center(), DVec3::splat(half))
  }

  /// Split at the center into 8 octants.
  ///
  /// Octant bits: X (bit 0), Y (bit 1), Z (bit 2); a set bit selects the
  /// upper half on that axis.
  pub fn octants(&self) -> [DAabb3; 8] {
    let center = self.center();
    std::array::from_fn(|octant| {
      let hi_x = octant & 1 != 0;
      let hi_y = octant & 2 != 0;
      let hi_z = octant & 4 != 0;
      DAabb3 {
        min: DVec3::new(
          if hi_x { center.x } else { self.min.x },
          if hi_y { center.y } else { self.min.y },
          if hi_z { center.z } else { self.min.z },
        ),
        max: DVec3::new(
          if hi_x { self.max.x } else { center.x },
          if hi_y { self.max.y } else { center.y },
          if hi_z { self.max.z } else { center.z },
        ),
      }
    })
  }

  /// Closest point of the box to `point` (the point itself when inside).
  #[inline]
  pub fn closest_point(&self, point: DVec3) -> DVec3 {
    point.clamp(self.min, self.max)
  }

  /// Squared distance from `point` to the box, zero inside.
  #[inline]
  pub fn distance_squared_to_point(&self, point: DVec3) -> f64 {
    self.closest_point(point).distance_squared(point)
  }

  /// Whether the sphere touches the box.
  #[inline]
  pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
    if sphere.radius.is_infinite() {
      return true;
    }
    self.distance_squared_to_point(sphere.center) <= sphere.radius * sphere.radius
  }

  /// Slab test. Returns the entry parameter along the ray, clamped to 0 when
  /// the origin is inside, or `None` on a miss.
  pub fn ray_entry(&self, ray: &Ray) -> Option<f64> {
    self.ray_entry_axis(ray).map(|(t, _)| t)
  }

  /// Whether the ray touches the box at a non-negative parameter.
  #[inline]
  pub fn intersects_ray(&self, ray: &Ray) -> bool {
    self.ray_entry(ray).is_some()
  }

  /// Slab test that also reports which axis produced the entry point
  /// (`None` when the origin is inside the box).
  pub fn ray_entry_axis(&self, ray: &Ray) -> Option<(f64, Option<usize>)> {
    let mut t_min = 0.0_f64;
    let mut t_max = f64::INFINITY;
    let mut entry_axis = None;

    for axis in 0..3 {
      let origin = ray.origin[axis];
      let dir = ray.direction[axis];
      let (lo, hi) = (self.min[axis], self.max[axis]);

      if dir == 0.0 {
        if origin < lo || origin > hi {
          return None;
        }
        continue;
      }

      let inv = 1.0 / dir;
      let mut t0 = (lo - origin) * inv;
      let mut t1 = (hi - origin) * inv;
      if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
      }
      if t0 > t_min {
        t_min = t0;
        entry_axis = Some(axis);
      }
      t_max = t_max.min(t1);
      if t_min > t_max {
        return None;
      }
    }

    Some((t_min, entry_axis))
  }

  /// Apply an affine transform, returning the box around the 8 moved corners.
  pub fn transformed(&self, transform: &glam::DAffine3) -> DAabb3 {
    let corners = (0..8).map(|i| {
      DVec3::new(
        if i & 1 == 0 { self.min.x } else { self.max.x },
        if i & 2 == 0 { self.min.y } else { self.max.y },
        if i & 4 == 0 { self.min.z } else { self.max.z },
      )
    });
    // 8 corners, never empty
    Self::from_points(corners.map(|c| transform.transform_point3(c))).unwrap_or(*self)
  }
}

impl Default for DAabb3 {
  fn default() -> Self {
    Self::ZERO
  }
}

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;
