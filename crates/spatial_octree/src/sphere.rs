//! Bounding sphere used as a query volume and as a model-level ray filter.

use glam::DVec3;

use crate::ray::Ray;

/// Sphere given by center and radius. An infinite radius covers everything.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
  /// Sphere center.
  pub center: DVec3,
  /// Sphere radius (non-negative, may be `f64::INFINITY`).
  pub radius: f64,
}

impl BoundingSphere {
  /// Create a sphere from center and radius.
  pub fn new(center: DVec3, radius: f64) -> Self {
    debug_assert!(radius >= 0.0, "sphere radius must be non-negative");
    Self { center, radius }
  }

  /// Sphere that contains all of space, used to seed nearest-point search.
  pub fn infinite(center: DVec3) -> Self {
    Self {
      center,
      radius: f64::INFINITY,
    }
  }

  /// Check if the sphere contains a point (boundary inclusive).
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    self.radius.is_infinite() || self.center.distance_squared(point) <= self.radius * self.radius
  }

  /// Whether the ray passes through the sphere at a non-negative parameter.
  pub fn intersects_ray(&self, ray: &Ray) -> bool {
    if self.radius.is_infinite() {
      return true;
    }
    let to_center = self.center - ray.origin;
    let r2 = self.radius * self.radius;
    if to_center.length_squared() <= r2 {
      return true;
    }
    let along = to_center.dot(ray.direction);
    if along < 0.0 {
      return false;
    }
    let closest = ray.origin + ray.direction * along;
    closest.distance_squared(self.center) <= r2
  }
}
