//! Rays and ray query descriptions.

use glam::{DAffine3, DVec3};

use crate::sphere::BoundingSphere;

/// Half-line with a unit direction, so ray parameters are distances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
  /// Ray origin.
  pub origin: DVec3,
  /// Unit direction (zero for a degenerate ray).
  pub direction: DVec3,
}

impl Ray {
  /// Create a ray; `direction` is normalized.
  pub fn new(origin: DVec3, direction: DVec3) -> Self {
    Self {
      origin,
      direction: direction.normalize_or_zero(),
    }
  }

  /// Ray from `from` through `to`.
  pub fn through(from: DVec3, to: DVec3) -> Self {
    Self::new(from, to - from)
  }

  /// Point at distance `t` along the ray.
  #[inline]
  pub fn at(&self, t: f64) -> DVec3 {
    self.origin + self.direction * t
  }

  /// Map the ray through an affine transform (direction re-normalized).
  pub fn transformed(&self, transform: &DAffine3) -> Ray {
    Ray::new(
      transform.transform_point3(self.origin),
      transform.transform_vector3(self.direction),
    )
  }
}

/// A ray hit-test request against one tree.
///
/// The ray is in world space. When `model_transform` is set the tree's items
/// live in model space: the ray is moved into model space for the walk, and
/// reported hit points, normals and distances are mapped back to world space.
/// `model_sphere` (model space) rejects the whole query up front when the ray
/// misses it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayQuery {
  /// World-space ray.
  pub ray: Ray,
  /// Model-to-world transform of the indexed geometry.
  pub model_transform: Option<DAffine3>,
  /// Model-level bounding sphere filter.
  pub model_sphere: Option<BoundingSphere>,
}

impl RayQuery {
  /// Query in the tree's own space with no sphere filter.
  pub fn new(ray: Ray) -> Self {
    Self {
      ray,
      model_transform: None,
      model_sphere: None,
    }
  }

  /// Set the model-to-world transform.
  pub fn with_transform(mut self, transform: DAffine3) -> Self {
    self.model_transform = Some(transform);
    self
  }

  /// Set the model-level bounding sphere.
  pub fn with_sphere(mut self, sphere: BoundingSphere) -> Self {
    self.model_sphere = Some(sphere);
    self
  }

  /// The ray expressed in model space.
  pub fn local_ray(&self) -> Ray {
    match &self.model_transform {
      Some(m) => self.ray.transformed(&m.inverse()),
      None => self.ray,
    }
  }
}

impl From<Ray> for RayQuery {
  fn from(ray: Ray) -> Self {
    Self::new(ray)
  }
}
