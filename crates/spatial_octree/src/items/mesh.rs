//! Triangle soup items.

use glam::DVec3;

use super::check_finite;
use crate::bounds::DAabb3;
use crate::error::OctreeError;
use crate::item::{OctreeItem, RayHit};
use crate::ray::Ray;

/// Determinant threshold below which a ray counts as parallel to a face.
const PARALLEL_EPSILON: f64 = 1e-12;

/// One mesh triangle with its index in the source mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
  /// Triangle index in the source index buffer (triangle `i` uses
  /// indices `3i..3i+3`).
  pub index: usize,
  /// Corner positions in winding order.
  pub vertices: [DVec3; 3],
}

impl Triangle {
  /// Create a triangle, rejecting non-finite corners.
  pub fn new(index: usize, vertices: [DVec3; 3]) -> Result<Self, OctreeError> {
    for v in vertices {
      check_finite(v)?;
    }
    Ok(Self { index, vertices })
  }

  /// Unnormalized face normal following the winding order.
  #[inline]
  pub fn face_normal(&self) -> DVec3 {
    let [a, b, c] = self.vertices;
    (b - a).cross(c - a)
  }

  /// Closest point of the triangle to `p` (Ericson, Real-Time Collision
  /// Detection, 5.1.5).
  pub fn closest_point(&self, p: DVec3) -> DVec3 {
    let [a, b, c] = self.vertices;
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
      return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
      return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
      return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
      return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
      return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
      return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    // Face region; a zero denominator only happens for collapsed triangles,
    // which the edge cases above already cover.
    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
  }
}

impl OctreeItem for Triangle {
  fn bbox(&self) -> DAabb3 {
    let [a, b, c] = self.vertices;
    DAabb3::new(a.min(b).min(c), a.max(b).max(c))
  }

  /// Two-sided Möller-Trumbore. The reported normal faces the ray.
  fn ray_intersect(&self, ray: &Ray) -> Option<RayHit> {
    let [v0, v1, v2] = self.vertices;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < PARALLEL_EPSILON {
      return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray.origin - v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
      return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
      return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < 0.0 {
      return None;
    }

    let mut normal = edge1.cross(edge2).normalize_or_zero();
    if normal.dot(ray.direction) > 0.0 {
      normal = -normal;
    }
    Some(RayHit {
      distance: t,
      point: ray.at(t),
      normal,
    })
  }

  fn sphere_distance(&self, center: DVec3) -> (DVec3, f64) {
    let closest = self.closest_point(center);
    (closest, closest.distance(center))
  }
}

/// Build a triangle soup from a position buffer and a triangle list index
/// buffer.
///
/// Trailing indices that do not form a full triangle are ignored.
pub fn triangles_from_indexed(
  positions: &[DVec3],
  indices: &[u32],
) -> Result<Vec<Triangle>, OctreeError> {
  let len = positions.len();
  indices
    .chunks_exact(3)
    .enumerate()
    .map(|(index, tri)| {
      let mut vertices = [DVec3::ZERO; 3];
      for (corner, &i) in vertices.iter_mut().zip(tri) {
        let i = i as usize;
        *corner = *positions
          .get(i)
          .ok_or(OctreeError::IndexOutOfRange { index: i, len })?;
      }
      Triangle::new(index, vertices)
    })
    .collect()
}
