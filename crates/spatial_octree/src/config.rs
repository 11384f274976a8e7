//! BuildParams - immutable-per-tree configuration for subdivision and
//! bookkeeping policy.

use crate::bounds::DAabb3;
use crate::error::OctreeError;

/// Configuration shared by every node of one tree.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildParams {
  /// A node only splits while its bound is at least this large on some axis.
  pub minimum_octant_size: f64,

  /// A node only splits while it holds more than this many items.
  pub min_object_size_to_split: usize,

  /// Replace the root bound with its enclosing cube before building.
  pub cubify: bool,

  /// Empty non-root nodes detach themselves after a removal.
  pub auto_delete_if_empty: bool,

  /// Record node bounds along the path to each successful hit (diagnostic).
  pub record_hit_path: bool,
}

impl BuildParams {
  /// Default parameters.
  pub const DEFAULT: Self = Self {
    minimum_octant_size: 1.0,
    min_object_size_to_split: 2,
    cubify: false,
    auto_delete_if_empty: true,
    record_hit_path: false,
  };

  /// Default parameters with equal-sized octants.
  pub const CUBIFIED: Self = Self {
    cubify: true,
    ..Self::DEFAULT
  };

  /// Reject parameters that would make termination ill-defined.
  pub fn validate(&self) -> Result<(), OctreeError> {
    if !(self.minimum_octant_size.is_finite() && self.minimum_octant_size > 0.0) {
      return Err(OctreeError::InvalidParams(
        "minimum_octant_size must be finite and > 0",
      ));
    }
    if self.min_object_size_to_split == 0 {
      return Err(OctreeError::InvalidParams(
        "min_object_size_to_split must be >= 1",
      ));
    }
    Ok(())
  }

  /// Whether a bound is large enough to split.
  ///
  /// Zero-size bounds never split; otherwise at least one axis must reach
  /// `minimum_octant_size`.
  #[inline]
  pub fn exceeds_minimum_size(&self, bound: &DAabb3) -> bool {
    if bound.is_degenerate() {
      return false;
    }
    let size = bound.size();
    size.x >= self.minimum_octant_size
      || size.y >= self.minimum_octant_size
      || size.z >= self.minimum_octant_size
  }

  /// Both split conditions: item count above threshold and bound large enough.
  #[inline]
  pub fn should_split(&self, object_count: usize, bound: &DAabb3) -> bool {
    object_count > self.min_object_size_to_split && self.exceeds_minimum_size(bound)
  }
}

impl Default for BuildParams {
  fn default() -> Self {
    Self::DEFAULT
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
