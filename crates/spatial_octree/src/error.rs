//! Error type for fallible octree operations.
//!
//! Expected outcomes (an add that lands outside the root, a remove that finds
//! nothing) are plain `bool` returns, not errors.

use glam::DVec3;

use crate::node::NodeId;

/// Errors reported by tree construction, adapters and structural operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OctreeError {
  /// `expand`/`shrink` called on a node that has a parent.
  #[error("node {0:?} is not the root; expand and shrink only apply to the root")]
  NotRoot(NodeId),

  /// Handle does not refer to a live node.
  #[error("node {0:?} does not exist in this tree")]
  UnknownNode(NodeId),

  /// Bounding box with NaN/infinite coordinates or min > max.
  #[error("invalid bounding box: min {min}, max {max}")]
  InvalidBounds {
    /// Offending minimum corner.
    min: DVec3,
    /// Offending maximum corner.
    max: DVec3,
  },

  /// Build parameter outside its domain.
  #[error("invalid build parameters: {0}")]
  InvalidParams(&'static str),

  /// Index buffer references a vertex that does not exist.
  #[error("index {index} out of range for {len} vertices")]
  IndexOutOfRange {
    /// Offending index.
    index: usize,
    /// Vertex count.
    len: usize,
  },

  /// Item still outside the root after the bounded number of expansions.
  #[error("item outside tree bounds after {attempts} expansions")]
  ExpandLimitExceeded {
    /// Expansions attempted.
    attempts: usize,
  },
}
