//! OctreeNode - one cell of the tree, stored in the tree's arena.
//!
//! Children are owned through arena handles; the parent link is a plain
//! handle that never owns anything.

use smallvec::SmallVec;

use crate::bounds::DAabb3;

/// Handle to a node in an [`Octree`](crate::Octree) arena.
///
/// Handles stay valid while the node is alive; a freed slot may be reused by
/// a later node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
  /// Arena slot index.
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// A node of the octree.
#[derive(Clone, Debug)]
pub struct OctreeNode<T> {
  pub(crate) bound: DAabb3,
  pub(crate) octant_bounds: [DAabb3; 8],
  pub(crate) objects: Vec<T>,
  pub(crate) children: [Option<NodeId>; 8],
  pub(crate) active_mask: u8,
  pub(crate) parent: Option<NodeId>,
  pub(crate) built: bool,
}

impl<T> OctreeNode<T> {
  /// Create an unbuilt node with the given bound and items.
  pub(crate) fn new(bound: DAabb3, objects: Vec<T>, parent: Option<NodeId>) -> Self {
    Self {
      bound,
      octant_bounds: bound.octants(),
      objects,
      children: [None; 8],
      active_mask: 0,
      parent,
      built: false,
    }
  }

  /// Replace the bound and refresh the cached octants.
  pub(crate) fn set_bound(&mut self, bound: DAabb3) {
    self.bound = bound;
    self.octant_bounds = bound.octants();
  }

  /// Occupy child slot `octant`, keeping the mask in sync.
  pub(crate) fn set_child(&mut self, octant: usize, child: NodeId) {
    self.children[octant] = Some(child);
    self.active_mask |= 1 << octant;
  }

  /// Clear child slot `octant`, keeping the mask in sync.
  pub(crate) fn clear_child(&mut self, octant: usize) -> Option<NodeId> {
    self.active_mask &= !(1 << octant);
    self.children[octant].take()
  }

  /// Slot index holding `child`, if any.
  pub(crate) fn octant_of_child(&self, child: NodeId) -> Option<usize> {
    self.children.iter().position(|c| *c == Some(child))
  }

  /// Spatial extent of this node.
  #[inline]
  pub fn bound(&self) -> &DAabb3 {
    &self.bound
  }

  /// The 8 sub-boxes of `bound`, split at its center.
  #[inline]
  pub fn octant_bounds(&self) -> &[DAabb3; 8] {
    &self.octant_bounds
  }

  /// Items held directly by this node.
  #[inline]
  pub fn objects(&self) -> &[T] {
    &self.objects
  }

  /// Child in slot `octant` (0-7).
  #[inline]
  pub fn child(&self, octant: usize) -> Option<NodeId> {
    self.children.get(octant).copied().flatten()
  }

  /// Occupied child slots in octant order.
  pub fn children(&self) -> SmallVec<[NodeId; 8]> {
    self.children.iter().flatten().copied().collect()
  }

  /// Bit `i` is set iff child slot `i` is occupied.
  #[inline]
  pub fn active_mask(&self) -> u8 {
    self.active_mask
  }

  /// Whether any child slot is occupied.
  #[inline]
  pub fn has_children(&self) -> bool {
    self.active_mask != 0
  }

  /// Parent handle; `None` only for the root.
  #[inline]
  pub fn parent(&self) -> Option<NodeId> {
    self.parent
  }

  /// Whether this node's own subdivision pass has run.
  #[inline]
  pub fn is_built(&self) -> bool {
    self.built
  }

  /// No children and no items.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.active_mask == 0 && self.objects.is_empty()
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
