//! Shared fixtures and structural checks for the unit tests.

use std::collections::HashSet;

use glam::DVec3;

use crate::bounds::DAabb3;
use crate::items::BoundedItem;
use crate::tree::Octree;

pub(crate) type Item = BoundedItem<u32>;

/// Axis-aligned cube with its min corner at `min`.
pub(crate) fn cube(key: u32, min: DVec3, size: f64) -> Item {
  BoundedItem::new(key, DAabb3::new(min, min + DVec3::splat(size))).unwrap()
}

/// 100 unit cubes on a 5 x 5 x 4 grid with spacing 10.
pub(crate) fn grid_cubes() -> Vec<Item> {
  let mut items = Vec::with_capacity(100);
  for z in 0..4 {
    for y in 0..5 {
      for x in 0..5 {
        let key = items.len() as u32;
        let min = DVec3::new(x as f64, y as f64, z as f64) * 10.0;
        items.push(cube(key, min, 1.0));
      }
    }
  }
  items
}

/// Check parent links, mask consistency, child bounds, containment of items
/// and the placement rule for split nodes. Also checks that every item is
/// held by exactly one node.
pub(crate) fn assert_tree_invariants(tree: &Octree<Item>) {
  let root = tree.root();
  assert_eq!(tree[root].parent(), None, "root has no parent");

  let mut keys = HashSet::new();
  for id in tree.node_ids() {
    let node = &tree[id];

    for (octant, slot) in node.children.iter().enumerate() {
      let bit = node.active_mask() & (1 << octant) != 0;
      assert_eq!(bit, slot.is_some(), "mask bit {octant} out of sync at {id:?}");
      if let Some(child) = slot {
        let child_node = tree.node(*child).expect("child slot points at a live node");
        assert_eq!(child_node.parent(), Some(id), "parent link of {child:?}");
        assert!(
          node.octant_bounds()[octant].fully_contains(child_node.bound()),
          "child {child:?} lies inside octant {octant} of {id:?}"
        );
      }
    }

    for item in node.objects() {
      if id != root {
        assert!(
          node.bound().fully_contains(&item.bound),
          "item {} outside node {id:?}",
          item.key
        );
      }
      if node.has_children() {
        assert!(
          !node.octant_bounds().iter().any(|o| o.fully_contains(&item.bound)),
          "item {} fits an octant of split node {id:?} but stayed",
          item.key
        );
      }
      assert!(keys.insert(item.key), "item {} held twice", item.key);
    }
  }
  assert_eq!(keys.len(), tree.len(), "every item reachable from the root");
}
