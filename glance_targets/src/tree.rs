// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, queries.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::resolve::HitTest;
use crate::types::{NodeFlags, NodeId, TargetNode};

/// Retained set of UI regions, some of which are selectable targets.
///
/// Each region may carry a target id `K`. Ids are unique within a tree: tagging
/// a second region with an id that is already in use moves the id to the new
/// region and untags the old one.
///
/// Unlike a scene graph, bounds are already in world space; there are no local
/// transforms or clips and updates take effect immediately.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use glance_targets::{HitTest, NodeFlags, TargetNode, TargetTree};
///
/// let mut tree = TargetTree::new();
/// let cell = tree.insert(
///     None,
///     TargetNode {
///         bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
///         target: Some(7_u32),
///         ..TargetNode::default()
///     },
/// );
/// // An untagged label inside the cell resolves to the cell.
/// tree.insert(
///     Some(cell),
///     TargetNode {
///         bounds: Rect::new(10.0, 70.0, 90.0, 90.0),
///         ..TargetNode::default()
///     },
/// );
/// assert_eq!(tree.hit_test(Point::new(50.0, 80.0)), Some(7));
///
/// tree.set_flags(cell, NodeFlags::PICKABLE);
/// assert_eq!(tree.hit_test(Point::new(50.0, 80.0)), None, "hidden cells hide their children");
/// ```
pub struct TargetTree<K> {
    /// slots
    nodes: Vec<Option<Slot<K>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    by_target: HashMap<K, NodeId>,
}

impl<K> core::fmt::Debug for TargetTree<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("TargetTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("targets", &self.by_target.len())
            .finish_non_exhaustive()
    }
}

impl<K: Clone + Eq + Hash> Default for TargetTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Slot<K> {
    generation: u32,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    node: TargetNode<K>,
}

impl<K: Clone + Eq + Hash> TargetTree<K> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            by_target: HashMap::new(),
        }
    }

    /// Insert a region as a child of `parent` (or as a root if `None` or stale).
    pub fn insert(&mut self, parent: Option<NodeId>, node: TargetNode<K>) -> NodeId {
        let target = node.target.clone();
        let slot = |generation| Slot {
            generation,
            parent: None,
            children: SmallVec::new(),
            node,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(slot(generation));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(slot(generation)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent
            && self.is_alive(p)
        {
            self.slot_mut(id).parent = Some(p);
            self.slot_mut(p).children.push(id);
        }
        if let Some(target) = target {
            self.register(target, id);
        }
        id
    }

    /// Remove a region and its subtree. Target ids carried by the subtree are released.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.slot(id).parent {
            self.slot_mut(parent).children.retain(|c| *c != id);
        }
        let children = self.slot(id).children.clone();
        for child in children {
            self.remove(child);
        }
        if let Some(slot) = self.nodes[id.idx()].take()
            && let Some(target) = slot.node.target
        {
            self.unregister(&target, id);
        }
        self.free_list.push(id.idx());
    }

    /// Update world-space bounds.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(slot) = self.slot_opt_mut(id) {
            slot.node.bounds = bounds;
        }
    }

    /// Update the stacking order.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        if let Some(slot) = self.slot_opt_mut(id) {
            slot.node.z_index = z;
        }
    }

    /// Update flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(slot) = self.slot_opt_mut(id) {
            slot.node.flags = flags;
        }
    }

    /// Tag (or untag with `None`) a region. Returns the previous tag.
    pub fn set_target(&mut self, id: NodeId, target: Option<K>) -> Option<K> {
        if !self.is_alive(id) {
            return None;
        }
        let previous = core::mem::replace(&mut self.slot_mut(id).node.target, target.clone());
        if let Some(old) = &previous {
            self.unregister(old, id);
        }
        if let Some(new) = target {
            self.register(new, id);
        }
        previous
    }

    /// Returns true if `id` refers to a live region.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.generation())
    }

    /// Number of live regions.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Returns true if the tree holds no live regions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the parent of a region, or `None` for roots and stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.slot_opt(id).and_then(|s| s.parent)
    }

    /// Returns the children of a region, or an empty slice for stale ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.slot_opt(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// Returns the region data if `id` is live.
    pub fn get(&self, id: NodeId) -> Option<&TargetNode<K>> {
        self.slot_opt(id).map(|s| &s.node)
    }

    /// Returns the target id carried by a region.
    pub fn target_of(&self, id: NodeId) -> Option<&K> {
        self.get(id).and_then(|n| n.target.as_ref())
    }

    /// Returns the region currently tagged with `target`.
    pub fn node_of(&self, target: &K) -> Option<NodeId> {
        self.by_target.get(target).copied()
    }

    /// Returns true if some live region is tagged with `target`.
    ///
    /// Activators use this to detect targets that left the tree between the
    /// start of a dwell and its completion.
    pub fn contains_target(&self, target: &K) -> bool {
        self.by_target.contains_key(target)
    }

    /// Returns the topmost visible, pickable region containing `point`.
    ///
    /// Among candidates, higher `z_index` wins; if `z_index` ties, deeper regions
    /// win; if that also ties, the newer [`NodeId`] wins. A region whose ancestor
    /// is hidden is not a candidate.
    pub fn hit_test_node(&self, point: Point) -> Option<NodeId> {
        let mut best: Option<(NodeId, i32, usize)> = None;
        for (i, slot) in self.nodes.iter().enumerate() {
            let Some(slot) = slot else {
                continue;
            };
            let flags = slot.node.flags;
            if !flags.contains(NodeFlags::VISIBLE | NodeFlags::PICKABLE)
                || !slot.node.bounds.contains(point)
            {
                continue;
            }
            let Some(depth) = self.visible_depth(slot) else {
                continue;
            };
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let id = NodeId::new(i as u32, slot.generation);
            let z = slot.node.z_index;
            let better = match best {
                None => true,
                Some((id_best, z_best, depth_best)) => {
                    z > z_best
                        || (z == z_best
                            && (depth > depth_best
                                || (depth == depth_best && id_is_newer(id, id_best))))
                }
            };
            if better {
                best = Some((id, z, depth));
            }
        }
        best.map(|(id, _, _)| id)
    }

    /// Walk from `id` towards the root and return the first tagged region (inclusive).
    pub fn tagged_ancestor(&self, id: NodeId) -> Option<(NodeId, &K)> {
        let mut current = Some(id);
        while let Some(node) = current {
            let slot = self.slot_opt(node)?;
            if let Some(target) = &slot.node.target {
                return Some((node, target));
            }
            current = slot.parent;
        }
        None
    }

    /// Bounds of a region if live.
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.get(id).map(|n| n.bounds)
    }

    // --- internals ---

    /// Depth below the root, or `None` if some ancestor is hidden.
    fn visible_depth(&self, slot: &Slot<K>) -> Option<usize> {
        let mut depth = 0;
        let mut current = slot.parent;
        while let Some(parent) = current {
            let p = self.slot_opt(parent)?;
            if !p.node.flags.contains(NodeFlags::VISIBLE) {
                return None;
            }
            depth += 1;
            current = p.parent;
        }
        Some(depth)
    }

    fn register(&mut self, target: K, id: NodeId) {
        if let Some(previous) = self.by_target.insert(target, id)
            && previous != id
            && let Some(slot) = self.slot_opt_mut(previous)
        {
            slot.node.target = None;
        }
    }

    fn unregister(&mut self, target: &K, id: NodeId) {
        if self.by_target.get(target) == Some(&id) {
            self.by_target.remove(target);
        }
    }

    fn slot_opt(&self, id: NodeId) -> Option<&Slot<K>> {
        self.nodes
            .get(id.idx())
            .and_then(|s| s.as_ref())
            .filter(|s| s.generation == id.generation())
    }

    fn slot_opt_mut(&mut self, id: NodeId) -> Option<&mut Slot<K>> {
        self.nodes
            .get_mut(id.idx())
            .and_then(|s| s.as_mut())
            .filter(|s| s.generation == id.generation())
    }

    /// Access a slot; panics if `id` is stale.
    fn slot(&self, id: NodeId) -> &Slot<K> {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a slot mutably; panics if `id` is stale.
    fn slot_mut(&mut self, id: NodeId) -> &mut Slot<K> {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }
}

#[inline]
fn id_is_newer(a: NodeId, b: NodeId) -> bool {
    (a.1 > b.1) || (a.1 == b.1 && a.0 > b.0)
}

impl<K: Clone + Eq + Hash> HitTest<K> for TargetTree<K> {
    /// Topmost region under `point`, resolved to its nearest tagged ancestor.
    ///
    /// An untagged region on top blocks tagged regions below it; mark overlays
    /// that should let points through as not [`NodeFlags::PICKABLE`].
    fn hit_test(&self, point: Point) -> Option<K> {
        let hit = self.hit_test_node(point)?;
        self.tagged_ancestor(hit).map(|(_, target)| target.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: f64, y: f64, target: Option<&'static str>) -> TargetNode<&'static str> {
        TargetNode {
            bounds: Rect::new(x, y, x + 100.0, y + 100.0),
            target,
            ..TargetNode::default()
        }
    }

    #[test]
    fn topmost_by_z_wins() {
        let mut tree = TargetTree::new();
        let root = tree.insert(None, cell(0.0, 0.0, None));
        let _low = tree.insert(Some(root), cell(10.0, 10.0, Some("low")));
        let high = tree.insert(
            Some(root),
            TargetNode {
                z_index: 10,
                ..cell(40.0, 40.0, Some("high"))
            },
        );

        assert_eq!(tree.hit_test_node(Point::new(50.0, 50.0)), Some(high));
        assert_eq!(tree.hit_test(Point::new(50.0, 50.0)), Some("high"));
        assert_eq!(tree.hit_test(Point::new(20.0, 20.0)), Some("low"));
    }

    #[test]
    fn deeper_wins_on_equal_z() {
        let mut tree = TargetTree::new();
        let outer = tree.insert(None, cell(0.0, 0.0, Some("outer")));
        let inner = tree.insert(Some(outer), cell(0.0, 0.0, Some("inner")));
        assert_eq!(tree.hit_test_node(Point::new(5.0, 5.0)), Some(inner));
    }

    #[test]
    fn untagged_child_resolves_to_nearest_tagged_ancestor() {
        let mut tree = TargetTree::new();
        let grid = tree.insert(None, cell(0.0, 0.0, Some("grid")));
        let symbol = tree.insert(Some(grid), cell(0.0, 0.0, Some("apple")));
        let label = tree.insert(Some(symbol), cell(0.0, 0.0, None));

        assert_eq!(tree.hit_test_node(Point::new(5.0, 5.0)), Some(label));
        assert_eq!(tree.hit_test(Point::new(5.0, 5.0)), Some("apple"));
    }

    #[test]
    fn untagged_overlay_blocks_and_unpickable_overlay_passes_through() {
        let mut tree = TargetTree::new();
        tree.insert(None, cell(0.0, 0.0, Some("apple")));
        let overlay = tree.insert(
            None,
            TargetNode {
                z_index: 5,
                ..cell(0.0, 0.0, None)
            },
        );
        assert_eq!(tree.hit_test(Point::new(5.0, 5.0)), None);

        tree.set_flags(overlay, NodeFlags::VISIBLE);
        assert_eq!(tree.hit_test(Point::new(5.0, 5.0)), Some("apple"));
    }

    #[test]
    fn hidden_ancestor_hides_subtree() {
        let mut tree = TargetTree::new();
        let page = tree.insert(None, cell(0.0, 0.0, None));
        tree.insert(Some(page), cell(0.0, 0.0, Some("apple")));
        tree.set_flags(page, NodeFlags::PICKABLE);
        assert_eq!(tree.hit_test_node(Point::new(5.0, 5.0)), None);
    }

    #[test]
    fn containment_is_half_open() {
        let mut tree = TargetTree::new();
        tree.insert(None, cell(0.0, 0.0, Some("apple")));
        assert_eq!(tree.hit_test(Point::new(0.0, 0.0)), Some("apple"));
        assert_eq!(tree.hit_test(Point::new(100.0, 50.0)), None);
    }

    #[test]
    fn remove_releases_subtree_targets() {
        let mut tree = TargetTree::new();
        let grid = tree.insert(None, cell(0.0, 0.0, None));
        let apple = tree.insert(Some(grid), cell(0.0, 0.0, Some("apple")));
        assert!(tree.contains_target(&"apple"));
        assert_eq!(tree.node_of(&"apple"), Some(apple));

        tree.remove(grid);
        assert!(!tree.is_alive(grid));
        assert!(!tree.is_alive(apple));
        assert!(!tree.contains_target(&"apple"));
        assert!(tree.is_empty());
        assert_eq!(tree.hit_test(Point::new(5.0, 5.0)), None);
    }

    #[test]
    fn stale_ids_after_slot_reuse() {
        let mut tree = TargetTree::new();
        let a = tree.insert(None, cell(0.0, 0.0, Some("a")));
        tree.remove(a);
        let b = tree.insert(None, cell(0.0, 0.0, Some("b")));
        assert_ne!(a, b);
        assert!(!tree.is_alive(a));
        assert!(tree.target_of(a).is_none());
        assert_eq!(tree.target_of(b), Some(&"b"));
        // Mutations through the stale id are ignored.
        tree.set_bounds(a, Rect::ZERO);
        assert_eq!(tree.bounds(b), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn retagging_moves_the_id() {
        let mut tree = TargetTree::new();
        let first = tree.insert(None, cell(0.0, 0.0, Some("apple")));
        let second = tree.insert(None, cell(200.0, 0.0, None));

        assert_eq!(tree.set_target(second, Some("apple")), None);
        assert_eq!(tree.node_of(&"apple"), Some(second));
        assert_eq!(tree.target_of(first), None, "an id lives on one region only");

        assert_eq!(tree.set_target(second, None), Some("apple"));
        assert!(!tree.contains_target(&"apple"));
    }

    #[test]
    fn insert_under_stale_parent_becomes_root() {
        let mut tree = TargetTree::new();
        let gone = tree.insert(None, cell(0.0, 0.0, None));
        tree.remove(gone);
        let orphan = tree.insert(Some(gone), cell(0.0, 0.0, Some("apple")));
        assert_eq!(tree.parent_of(orphan), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn children_are_tracked() {
        let mut tree = TargetTree::new();
        let row = tree.insert(None, cell(0.0, 0.0, None));
        let a = tree.insert(Some(row), cell(0.0, 0.0, Some("a")));
        let b = tree.insert(Some(row), cell(100.0, 0.0, Some("b")));
        assert_eq!(tree.children_of(row), &[a, b]);
        tree.remove(a);
        assert_eq!(tree.children_of(row), &[b]);
        assert_eq!(tree.parent_of(b), Some(row));
    }
}
