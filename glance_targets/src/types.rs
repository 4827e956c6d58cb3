// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the target tree: node identifiers, flags, and region data.

use kurbo::Rect;

/// Identifier for a region in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Region flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Region is visible. Hidden regions hide their whole subtree from hit testing.
        const VISIBLE  = 0b0000_0001;
        /// Region is pickable. Unpickable regions let points fall through to whatever is below.
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Data for a single region.
#[derive(Clone, Debug)]
pub struct TargetNode<K> {
    /// World-space bounds. Containment is half-open: `x0 <= x < x1`, `y0 <= y < y1`.
    pub bounds: Rect,
    /// Stacking order. Higher is on top.
    pub z_index: i32,
    /// Visibility and picking flags.
    pub flags: NodeFlags,
    /// Stable identifier when this region is selectable.
    pub target: Option<K>,
}

impl<K> Default for TargetNode<K> {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            z_index: 0,
            flags: NodeFlags::default(),
            target: None,
        }
    }
}
