// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glance Targets: selectable regions and tolerant hit testing for dwell-driven UIs.
//!
//! A gaze estimate is noisy. It wobbles by tens of pixels between samples and
//! regularly lands in the gutter between two symbols on a communication board.
//! This crate turns such a point into the stable identifier of a selectable
//! target, or `None` when nothing selectable is near.
//!
//! - [`TargetTree`] is a retained set of world-space regions with parent/child
//!   links, z-order, and flags. Any region may carry a stable target id `K`,
//!   which marks it selectable.
//! - [`HitTest`] answers the exact question: which target is under this point?
//!   [`TargetTree`] implements it by taking the topmost pickable region under the
//!   point and walking up to the nearest tagged region.
//! - [`TargetResolver`] is the seam the dwell pipeline consumes. [`Tolerant`]
//!   implements it for any [`HitTest`] by probing the exact point first and then
//!   four cardinal offsets (up, down, left, right) at a fixed radius.
//!
//! ## Not a layout engine
//!
//! Bounds are stored in world space. Upstream code computes layout with whatever
//! system it likes and pushes the resulting rectangles here. The tree is read
//! during resolution and is free to change between queries.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use glance_targets::{TargetNode, TargetResolver, TargetTree, Tolerant};
//!
//! let mut tree: TargetTree<&'static str> = TargetTree::new();
//! let board = tree.insert(
//!     None,
//!     TargetNode {
//!         bounds: Rect::new(0.0, 0.0, 400.0, 400.0),
//!         ..TargetNode::default()
//!     },
//! );
//! tree.insert(
//!     Some(board),
//!     TargetNode {
//!         bounds: Rect::new(100.0, 100.0, 200.0, 200.0),
//!         target: Some("apple"),
//!         ..TargetNode::default()
//!     },
//! );
//!
//! let resolver = Tolerant::new(&tree);
//! // Exact hit.
//! assert_eq!(resolver.resolve(Point::new(150.0, 150.0)), Some("apple"));
//! // 30 units below the symbol: the upward probe finds it.
//! assert_eq!(resolver.resolve(Point::new(150.0, 230.0)), Some("apple"));
//! // Nothing within tolerance.
//! assert_eq!(resolver.resolve(Point::new(350.0, 350.0)), None);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod resolve;
mod tree;
mod types;

pub use resolve::{DEFAULT_TOLERANCE, HitFn, HitTest, Probe, TargetResolver, Tolerant, hit_fn};
pub use tree::TargetTree;
pub use types::{NodeFlags, NodeId, TargetNode};
