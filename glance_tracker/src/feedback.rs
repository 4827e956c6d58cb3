// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only state exposed to the UI.

use glance_event_state::arbiter::InputSource;
use kurbo::Point;

/// Whether the UI should show the system cursor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CursorVisibility {
    /// Show the system cursor.
    #[default]
    System,
    /// Hide the system cursor; the UI draws the fused point itself.
    Hidden,
}

/// Snapshot of what the UI renders: cursor, hovered target, and dwell progress.
///
/// Consumers only read this. All writes go through the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback<K> {
    /// Current fused point, or `None` before the first sample or while not running.
    pub point: Option<Point>,
    /// Which input stream owns the cursor.
    pub source: InputSource,
    /// Target under attention.
    pub hovered: Option<K>,
    /// Dwell progress toward selecting `hovered`, in `[0, 100]`.
    pub progress: f64,
    /// True while the gaze capability is acquired and running.
    pub initialized: bool,
    /// Cursor presentation.
    pub cursor: CursorVisibility,
}

impl<K> Default for Feedback<K> {
    fn default() -> Self {
        Self {
            point: None,
            source: InputSource::Gaze,
            hovered: None,
            progress: 0.0,
            initialized: false,
            cursor: CursorVisibility::System,
        }
    }
}

impl<K> Feedback<K> {
    /// Returns true if a dwell indicator should be drawn.
    pub fn is_dwelling(&self) -> bool {
        self.hovered.is_some()
    }
}

/// A completed dwell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection<K> {
    /// The selected target.
    pub target: K,
    /// Completion timestamp.
    pub at: u64,
    /// False if the UI failed to activate the target.
    pub activated: bool,
}
