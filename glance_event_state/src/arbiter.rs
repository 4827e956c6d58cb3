// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer/gaze source arbitration.
//!
//! Two point streams compete for the cursor: pointer movement and gaze samples.
//! The pointer wins while it is moving; once it has been still for
//! [`SourceArbiter::inactivity_timeout`] milliseconds, gaze takes over again.
//!
//! ## Rules
//!
//! - A pointer event makes the pointer authoritative, records its point as the
//!   current point, and restarts the inactivity window.
//! - While the pointer is authoritative, gaze samples still drive target
//!   resolution, but they resolve at the last pointer point and do not move the
//!   current point. Dwell timers keep running through the hand-off instead of
//!   freezing or restarting.
//! - While gaze is authoritative, gaze samples move the current point and are
//!   resolved where they land.
//! - The pointer is authoritative iff `now - last_pointer_activity < inactivity_timeout`.
//!
//! ## Usage
//!
//! ```
//! use glance_event_state::arbiter::{InputSource, SourceArbiter};
//! use kurbo::Point;
//!
//! let mut arbiter = SourceArbiter::new();
//! arbiter.on_pointer(Point::new(10.0, 10.0), 1000);
//!
//! // Gaze elsewhere resolves at the pointer while the pointer is fresh.
//! let probe = arbiter.on_gaze(Point::new(500.0, 500.0), 2000);
//! assert_eq!(probe, Point::new(10.0, 10.0));
//! assert_eq!(arbiter.current(), Some(Point::new(10.0, 10.0)));
//!
//! // Five quiet seconds later, gaze is back in charge.
//! assert_eq!(arbiter.deadline(), Some(6000));
//! assert!(arbiter.poll(6000));
//! assert_eq!(arbiter.source(), InputSource::Gaze);
//! ```

use kurbo::Point;

/// Default pointer inactivity timeout in milliseconds.
pub const DEFAULT_INACTIVITY_TIMEOUT: u64 = 5000;

/// Source of the fused point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Pointer/mouse movement.
    Pointer,
    /// Gaze estimation.
    #[default]
    Gaze,
}

/// Arbitrates between pointer and gaze streams.
#[derive(Clone, Debug)]
pub struct SourceArbiter {
    /// Quiet period after which the pointer loses authority (milliseconds).
    pub inactivity_timeout: u64,
    source: InputSource,
    last_pointer_at: Option<u64>,
    pointer_point: Option<Point>,
    current: Option<Point>,
}

impl SourceArbiter {
    /// Create an arbiter with [`DEFAULT_INACTIVITY_TIMEOUT`]. Gaze is authoritative initially.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_INACTIVITY_TIMEOUT)
    }

    /// Create an arbiter with a custom inactivity timeout in milliseconds.
    pub fn with_timeout(inactivity_timeout: u64) -> Self {
        Self {
            inactivity_timeout,
            source: InputSource::Gaze,
            last_pointer_at: None,
            pointer_point: None,
            current: None,
        }
    }

    /// Record pointer movement to `point` at `now`. Returns the point to resolve.
    pub fn on_pointer(&mut self, point: Point, now: u64) -> Point {
        self.source = InputSource::Pointer;
        self.last_pointer_at = Some(now);
        self.pointer_point = Some(point);
        self.current = Some(point);
        point
    }

    /// Record a gaze sample at `now`. Returns the point to resolve.
    pub fn on_gaze(&mut self, point: Point, now: u64) -> Point {
        self.poll(now);
        match (self.source, self.pointer_point) {
            (InputSource::Pointer, Some(pointer)) => pointer,
            _ => {
                self.current = Some(point);
                point
            }
        }
    }

    /// Hand authority back to gaze if the pointer has been quiet long enough.
    ///
    /// Returns true when this call performed the hand-off.
    pub fn poll(&mut self, now: u64) -> bool {
        if self.source == InputSource::Pointer && !self.pointer_fresh(now) {
            self.source = InputSource::Gaze;
            return true;
        }
        false
    }

    /// Which source is authoritative at `now`. Pure.
    pub fn active_source(&self, now: u64) -> InputSource {
        if self.pointer_fresh(now) {
            InputSource::Pointer
        } else {
            InputSource::Gaze
        }
    }

    /// Authoritative source as of the last event or poll.
    pub fn source(&self) -> InputSource {
        self.source
    }

    /// Current fused point, or `None` before the first sample.
    pub fn current(&self) -> Option<Point> {
        self.current
    }

    /// Timestamp of the last pointer movement.
    pub fn last_pointer_activity(&self) -> Option<u64> {
        self.last_pointer_at
    }

    /// Timestamp at which the pointer loses authority, while it has it.
    pub fn deadline(&self) -> Option<u64> {
        match (self.source, self.last_pointer_at) {
            (InputSource::Pointer, Some(at)) => Some(at.saturating_add(self.inactivity_timeout)),
            _ => None,
        }
    }

    /// Forget all samples and return authority to gaze. Keeps the timeout.
    pub fn reset(&mut self) {
        *self = Self::with_timeout(self.inactivity_timeout);
    }

    fn pointer_fresh(&self, now: u64) -> bool {
        self.last_pointer_at
            .is_some_and(|at| now.saturating_sub(at) < self.inactivity_timeout)
    }
}

impl Default for SourceArbiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaze_is_authoritative_initially() {
        let mut arbiter = SourceArbiter::new();
        assert_eq!(arbiter.source(), InputSource::Gaze);
        assert_eq!(arbiter.current(), None);
        assert_eq!(arbiter.deadline(), None);

        let probe = arbiter.on_gaze(Point::new(3.0, 4.0), 0);
        assert_eq!(probe, Point::new(3.0, 4.0));
        assert_eq!(arbiter.current(), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn pointer_takes_priority_immediately() {
        let mut arbiter = SourceArbiter::new();
        arbiter.on_gaze(Point::new(500.0, 500.0), 0);
        arbiter.on_pointer(Point::new(10.0, 10.0), 100);

        assert_eq!(arbiter.source(), InputSource::Pointer);
        assert_eq!(arbiter.current(), Some(Point::new(10.0, 10.0)));
        assert_eq!(arbiter.active_source(100), InputSource::Pointer);
    }

    #[test]
    fn gaze_resolves_at_pointer_while_pointer_is_fresh() {
        let mut arbiter = SourceArbiter::new();
        arbiter.on_pointer(Point::new(10.0, 10.0), 0);

        let probe = arbiter.on_gaze(Point::new(500.0, 500.0), 4999);
        assert_eq!(probe, Point::new(10.0, 10.0));
        assert_eq!(arbiter.current(), Some(Point::new(10.0, 10.0)));
        assert_eq!(arbiter.source(), InputSource::Pointer);
    }

    #[test]
    fn authority_reverts_after_timeout() {
        let mut arbiter = SourceArbiter::new();
        arbiter.on_pointer(Point::new(10.0, 10.0), 1000);

        assert_eq!(arbiter.deadline(), Some(6000));
        assert!(!arbiter.poll(5999));
        assert_eq!(arbiter.active_source(5999), InputSource::Pointer);
        assert!(arbiter.poll(6000));
        assert_eq!(arbiter.source(), InputSource::Gaze);
        assert_eq!(arbiter.deadline(), None);
        assert!(!arbiter.poll(6001), "hand-off is reported once");

        // The cursor stays where the pointer left it until gaze moves it.
        assert_eq!(arbiter.current(), Some(Point::new(10.0, 10.0)));
        let probe = arbiter.on_gaze(Point::new(500.0, 500.0), 6050);
        assert_eq!(probe, Point::new(500.0, 500.0));
        assert_eq!(arbiter.current(), Some(Point::new(500.0, 500.0)));
    }

    #[test]
    fn gaze_after_timeout_hands_off_without_poll() {
        let mut arbiter = SourceArbiter::new();
        arbiter.on_pointer(Point::new(10.0, 10.0), 0);

        let probe = arbiter.on_gaze(Point::new(500.0, 500.0), 7000);
        assert_eq!(probe, Point::new(500.0, 500.0));
        assert_eq!(arbiter.source(), InputSource::Gaze);
    }

    #[test]
    fn pointer_movement_restarts_window() {
        let mut arbiter = SourceArbiter::new();
        arbiter.on_pointer(Point::new(10.0, 10.0), 0);
        arbiter.on_pointer(Point::new(20.0, 20.0), 4000);

        assert!(!arbiter.poll(5000));
        assert_eq!(arbiter.deadline(), Some(9000));
        assert!(arbiter.poll(9000));
    }

    #[test]
    fn reset_keeps_timeout() {
        let mut arbiter = SourceArbiter::with_timeout(250);
        arbiter.on_pointer(Point::new(10.0, 10.0), 0);
        arbiter.reset();

        assert_eq!(arbiter.inactivity_timeout, 250);
        assert_eq!(arbiter.source(), InputSource::Gaze);
        assert_eq!(arbiter.current(), None);
        assert_eq!(arbiter.last_pointer_activity(), None);
    }
}
