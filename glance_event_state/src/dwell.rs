// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dwell selection state machine.
//!
//! A dwell selection activates a target when attention stays on it for
//! [`DwellState::dwell_time`] milliseconds, with no discrete click.
//!
//! ## States
//!
//! - **Idle**: no target under attention.
//! - **Dwelling**: a target and the timestamp attention arrived on it.
//!
//! ## Rules
//!
//! 1. **Enter**: resolving a target while idle starts a dwell at `now` with 0% progress.
//! 2. **Hold**: resolving the same target keeps the original start time.
//! 3. **Switch**: resolving a different target restarts at `now`; resolving `None` goes idle.
//! 4. **Complete**: once `now - started_at >= dwell_time`, the target is returned
//!    exactly once and the machine goes idle before looking at any further sample.
//! 5. **No self re-trigger**: a target that just completed at `t` does not start a
//!    new dwell from a sample at the same `t`. The next sample after `t` may.
//!
//! Completion and progress are both pure functions of `now - started_at` and the
//! current dwell time, so there is no second timer to drift. Changing the dwell
//! time mid-dwell keeps the start time and only changes the arithmetic.
//!
//! ## Usage
//!
//! ```
//! use glance_event_state::dwell::DwellState;
//!
//! let mut state: DwellState<&str> = DwellState::with_dwell_time(2000);
//!
//! assert_eq!(state.observe(Some("apple"), 0), None);
//! assert_eq!(state.observe(Some("apple"), 1000), None);
//! assert_eq!(state.progress(1000), 50.0);
//!
//! // Time passes with no new samples; the host polls at the deadline.
//! assert_eq!(state.deadline(), Some(2000));
//! assert_eq!(state.poll(2000), Some("apple"));
//! assert_eq!(state.target(), None);
//!
//! // Still looking at apple at the same instant: no immediate re-dwell.
//! assert_eq!(state.observe(Some("apple"), 2000), None);
//! assert!(!state.is_dwelling());
//! ```
//!
//! Switching targets resets progress:
//! ```
//! # use glance_event_state::dwell::DwellState;
//! let mut state: DwellState<&str> = DwellState::new();
//! state.observe(Some("apple"), 0);
//! assert_eq!(state.sample_progress(1500), 75.0);
//! state.observe(Some("banana"), 1500);
//! assert_eq!(state.reported_progress(), 0.0);
//! assert_eq!(state.dwell().map(|d| d.started_at), Some(1500));
//! ```

/// Default dwell duration in milliseconds.
pub const DEFAULT_DWELL_TIME: u64 = 2000;

/// An active dwell on a single target.
#[derive(Clone, Debug, PartialEq)]
pub struct Dwell<K> {
    /// Target under attention.
    pub target: K,
    /// Timestamp attention arrived on `target`.
    pub started_at: u64,
    /// Highest progress reported for this dwell so far.
    reported: f64,
}

impl<K> Dwell<K> {
    fn new(target: K, started_at: u64) -> Self {
        Self {
            target,
            started_at,
            reported: 0.0,
        }
    }

    /// Progress last handed out by [`DwellState::sample_progress`].
    pub fn reported_progress(&self) -> f64 {
        self.reported
    }
}

/// Dwell selection state machine.
///
/// Generic over the target identifier `K`.
#[derive(Clone, Debug)]
pub struct DwellState<K> {
    dwell: Option<Dwell<K>>,
    dwell_time: u64,
    /// Target and timestamp of the most recent completion.
    last_completion: Option<(K, u64)>,
}

impl<K: PartialEq + Clone> DwellState<K> {
    /// Create an idle state with [`DEFAULT_DWELL_TIME`].
    pub fn new() -> Self {
        Self::with_dwell_time(DEFAULT_DWELL_TIME)
    }

    /// Create an idle state with a custom dwell time in milliseconds.
    ///
    /// A dwell time of zero is treated as one millisecond.
    pub fn with_dwell_time(dwell_time: u64) -> Self {
        Self {
            dwell: None,
            dwell_time: dwell_time.max(1),
            last_completion: None,
        }
    }

    /// Dwell time in milliseconds.
    pub fn dwell_time(&self) -> u64 {
        self.dwell_time
    }

    /// Change the dwell time. An active dwell keeps its start time.
    pub fn set_dwell_time(&mut self, dwell_time: u64) {
        self.dwell_time = dwell_time.max(1);
    }

    /// The active dwell, if any.
    pub fn dwell(&self) -> Option<&Dwell<K>> {
        self.dwell.as_ref()
    }

    /// Target currently under attention.
    pub fn target(&self) -> Option<&K> {
        self.dwell.as_ref().map(|d| &d.target)
    }

    /// Returns true while a dwell is active.
    pub fn is_dwelling(&self) -> bool {
        self.dwell.is_some()
    }

    /// Target and timestamp of the most recent completion.
    pub fn last_completion(&self) -> Option<(&K, u64)> {
        self.last_completion.as_ref().map(|(k, at)| (k, *at))
    }

    /// Feed the target resolved for a sample taken at `now`.
    ///
    /// Any dwell that is already due completes first, as its timer would have.
    /// Returns the completed target, which the caller should activate.
    pub fn observe(&mut self, target: Option<K>, now: u64) -> Option<K> {
        let completed = self.poll(now);

        let holding = matches!(
            (&self.dwell, &target),
            (Some(d), Some(t)) if d.target == *t
        );
        if holding {
            return completed;
        }

        self.dwell = match target {
            Some(t) if self.just_completed(&t, now) => None,
            Some(t) => Some(Dwell::new(t, now)),
            None => None,
        };
        completed
    }

    /// Complete the active dwell if it is due at `now`.
    ///
    /// Returns the completed target at most once per dwell.
    pub fn poll(&mut self, now: u64) -> Option<K> {
        let due = self
            .dwell
            .as_ref()
            .is_some_and(|d| now.saturating_sub(d.started_at) >= self.dwell_time);
        if !due {
            return None;
        }
        let done = self.dwell.take()?;
        self.last_completion = Some((done.target.clone(), now));
        Some(done.target)
    }

    /// Progress of the active dwell at `now`, in `[0, 100]`. Zero when idle.
    ///
    /// Pure: does not touch the reported value.
    pub fn progress(&self, now: u64) -> f64 {
        self.dwell
            .as_ref()
            .map_or(0.0, |d| percent(now.saturating_sub(d.started_at), self.dwell_time))
    }

    /// Sample progress at `now` for display and return it.
    ///
    /// The reported value never decreases while the target is unchanged: if the
    /// dwell time grows mid-dwell, the display holds until the new computation
    /// catches up.
    pub fn sample_progress(&mut self, now: u64) -> f64 {
        let dwell_time = self.dwell_time;
        match &mut self.dwell {
            Some(d) => {
                let p = percent(now.saturating_sub(d.started_at), dwell_time);
                d.reported = d.reported.max(p);
                d.reported
            }
            None => 0.0,
        }
    }

    /// Progress last reported by [`DwellState::sample_progress`]. Zero when idle.
    pub fn reported_progress(&self) -> f64 {
        self.dwell.as_ref().map_or(0.0, |d| d.reported)
    }

    /// Timestamp at which the active dwell completes.
    pub fn deadline(&self) -> Option<u64> {
        self.dwell
            .as_ref()
            .map(|d| d.started_at.saturating_add(self.dwell_time))
    }

    /// Drop the active dwell and the completion record without completing.
    pub fn clear(&mut self) {
        self.dwell = None;
        self.last_completion = None;
    }

    fn just_completed(&self, target: &K, now: u64) -> bool {
        self.last_completion
            .as_ref()
            .is_some_and(|(k, at)| *at == now && k == target)
    }
}

impl<K: PartialEq + Clone> Default for DwellState<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(
    clippy::cast_precision_loss,
    reason = "Millisecond spans far below 2^52 are exact in f64."
)]
fn percent(elapsed: u64, dwell_time: u64) -> f64 {
    (elapsed as f64 / dwell_time as f64 * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_to_dwelling_starts_at_zero() {
        let mut state: DwellState<&str> = DwellState::new();
        assert_eq!(state.observe(Some("apple"), 100), None);

        let dwell = state.dwell().unwrap();
        assert_eq!(dwell.target, "apple");
        assert_eq!(dwell.started_at, 100);
        assert_eq!(state.sample_progress(100), 0.0);
    }

    #[test]
    fn same_target_keeps_origin() {
        let mut state: DwellState<&str> = DwellState::new();
        state.observe(Some("apple"), 0);
        state.observe(Some("apple"), 500);
        state.observe(Some("apple"), 1000);

        assert_eq!(state.dwell().unwrap().started_at, 0);
        assert_eq!(state.progress(1000), 50.0);
    }

    #[test]
    fn different_target_resets() {
        let mut state: DwellState<&str> = DwellState::new();
        state.observe(Some("apple"), 0);
        state.sample_progress(1200);
        assert_eq!(state.observe(Some("banana"), 1200), None);

        assert_eq!(state.target(), Some(&"banana"));
        assert_eq!(state.dwell().unwrap().started_at, 1200);
        assert_eq!(state.reported_progress(), 0.0);
    }

    #[test]
    fn none_goes_idle() {
        let mut state: DwellState<&str> = DwellState::new();
        state.observe(Some("apple"), 0);
        state.sample_progress(800);
        state.observe(None, 900);

        assert!(!state.is_dwelling());
        assert_eq!(state.deadline(), None);
        assert_eq!(state.reported_progress(), 0.0);
        assert_eq!(state.poll(5000), None);
    }

    #[test]
    fn completes_exactly_once() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(2000);
        state.observe(Some("apple"), 0);

        assert_eq!(state.poll(1999), None);
        assert_eq!(state.poll(2000), Some("apple"));
        assert_eq!(state.poll(2000), None);
        assert_eq!(state.poll(2050), None);
        assert_eq!(state.last_completion(), Some((&"apple", 2000)));
    }

    #[test]
    fn late_sample_completes_before_resolving() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(2000);
        state.observe(Some("apple"), 0);

        // No poll happened at the deadline; the next sample lands on banana.
        assert_eq!(state.observe(Some("banana"), 2300), Some("apple"));
        assert_eq!(state.target(), Some(&"banana"));
        assert_eq!(state.dwell().unwrap().started_at, 2300);
    }

    #[test]
    fn completing_sample_does_not_restart_same_target() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(2000);
        state.observe(Some("apple"), 0);

        assert_eq!(state.observe(Some("apple"), 2000), Some("apple"));
        assert!(!state.is_dwelling());

        // A later sample starts a fresh dwell.
        assert_eq!(state.observe(Some("apple"), 2050), None);
        assert_eq!(state.dwell().unwrap().started_at, 2050);
    }

    #[test]
    fn poll_then_same_instant_sample_is_suppressed() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(100);
        state.observe(Some("apple"), 0);
        assert_eq!(state.poll(100), Some("apple"));
        assert_eq!(state.observe(Some("apple"), 100), None);
        assert!(!state.is_dwelling());
        // A different target at the same instant is fine.
        state.observe(Some("banana"), 100);
        assert_eq!(state.target(), Some(&"banana"));
    }

    #[test]
    fn dwell_time_change_keeps_origin() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(2000);
        state.observe(Some("apple"), 0);
        assert_eq!(state.sample_progress(1000), 50.0);

        state.set_dwell_time(1000);
        assert_eq!(state.dwell().unwrap().started_at, 0);
        assert_eq!(state.progress(1000), 100.0);
        assert_eq!(state.deadline(), Some(1000));
        assert_eq!(state.poll(1000), Some("apple"));
    }

    #[test]
    fn reported_progress_never_decreases_on_longer_dwell_time() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(2000);
        state.observe(Some("apple"), 0);
        assert_eq!(state.sample_progress(1200), 60.0);

        state.set_dwell_time(4000);
        assert_eq!(state.progress(1400), 35.0);
        assert_eq!(state.sample_progress(1400), 60.0, "display holds");
        assert_eq!(state.sample_progress(3200), 80.0);
    }

    #[test]
    fn progress_is_clamped() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(1000);
        state.observe(Some("apple"), 0);
        assert_eq!(state.progress(5000), 100.0);
        assert_eq!(state.progress(0), 0.0);
    }

    #[test]
    fn zero_dwell_time_is_clamped() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(0);
        assert_eq!(state.dwell_time(), 1);
        state.observe(Some("apple"), 10);
        assert_eq!(state.poll(10), None);
        assert_eq!(state.poll(11), Some("apple"));
    }

    #[test]
    fn clear_cancels_without_completing() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(2000);
        state.observe(Some("apple"), 0);
        state.sample_progress(1200);
        state.clear();

        assert_eq!(state.target(), None);
        assert_eq!(state.reported_progress(), 0.0);
        assert_eq!(state.poll(2000), None);
        assert_eq!(state.last_completion(), None);
    }

    #[test]
    fn clock_going_backwards_does_not_complete() {
        let mut state: DwellState<&str> = DwellState::with_dwell_time(2000);
        state.observe(Some("apple"), 1000);
        assert_eq!(state.poll(10), None);
        assert_eq!(state.progress(10), 0.0);
    }
}
