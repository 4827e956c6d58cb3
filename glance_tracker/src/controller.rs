// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The eye-tracking controller.
//!
//! Owns the capability lifecycle and drives the per-sample pipeline:
//! arbitration, resolution, dwell, activation, and progress. The controller is
//! timestamp-driven; the host supplies `now` with every call and calls
//! [`EyeTrackingController::tick`] by [`EyeTrackingController::next_deadline`]
//! so that dwells complete and progress advances without new samples.
//!
//! Per-sample order is fixed: resolve the point, update the dwell (activating
//! on completion), then sample progress. A sample therefore never reports
//! progress belonging to the previous target.

use core::fmt;

use glance_event_state::arbiter::SourceArbiter;
use glance_event_state::dwell::DwellState;
use glance_targets::TargetResolver;
use kurbo::Point;
use tracing::{debug, info, trace, warn};

use crate::activation::Surface;
use crate::capability::{AcquisitionTicket, CapabilityError, GazeCapability, Lifecycle};
use crate::config::{ConfigError, DisablePolicy, TrackingConfig};
use crate::feedback::{CursorVisibility, Feedback, Selection};

/// Gaze-driven dwell selection over a [`GazeCapability`].
///
/// `K` identifies selectable targets; `C` is the gaze backend.
pub struct EyeTrackingController<K, C> {
    capability: C,
    config: TrackingConfig,
    lifecycle: Lifecycle,
    next_ticket: u64,
    acquisitions: u32,
    arbiter: SourceArbiter,
    dwell: DwellState<K>,
    next_progress_sample: Option<u64>,
    last_selection: Option<Selection<K>>,
}

impl<K, C> fmt::Debug for EyeTrackingController<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EyeTrackingController")
            .field("lifecycle", &self.lifecycle)
            .field("acquisitions", &self.acquisitions)
            .field("config", &self.config)
            .field("next_progress_sample", &self.next_progress_sample)
            .finish_non_exhaustive()
    }
}

impl<K, C> EyeTrackingController<K, C>
where
    K: Clone + PartialEq + fmt::Debug,
    C: GazeCapability,
{
    /// Create a controller. If `config.enabled` is set, acquisition starts immediately.
    pub fn new(capability: C, config: TrackingConfig) -> Self {
        let mut controller = Self {
            capability,
            arbiter: SourceArbiter::with_timeout(config.pointer_inactivity_ms),
            dwell: DwellState::with_dwell_time(config.dwell_time_ms),
            lifecycle: Lifecycle::Uninitialized,
            next_ticket: 0,
            acquisitions: 0,
            next_progress_sample: None,
            last_selection: None,
            config,
        };
        if controller.config.enabled {
            controller.enable();
        }
        controller
    }

    /// Create a disabled controller with [`TrackingConfig::default`].
    pub fn with_default_config(capability: C) -> Self {
        Self::new(capability, TrackingConfig::default())
    }

    /// Turn tracking on. Idempotent.
    ///
    /// Acquires the capability the first time, joins an acquisition already in
    /// flight, and resumes a paused capability without re-acquiring it.
    pub fn enable(&mut self) {
        self.config.enabled = true;
        match self.lifecycle {
            Lifecycle::Uninitialized => self.start_acquisition(),
            Lifecycle::Initializing {
                ticket,
                wanted: false,
            } => {
                debug!(ticket = ticket.get(), "enable joins acquisition in flight");
                self.lifecycle = Lifecycle::Initializing {
                    ticket,
                    wanted: true,
                };
            }
            Lifecycle::Initializing { wanted: true, .. } | Lifecycle::Running => {}
            Lifecycle::Paused => match self.capability.resume() {
                Ok(()) => {
                    info!("gaze tracking resumed");
                    self.lifecycle = Lifecycle::Running;
                }
                Err(err) => warn!(%err, "could not resume gaze capability"),
            },
            Lifecycle::Ended => warn!("gaze capability was terminated; ignoring enable"),
        }
    }

    /// Turn tracking off.
    ///
    /// Cancels the dwell and all scheduled work immediately and pauses or
    /// releases the capability per [`TrackingConfig::disable_policy`]. An
    /// acquisition in flight is left to finish and then stands down.
    pub fn disable(&mut self) {
        self.config.enabled = false;
        self.cancel_pending();
        match self.lifecycle {
            Lifecycle::Running => self.stand_down(),
            Lifecycle::Initializing {
                ticket,
                wanted: true,
            } => {
                debug!(ticket = ticket.get(), "disabled during acquisition");
                self.lifecycle = Lifecycle::Initializing {
                    ticket,
                    wanted: false,
                };
            }
            _ => {}
        }
    }

    /// Enable or disable.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// End the capability for good. Later enables are ignored.
    pub fn terminate(&mut self) {
        self.config.enabled = false;
        self.cancel_pending();
        if self.lifecycle.holds_capability()
            && let Err(err) = self.capability.end()
        {
            warn!(%err, "could not end gaze capability");
        }
        if self.lifecycle != Lifecycle::Ended {
            info!("gaze capability terminated");
        }
        self.lifecycle = Lifecycle::Ended;
    }

    /// Report the outcome of the acquisition identified by `ticket`.
    ///
    /// Results for any attempt other than the one in flight are discarded.
    pub fn acquisition_finished(
        &mut self,
        ticket: AcquisitionTicket,
        result: Result<(), CapabilityError>,
    ) {
        let Lifecycle::Initializing {
            ticket: pending,
            wanted,
        } = self.lifecycle
        else {
            warn!(
                ticket = ticket.get(),
                lifecycle = ?self.lifecycle,
                "discarding late acquisition result"
            );
            return;
        };
        if ticket != pending {
            warn!(
                ticket = ticket.get(),
                pending = pending.get(),
                "discarding stale acquisition result"
            );
            return;
        }
        match result {
            Ok(()) if wanted => {
                info!(ticket = ticket.get(), "gaze tracking running");
                self.lifecycle = Lifecycle::Running;
            }
            Ok(()) => {
                debug!(ticket = ticket.get(), "acquired after disable; standing down");
                self.stand_down();
            }
            Err(err) => self.acquisition_failed(&err),
        }
    }

    /// Feed pointer movement to `point` at `now`.
    ///
    /// The pointer takes over the cursor immediately. Returns the selection if
    /// a dwell completed.
    pub fn on_pointer_move<U>(&mut self, point: Point, now: u64, ui: &mut U) -> Option<Selection<K>>
    where
        U: Surface<K> + ?Sized,
    {
        if !self.accepts(point) {
            return None;
        }
        let probe = self.arbiter.on_pointer(point, now);
        self.process(probe, now, ui)
    }

    /// Feed a gaze sample at `now`.
    ///
    /// While the pointer owns the cursor the sample resolves at the pointer
    /// position. Returns the selection if a dwell completed.
    pub fn on_gaze_sample<U>(&mut self, point: Point, now: u64, ui: &mut U) -> Option<Selection<K>>
    where
        U: Surface<K> + ?Sized,
    {
        if !self.accepts(point) {
            return None;
        }
        self.poll_arbiter(now);
        let probe = self.arbiter.on_gaze(point, now);
        self.process(probe, now, ui)
    }

    /// Advance timers to `now`: source hand-off, dwell completion, progress sampling.
    pub fn tick<U>(&mut self, now: u64, ui: &mut U) -> Option<Selection<K>>
    where
        U: Surface<K> + ?Sized,
    {
        if !self.lifecycle.is_running() {
            return None;
        }
        self.poll_arbiter(now);
        let selection = self.dwell.poll(now).map(|target| self.activate(target, now, ui));

        if !self.dwell.is_dwelling() {
            self.next_progress_sample = None;
        } else if let Some(due) = self.next_progress_sample
            && now >= due
        {
            let progress = self.dwell.sample_progress(now);
            trace!(progress, "dwell progress");
            self.next_progress_sample = Some(next_on_grid(due, now, self.progress_interval()));
        }
        selection
    }

    /// Earliest timestamp at which [`EyeTrackingController::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        if !self.lifecycle.is_running() {
            return None;
        }
        [
            self.arbiter.deadline(),
            self.dwell.deadline(),
            self.next_progress_sample,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Change the dwell time. An active dwell keeps its start time.
    ///
    /// Zero is treated as one millisecond.
    pub fn set_dwell_time(&mut self, dwell_time_ms: u64) {
        let dwell_time_ms = dwell_time_ms.max(1);
        debug!(dwell_time_ms, "dwell time changed");
        self.config.dwell_time_ms = dwell_time_ms;
        self.dwell.set_dwell_time(dwell_time_ms);
    }

    /// Change the tolerance probe radius used from the next sample on.
    ///
    /// Zero, negative, or non-finite radii resolve exact hits only.
    pub fn set_hit_tolerance(&mut self, radius: f64) {
        debug!(radius, "hit tolerance changed");
        self.config.hit_tolerance = radius;
    }

    /// Validate and apply `config`, enabling or disabling to match it.
    ///
    /// Every setting takes effect from the next call, including the hit
    /// tolerance used to resolve samples.
    pub fn apply_config(&mut self, config: TrackingConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.dwell.set_dwell_time(config.dwell_time_ms);
        self.arbiter.inactivity_timeout = config.pointer_inactivity_ms;
        let enabled = config.enabled;
        self.config = config;
        self.set_enabled(enabled);
        Ok(())
    }

    /// Snapshot of the UI-facing state.
    pub fn feedback(&self) -> Feedback<K> {
        let running = self.lifecycle.is_running();
        Feedback {
            point: self.arbiter.current().filter(|_| running),
            source: self.arbiter.source(),
            hovered: self.dwell.target().cloned(),
            progress: self.dwell.reported_progress(),
            initialized: running,
            cursor: if running && self.config.hide_system_cursor {
                CursorVisibility::Hidden
            } else {
                CursorVisibility::System
            },
        }
    }

    /// Current capability lifecycle.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Returns true if samples are being consumed.
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Number of acquisitions started over the controller's lifetime.
    pub fn acquisitions_started(&self) -> u32 {
        self.acquisitions
    }

    /// Most recent completed dwell.
    pub fn last_selection(&self) -> Option<&Selection<K>> {
        self.last_selection.as_ref()
    }

    /// Active configuration. `enabled` tracks the last enable/disable request.
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Dwell state, for inspection.
    pub fn dwell_state(&self) -> &DwellState<K> {
        &self.dwell
    }

    /// Source arbiter, for inspection.
    pub fn arbiter(&self) -> &SourceArbiter {
        &self.arbiter
    }

    /// The gaze backend.
    pub fn capability(&self) -> &C {
        &self.capability
    }

    /// The gaze backend, mutably.
    pub fn capability_mut(&mut self) -> &mut C {
        &mut self.capability
    }

    fn start_acquisition(&mut self) {
        self.next_ticket += 1;
        self.acquisitions += 1;
        let ticket = AcquisitionTicket(self.next_ticket);
        info!(ticket = ticket.get(), "acquiring gaze capability");
        self.lifecycle = Lifecycle::Initializing {
            ticket,
            wanted: true,
        };
        if let Err(err) = self.capability.begin_acquisition(ticket) {
            self.acquisition_failed(&err);
        }
    }

    fn acquisition_failed(&mut self, err: &CapabilityError) {
        warn!(%err, "gaze capability unavailable");
        self.lifecycle = Lifecycle::Uninitialized;
    }

    /// Release or pause an acquired capability that is no longer wanted.
    fn stand_down(&mut self) {
        match self.config.disable_policy {
            DisablePolicy::Pause => {
                if let Err(err) = self.capability.pause() {
                    warn!(%err, "could not pause gaze capability");
                }
                info!("gaze tracking paused");
                self.lifecycle = Lifecycle::Paused;
            }
            DisablePolicy::Release => {
                if let Err(err) = self.capability.end() {
                    warn!(%err, "could not end gaze capability");
                }
                info!("gaze capability released");
                self.lifecycle = Lifecycle::Uninitialized;
            }
        }
    }

    fn cancel_pending(&mut self) {
        self.arbiter.reset();
        self.dwell.clear();
        self.next_progress_sample = None;
    }

    fn accepts(&self, point: Point) -> bool {
        if !self.lifecycle.is_running() {
            return false;
        }
        if !point.is_finite() {
            trace!(?point, "ignoring non-finite sample");
            return false;
        }
        true
    }

    fn poll_arbiter(&mut self, now: u64) {
        if self.arbiter.poll(now) {
            debug!(now, "pointer idle; gaze owns the cursor");
        }
    }

    fn process<U>(&mut self, probe: Point, now: u64, ui: &mut U) -> Option<Selection<K>>
    where
        U: Surface<K> + ?Sized,
    {
        let target = self.config.tolerant(&*ui).resolve(probe);
        let before = self.dwell.dwell().map(|d| (d.target.clone(), d.started_at));

        let selection = self
            .dwell
            .observe(target, now)
            .map(|done| self.activate(done, now, ui));

        let after = self.dwell.dwell().map(|d| (d.target.clone(), d.started_at));
        if after.is_none() {
            self.next_progress_sample = None;
        } else if after != before {
            debug!(hovered = ?self.dwell.target(), now, "dwell started");
            self.next_progress_sample = Some(now.saturating_add(self.progress_interval()));
        }
        self.dwell.sample_progress(now);
        selection
    }

    fn activate<U>(&mut self, target: K, now: u64, ui: &mut U) -> Selection<K>
    where
        U: Surface<K> + ?Sized,
    {
        let activated = match ui.activate(&target) {
            Ok(()) => {
                info!(selected = ?target, at = now, "dwell selection");
                true
            }
            Err(err) => {
                warn!(selected = ?target, %err, "dwell target could not be activated");
                false
            }
        };
        let selection = Selection {
            target,
            at: now,
            activated,
        };
        self.last_selection = Some(selection.clone());
        selection
    }

    fn progress_interval(&self) -> u64 {
        self.config.progress_interval_ms.max(1)
    }
}

/// First point of the grid `due + k * interval` strictly after `now`.
fn next_on_grid(due: u64, now: u64, interval: u64) -> u64 {
    let steps = now.saturating_sub(due) / interval + 1;
    due.saturating_add(steps.saturating_mul(interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_skips_missed_samples() {
        assert_eq!(next_on_grid(50, 50, 50), 100);
        assert_eq!(next_on_grid(50, 99, 50), 100);
        assert_eq!(next_on_grid(50, 100, 50), 150);
        assert_eq!(next_on_grid(50, 333, 50), 350);
    }

    #[test]
    fn grid_saturates() {
        assert_eq!(next_on_grid(u64::MAX - 10, u64::MAX, 50), u64::MAX);
    }
}
