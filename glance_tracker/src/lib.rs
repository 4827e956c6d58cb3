// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glance Tracker: gaze-driven dwell selection for switch-free UIs.
//!
//! [`EyeTrackingController`] ties the pieces together:
//!
//! - a [`GazeCapability`] backend whose acquisition is asynchronous and may fail,
//! - a [`SourceArbiter`](glance_event_state::arbiter::SourceArbiter) that lets
//!   the mouse override gaze until it has been still for a while,
//! - the UI's exact [`HitTest`](glance_targets::HitTest), which the controller
//!   wraps in a [`Tolerant`](glance_targets::Tolerant) resolver with the
//!   configured radius,
//! - a [`DwellState`](glance_event_state::dwell::DwellState) that fires once per
//!   sustained dwell,
//! - and an [`Activator`] that performs the click.
//!
//! The UI reads a [`Feedback`] snapshot to draw the cursor and dwell ring.
//!
//! The controller never reads a clock. Every call takes `now` in milliseconds,
//! and [`EyeTrackingController::next_deadline`] tells the host when to call
//! [`EyeTrackingController::tick`].
//!
//! ## Example
//!
//! ```
//! use glance_targets::HitTest;
//! use glance_tracker::{
//!     AcquisitionTicket, ActivationError, Activator, CapabilityError, EyeTrackingController,
//!     GazeCapability,
//! };
//! use kurbo::{Point, Rect};
//!
//! /// A backend that reports back later through `acquisition_finished`.
//! #[derive(Default)]
//! struct Camera {
//!     pending: Option<AcquisitionTicket>,
//! }
//!
//! impl GazeCapability for Camera {
//!     fn begin_acquisition(&mut self, ticket: AcquisitionTicket) -> Result<(), CapabilityError> {
//!         self.pending = Some(ticket);
//!         Ok(())
//!     }
//!     fn pause(&mut self) -> Result<(), CapabilityError> { Ok(()) }
//!     fn resume(&mut self) -> Result<(), CapabilityError> { Ok(()) }
//!     fn end(&mut self) -> Result<(), CapabilityError> { Ok(()) }
//! }
//!
//! /// One symbol, "yes", at (100..200, 100..200).
//! #[derive(Default)]
//! struct Board {
//!     spoken: Vec<&'static str>,
//! }
//!
//! impl HitTest<&'static str> for Board {
//!     fn hit_test(&self, point: Point) -> Option<&'static str> {
//!         Rect::new(100.0, 100.0, 200.0, 200.0).contains(point).then_some("yes")
//!     }
//! }
//!
//! impl Activator<&'static str> for Board {
//!     fn activate(&mut self, target: &&'static str) -> Result<(), ActivationError> {
//!         self.spoken.push(*target);
//!         Ok(())
//!     }
//! }
//!
//! let mut controller: EyeTrackingController<&str, _> =
//!     EyeTrackingController::with_default_config(Camera::default());
//! let mut ui = Board::default();
//!
//! controller.enable();
//! let ticket = controller.capability_mut().pending.take().unwrap();
//! controller.acquisition_finished(ticket, Ok(()));
//! assert!(controller.is_running());
//!
//! // Look at "yes" for two seconds.
//! for now in (0..=2000).step_by(50) {
//!     controller.on_gaze_sample(Point::new(150.0, 150.0), now, &mut ui);
//! }
//! assert_eq!(ui.spoken, ["yes"]);
//! ```

mod activation;
mod capability;
mod config;
mod controller;
mod feedback;

pub use activation::{ActivationError, Activator, Surface};
pub use capability::{AcquisitionTicket, CapabilityError, GazeCapability, Lifecycle};
pub use config::{ConfigError, DEFAULT_PROGRESS_INTERVAL, DisablePolicy, TrackingConfig};
pub use controller::EyeTrackingController;
pub use feedback::{CursorVisibility, Feedback, Selection};

pub use glance_event_state::arbiter::InputSource;
