// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The gaze-estimation capability seam and its lifecycle.
//!
//! Acquiring the capability (camera permission, model warm-up) is slow and can
//! fail, so it is split in two: [`GazeCapability::begin_acquisition`] starts it
//! and hands the backend an [`AcquisitionTicket`]; the backend later reports the
//! outcome through
//! [`EyeTrackingController::acquisition_finished`](crate::EyeTrackingController::acquisition_finished)
//! with the same ticket. Results carrying any other ticket are discarded.

/// Token identifying one acquisition attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AcquisitionTicket(pub(crate) u64);

impl AcquisitionTicket {
    /// Raw ticket number; increases with every attempt made by a controller.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Failures reported by a gaze capability. All of them reduce to "tracking not active".
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    /// The user declined camera access.
    #[error("camera permission denied")]
    PermissionDenied,
    /// No camera or no estimation support in this environment.
    #[error("gaze estimation is not supported in this environment")]
    Unsupported,
    /// The backend failed to load or crashed.
    #[error("gaze backend failed: {0}")]
    Backend(String),
}

/// External gaze-estimation backend.
///
/// Samples are not pulled through this trait; the host forwards them to
/// [`EyeTrackingController::on_gaze_sample`](crate::EyeTrackingController::on_gaze_sample)
/// as they arrive. A missing sample means "no information", never "origin".
pub trait GazeCapability {
    /// Start acquiring the capability.
    ///
    /// Returning `Err` reports an immediate failure. Returning `Ok` means the
    /// attempt is in flight and its outcome will be reported with `ticket`.
    fn begin_acquisition(&mut self, ticket: AcquisitionTicket) -> Result<(), CapabilityError>;

    /// Stop delivering samples but keep the camera and model warm.
    fn pause(&mut self) -> Result<(), CapabilityError>;

    /// Resume delivering samples after [`GazeCapability::pause`].
    fn resume(&mut self) -> Result<(), CapabilityError>;

    /// Tear down fully: release the camera and remove any overlay.
    fn end(&mut self) -> Result<(), CapabilityError>;
}

impl<T: GazeCapability + ?Sized> GazeCapability for &mut T {
    fn begin_acquisition(&mut self, ticket: AcquisitionTicket) -> Result<(), CapabilityError> {
        (**self).begin_acquisition(ticket)
    }

    fn pause(&mut self) -> Result<(), CapabilityError> {
        (**self).pause()
    }

    fn resume(&mut self) -> Result<(), CapabilityError> {
        (**self).resume()
    }

    fn end(&mut self) -> Result<(), CapabilityError> {
        (**self).end()
    }
}

/// Lifecycle of the capability as owned by one controller.
///
/// `Uninitialized → Initializing → Running ⇄ Paused`, and `→ Ended` on
/// termination. A failed acquisition returns to `Uninitialized` so the next
/// enable retries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Never acquired, released, or the last acquisition failed.
    Uninitialized,
    /// Acquisition in flight.
    Initializing {
        /// Ticket of the in-flight attempt.
        ticket: AcquisitionTicket,
        /// False once disabled mid-acquisition; a late success then stands down
        /// instead of running.
        wanted: bool,
    },
    /// Acquired and delivering samples.
    Running,
    /// Acquired but paused; resuming is cheap.
    Paused,
    /// Terminated for good.
    Ended,
}

impl Lifecycle {
    /// Returns true if samples are being consumed.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true while the backend holds (or may be about to hold) the camera.
    pub fn holds_capability(self) -> bool {
        matches!(self, Self::Initializing { .. } | Self::Running | Self::Paused)
    }
}
