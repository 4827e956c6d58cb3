// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic activation of dwell-selected targets.

use glance_targets::HitTest;

/// Why a completed dwell could not be turned into a click.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActivationError {
    /// The target left the UI between the start of the dwell and its completion.
    #[error("target is no longer attached")]
    Detached,
    /// The UI refused the activation.
    #[error("activation rejected: {0}")]
    Rejected(String),
}

/// Performs the activation a direct tap or click on a target would.
pub trait Activator<K> {
    /// Activate `target` once.
    fn activate(&mut self, target: &K) -> Result<(), ActivationError>;
}

impl<K, T: Activator<K> + ?Sized> Activator<K> for &mut T {
    fn activate(&mut self, target: &K) -> Result<(), ActivationError> {
        (**self).activate(target)
    }
}

/// Everything the controller needs from the UI: an exact hit test and activation.
///
/// The controller adds the tolerance probes itself, using
/// [`TrackingConfig::hit_tolerance`](crate::TrackingConfig::hit_tolerance).
pub trait Surface<K>: HitTest<K> + Activator<K> {}

impl<K, T: HitTest<K> + Activator<K> + ?Sized> Surface<K> for T {}
