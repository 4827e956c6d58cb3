// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracking configuration, loadable from RON.
//!
//! Every field has a default, so a config file only names what it changes:
//!
//! ```
//! use glance_tracker::{DisablePolicy, TrackingConfig};
//!
//! let config = TrackingConfig::from_ron("(dwell_time_ms: 1500, disable_policy: Release)").unwrap();
//! assert_eq!(config.dwell_time_ms, 1500);
//! assert_eq!(config.disable_policy, DisablePolicy::Release);
//! assert_eq!(config.pointer_inactivity_ms, 5000);
//! ```

use glance_event_state::arbiter::DEFAULT_INACTIVITY_TIMEOUT;
use glance_event_state::dwell::DEFAULT_DWELL_TIME;
use glance_targets::{DEFAULT_TOLERANCE, Tolerant};
use serde::{Deserialize, Serialize};

/// Default spacing of progress samples in milliseconds.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 50;

/// What disabling tracking does to an acquired capability.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisablePolicy {
    /// Pause the capability; re-enabling resumes without re-acquiring.
    #[default]
    Pause,
    /// End the capability; re-enabling acquires it again.
    Release,
}

/// Errors from loading or applying a [`TrackingConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The text is not a valid RON config.
    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The config could not be written out.
    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] ron::Error),
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Settings for an [`EyeTrackingController`](crate::EyeTrackingController).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Whether tracking should be enabled on construction.
    pub enabled: bool,
    /// Continuous attention needed to select a target, in milliseconds.
    pub dwell_time_ms: u64,
    /// Distance of the tolerance probes around an unresolved point.
    pub hit_tolerance: f64,
    /// Spacing of progress samples while dwelling, in milliseconds.
    pub progress_interval_ms: u64,
    /// Pointer quiet period before gaze regains the cursor, in milliseconds.
    pub pointer_inactivity_ms: u64,
    /// What disabling does to an acquired capability.
    pub disable_policy: DisablePolicy,
    /// Hide the system cursor while tracking runs.
    pub hide_system_cursor: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dwell_time_ms: DEFAULT_DWELL_TIME,
            hit_tolerance: DEFAULT_TOLERANCE,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL,
            pointer_inactivity_ms: DEFAULT_INACTIVITY_TIMEOUT,
            disable_policy: DisablePolicy::Pause,
            hide_system_cursor: true,
        }
    }
}

impl TrackingConfig {
    /// Parse and validate a RON config.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty-printed RON.
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dwell_time_ms == 0 {
            return Err(ConfigError::Invalid("dwell_time_ms must be positive"));
        }
        if self.progress_interval_ms == 0 {
            return Err(ConfigError::Invalid("progress_interval_ms must be positive"));
        }
        if !self.hit_tolerance.is_finite() || self.hit_tolerance < 0.0 {
            return Err(ConfigError::Invalid(
                "hit_tolerance must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Wrap an exact hit test with this config's tolerance radius.
    pub fn tolerant<H>(&self, hit: H) -> Tolerant<H> {
        Tolerant::with_radius(hit, self.hit_tolerance)
    }
}
