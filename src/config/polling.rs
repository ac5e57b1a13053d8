// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! List view refresh configuration

use serde::{Deserialize, Serialize};

use crate::polling::{PollSchedule, ScheduleError};

/// Cadence and total duration of list view refreshes.
///
/// A list view re-fetches its page every `interval_seconds` and stops after
/// `timeout_seconds`, so a view left open in a background tab does not keep
/// hitting the backend forever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between two refreshes. Default is 5.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Seconds after which refreshing stops. Default is 600 (10 minutes).
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_interval_seconds() -> u64 {
    5
}

fn default_timeout_seconds() -> u64 {
    600
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl PollingConfig {
    /// Validated schedule built from this configuration
    pub fn schedule(&self) -> Result<PollSchedule, ScheduleError> {
        PollSchedule::from_secs(self.interval_seconds, self.timeout_seconds)
    }
}
