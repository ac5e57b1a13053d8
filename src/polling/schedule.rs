// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::time::Duration;

use thiserror::Error;

/// Invalid refresh cadence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Poll interval must be greater than zero")]
    ZeroInterval,

    #[error("Poll timeout ({timeout:?}) must be greater than the interval ({interval:?})")]
    TimeoutNotAfterInterval {
        interval: Duration,
        timeout: Duration,
    },
}

/// Cadence and lifetime of a poll registration
///
/// The action runs once at registration, then at every multiple of
/// `interval` strictly before `timeout`. With a 5s interval and a 20s timeout
/// that is t=0, 5, 10 and 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    interval: Duration,
    timeout: Duration,
}

impl PollSchedule {
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, ScheduleError> {
        if interval.is_zero() {
            return Err(ScheduleError::ZeroInterval);
        }
        if timeout <= interval {
            return Err(ScheduleError::TimeoutNotAfterInterval { interval, timeout });
        }
        Ok(Self { interval, timeout })
    }

    pub fn from_secs(interval_seconds: u64, timeout_seconds: u64) -> Result<Self, ScheduleError> {
        Self::new(
            Duration::from_secs(interval_seconds),
            Duration::from_secs(timeout_seconds),
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of invocations over the whole lifetime, the initial one included
    pub fn max_invocations(&self) -> u64 {
        let interval = self.interval.as_nanos();
        let timeout = self.timeout.as_nanos();
        // ticks at k * interval for k >= 1 while k * interval < timeout
        let ticks = (timeout - 1) / interval;
        1 + ticks as u64
    }
}
