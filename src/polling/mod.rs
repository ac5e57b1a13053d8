// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Bounded interval polling
//!
//! List views refresh themselves on a fixed cadence for a bounded total
//! duration. A view the user navigated away from without tearing down its
//! timer therefore stops talking to the backend on its own.
//!
//! ## Components
//!
//! * **Schedule**: validated interval/timeout pair
//! * **Registration**: Idle/Running/Stopped state machine over an injected [`Clock`]
//! * **Driver**: tokio task sleeping between ticks, owned through a [`PollHandle`]
//!
//! ## Usage
//!
//! ```no_run
//! use portal_session::polling::{spawn_poller, PollSchedule};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let schedule = PollSchedule::from_secs(5, 600)?;
//! let handle = spawn_poller(schedule, || println!("refresh"));
//!
//! // view torn down
//! handle.cancel();
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod driver;
pub mod registration;
pub mod schedule;

pub use clock::{Clock, ManualClock, TokioClock};
pub use driver::{spawn_poller, PollHandle};
pub use registration::{PollRegistration, PollState, StopReason};
pub use schedule::{PollSchedule, ScheduleError};
