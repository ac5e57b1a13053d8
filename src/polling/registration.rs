// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Poll registration state machine
//!
//! ```text
//!   Idle --start--> Running --poll (elapsed >= timeout)--> Stopped(TimedOut)
//!     |               |
//!     +----cancel-----+--cancel--> Stopped(Cancelled)
//! ```
//!
//! `Stopped` is terminal. The registration does not own a timer: whoever
//! drives it asks for [`PollRegistration::next_wake`] and calls
//! [`PollRegistration::poll`] once that instant has passed. This keeps the
//! timing logic testable with a [`ManualClock`](super::ManualClock).

use std::time::{Duration, Instant};

use log::debug;

use super::clock::Clock;
use super::schedule::PollSchedule;

/// Why a registration stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The total duration elapsed
    TimedOut,
    /// The owning view asked to stop
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Running,
    Stopped(StopReason),
}

/// A refresh action bound to a [`PollSchedule`]
pub struct PollRegistration<C, A> {
    schedule: PollSchedule,
    clock: C,
    action: A,
    state: PollState,
    started_at: Option<Instant>,
    ticks: u32,
    invocations: u64,
}

impl<C, A> PollRegistration<C, A>
where
    C: Clock,
    A: FnMut(),
{
    pub fn new(schedule: PollSchedule, clock: C, action: A) -> Self {
        Self {
            schedule,
            clock,
            action,
            state: PollState::Idle,
            started_at: None,
            ticks: 0,
            invocations: 0,
        }
    }

    /// Leave `Idle`: record the start time and run the initial invocation
    ///
    /// Returns `false` without doing anything in any other state.
    pub fn start(&mut self) -> bool {
        if self.state != PollState::Idle {
            return false;
        }
        self.started_at = Some(self.clock.now());
        self.state = PollState::Running;
        debug!(
            "Poll registration started (every {:?} for {:?})",
            self.schedule.interval(),
            self.schedule.timeout()
        );
        self.invoke();
        true
    }

    /// Run every tick that is due, then stop if the timeout elapsed
    ///
    /// Ticks are fixed-rate: tick N is due at `started_at + N * interval`
    /// whatever the time the previous invocation took. A late call fires all
    /// missed ticks that fall before the timeout. Returns the number of
    /// invocations performed.
    pub fn poll(&mut self) -> usize {
        let Some(started_at) = self.running_since() else {
            return 0;
        };
        let now = self.clock.now();
        let mut fired = 0;

        loop {
            let offset = self.tick_offset(self.ticks.saturating_add(1));
            // a tick too far out to be represented is never due
            let due = started_at.checked_add(offset).is_some_and(|at| at <= now);
            if offset >= self.schedule.timeout() || !due {
                break;
            }
            self.ticks += 1;
            self.invoke();
            fired += 1;
        }

        if now.saturating_duration_since(started_at) >= self.schedule.timeout() {
            self.stop(StopReason::TimedOut);
        }
        fired
    }

    /// Stop immediately
    ///
    /// Cancelling a stopped registration is a no-op and returns `false`.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            PollState::Stopped(_) => false,
            PollState::Idle | PollState::Running => {
                self.stop(StopReason::Cancelled);
                true
            }
        }
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do
    ///
    /// That is the next tick, or the deadline when no tick remains.
    /// `None` unless running, or when both lie beyond what [`Instant`] can
    /// represent: such a registration only stops through [`cancel`](Self::cancel).
    pub fn next_wake(&self) -> Option<Instant> {
        let started_at = self.running_since()?;
        let deadline = started_at.checked_add(self.schedule.timeout());
        let next_tick = started_at.checked_add(self.tick_offset(self.ticks.saturating_add(1)));
        match (next_tick, deadline) {
            (Some(tick), Some(deadline)) => Some(tick.min(deadline)),
            (tick, deadline) => tick.or(deadline),
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PollState::Running
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    /// Invocations so far, the initial one included
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    fn running_since(&self) -> Option<Instant> {
        match self.state {
            PollState::Running => self.started_at,
            _ => None,
        }
    }

    fn tick_offset(&self, tick: u32) -> Duration {
        self.schedule.interval().saturating_mul(tick)
    }

    fn invoke(&mut self) {
        self.invocations += 1;
        (self.action)();
    }

    fn stop(&mut self, reason: StopReason) {
        debug!(
            "Poll registration stopped ({:?}) after {} invocations",
            reason, self.invocations
        );
        self.state = PollState::Stopped(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polling::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Registration recording the elapsed second of each invocation
    fn recording(
        interval: u64,
        timeout: u64,
    ) -> (
        ManualClock,
        Rc<RefCell<Vec<u64>>>,
        PollRegistration<ManualClock, impl FnMut()>,
    ) {
        let clock = ManualClock::new();
        let origin = clock.now();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let action_clock = clock.clone();
        let action_calls = calls.clone();
        let registration = PollRegistration::new(
            PollSchedule::from_secs(interval, timeout).unwrap(),
            clock.clone(),
            move || {
                let elapsed = action_clock.now().duration_since(origin).as_secs();
                action_calls.borrow_mut().push(elapsed);
            },
        );
        (clock, calls, registration)
    }

    fn advance_and_poll<A: FnMut()>(
        clock: &ManualClock,
        registration: &mut PollRegistration<ManualClock, A>,
        seconds: u64,
    ) {
        for _ in 0..seconds {
            clock.advance(Duration::from_secs(1));
            registration.poll();
        }
    }

    #[test]
    fn test_runs_immediately_then_every_interval_until_timeout() {
        let (clock, calls, mut registration) = recording(5, 20);
        assert_eq!(registration.state(), PollState::Idle);

        assert!(registration.start());
        assert_eq!(*calls.borrow(), vec![0]);

        advance_and_poll(&clock, &mut registration, 30);

        assert_eq!(*calls.borrow(), vec![0, 5, 10, 15]);
        assert_eq!(registration.invocations(), 4);
        assert_eq!(registration.state(), PollState::Stopped(StopReason::TimedOut));
    }

    #[test]
    fn test_cancel_stops_further_invocations() {
        let (clock, calls, mut registration) = recording(5, 20);
        registration.start();
        advance_and_poll(&clock, &mut registration, 7);

        assert!(registration.cancel());
        assert!(!registration.cancel());
        advance_and_poll(&clock, &mut registration, 30);

        assert_eq!(*calls.borrow(), vec![0, 5]);
        assert_eq!(registration.state(), PollState::Stopped(StopReason::Cancelled));
        assert_eq!(registration.next_wake(), None);
    }

    #[test]
    fn test_late_poll_catches_up_at_fixed_rate() {
        let (clock, calls, mut registration) = recording(5, 20);
        registration.start();

        clock.advance(Duration::from_secs(12));
        assert_eq!(registration.poll(), 2);
        assert!(registration.is_running());

        clock.advance(Duration::from_secs(100));
        assert_eq!(registration.poll(), 1);
        assert_eq!(*calls.borrow(), vec![0, 12, 12, 112]);
        assert_eq!(registration.state(), PollState::Stopped(StopReason::TimedOut));
    }

    #[test]
    fn test_stopped_is_terminal() {
        let (clock, calls, mut registration) = recording(5, 20);
        registration.cancel();

        assert!(!registration.start());
        advance_and_poll(&clock, &mut registration, 10);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_next_wake_tracks_ticks_and_deadline() {
        let (clock, _calls, mut registration) = recording(5, 12);
        assert_eq!(registration.next_wake(), None);
        registration.start();
        let started = registration.started_at().unwrap();

        assert_eq!(registration.next_wake(), Some(started + Duration::from_secs(5)));
        clock.advance(Duration::from_secs(10));
        registration.poll();
        // next tick would be t=15, past the deadline
        assert_eq!(registration.next_wake(), Some(started + Duration::from_secs(12)));
    }

    #[test]
    fn test_unrepresentable_timeout_means_no_deadline() {
        let clock = ManualClock::new();
        let mut count = 0;
        let mut registration = PollRegistration::new(
            PollSchedule::from_secs(5, u64::MAX).unwrap(),
            clock.clone(),
            || count += 1,
        );
        registration.start();
        let started = registration.started_at().unwrap();

        // the deadline overflows, the next tick is still scheduled
        assert_eq!(registration.next_wake(), Some(started + Duration::from_secs(5)));
        clock.advance(Duration::from_secs(11));
        assert_eq!(registration.poll(), 2);
        assert!(registration.is_running());
        assert!(registration.cancel());
        drop(registration);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_unrepresentable_interval_waits_for_cancel() {
        let clock = ManualClock::new();
        let mut registration = PollRegistration::new(
            PollSchedule::new(Duration::from_secs(u64::MAX - 1), Duration::MAX).unwrap(),
            clock.clone(),
            || {},
        );
        registration.start();

        assert_eq!(registration.next_wake(), None);
        clock.advance(Duration::from_secs(3600));
        assert_eq!(registration.poll(), 0);
        assert!(registration.is_running());
        assert_eq!(registration.invocations(), 1);
    }
}
