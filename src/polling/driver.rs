// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tokio driver for poll registrations
//!
//! [`spawn_poller`] runs the initial invocation synchronously, then moves the
//! registration into a background task that sleeps until the next tick. The
//! returned [`PollHandle`] is owned by the view: cancelling it, or dropping
//! it, stops the refresh immediately.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{debug, error};
use tokio::task::JoinHandle;
use tokio::time;

use super::clock::TokioClock;
use super::registration::{PollRegistration, PollState, StopReason};
use super::schedule::PollSchedule;

/// Handle to a running poll registration
///
/// Dropping the handle cancels the registration.
pub struct PollHandle {
    cancelled: Arc<AtomicBool>,
    task: Option<JoinHandle<PollState>>,
}

/// Start polling `action` on the current tokio runtime
///
/// The action runs once before this function returns. Each later tick runs
/// it again without waiting for work it started to complete: an action that
/// spawns a request is responsible for discarding stale responses.
///
/// # Panics
///
/// Must be called from within a tokio runtime.
pub fn spawn_poller<A>(schedule: PollSchedule, mut action: A) -> PollHandle
where
    A: FnMut() + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));

    let guard = cancelled.clone();
    let mut registration = PollRegistration::new(schedule, TokioClock, move || {
        // a tick racing with cancel() must not run the action
        if !guard.load(Ordering::SeqCst) {
            action();
        }
    });
    registration.start();

    let stop_requested = cancelled.clone();
    let task = tokio::spawn(async move {
        while registration.is_running() {
            match registration.next_wake() {
                Some(wake_at) => time::sleep_until(time::Instant::from_std(wake_at)).await,
                // nothing left to schedule, only cancel() ends it
                None => std::future::pending::<()>().await,
            }
            if stop_requested.load(Ordering::SeqCst) {
                registration.cancel();
                break;
            }
            registration.poll();
        }
        registration.state()
    });

    PollHandle {
        cancelled,
        task: Some(task),
    }
}

impl PollHandle {
    /// Stop the registration
    ///
    /// Immediate and idempotent: no invocation starts after this returns.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!("Poll registration cancelled");
        }
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// True once the registration stopped, by timeout or cancellation
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the registration to stop and report its final state
    pub async fn join(mut self) -> PollState {
        let Some(task) = self.task.take() else {
            return PollState::Stopped(StopReason::Cancelled);
        };
        match task.await {
            Ok(state) => state,
            Err(e) if e.is_cancelled() => PollState::Stopped(StopReason::Cancelled),
            Err(e) => {
                error!("Poll task panicked: {}", e);
                PollState::Stopped(StopReason::Cancelled)
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            if !task.is_finished() {
                self.cancel();
            }
        }
    }
}
