// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Self-refreshing paginated list
//!
//! A [`ListFeed`] fetches one page of a backend list endpoint on a bounded
//! poll schedule. Fetches are not serialized: every tick issues a new request
//! even if the previous one is still in flight. Each request gets a sequence
//! number and a response is only applied if it is newer than everything
//! applied so far, so a slow old response never overwrites a fresh one.
//!
//! A 401/403 from the backend stops the feed and records the login
//! navigation the host should perform.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::auth::NavigationCommand;
use crate::pagination::{ListPage, PaginationQuery};
use crate::polling::{spawn_poller, PollHandle, PollSchedule};
use crate::transport::{Transport, TransportError};

/// Backend list of process instances started by the current user that wait on a task
pub const OPEN_PROCESSES_PATH: &str = "/tasks/for-my-open-processes";
/// Query parameter namespace of that list
pub const OPEN_PROCESSES_NAMESPACE: &str = "tasks_for_my_open_processes";
/// Page size of that list when the URL does not set one
pub const OPEN_PROCESSES_PER_PAGE: u32 = 5;

/// Point-in-time view of a feed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedSnapshot {
    /// Most recently applied page
    pub page: Option<ListPage<Value>>,
    /// Error of the latest failed fetch, cleared by the next applied page
    pub last_error: Option<String>,
    /// Set once the backend rejected the session
    pub login_required: Option<NavigationCommand>,
    pub fetches_issued: u64,
}

#[derive(Default)]
struct FeedState {
    issued: u64,
    applied: u64,
    snapshot: FeedSnapshot,
}

struct Shared {
    state: Mutex<FeedState>,
    poller: Mutex<Option<PollHandle>>,
    updates: watch::Sender<u64>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poller(&self) -> MutexGuard<'_, Option<PollHandle>> {
        self.poller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Next sequence number, `None` once the session was rejected
    fn issue(&self) -> Option<u64> {
        let mut state = self.state();
        if state.snapshot.login_required.is_some() {
            return None;
        }
        state.issued += 1;
        state.snapshot.fetches_issued = state.issued;
        Some(state.issued)
    }

    fn complete(&self, seq: u64, result: Result<Value, TransportError>, login: &NavigationCommand) {
        let mut rejected = false;
        {
            let mut state = self.state();
            match result {
                Err(e) if e.is_unauthorized() => {
                    info!("Session rejected by the backend, login required");
                    state.snapshot.last_error = Some(e.to_string());
                    state.snapshot.login_required = Some(login.clone());
                    rejected = true;
                }
                _ if seq <= state.applied => {
                    debug!("Discarding response #{} (already at #{})", seq, state.applied);
                    return;
                }
                Ok(body) => match serde_json::from_value::<ListPage<Value>>(body) {
                    Ok(page) => {
                        debug!(
                            "Response #{}: {} of {} items",
                            seq, page.pagination.count, page.pagination.total
                        );
                        state.applied = seq;
                        state.snapshot.page = Some(page);
                        state.snapshot.last_error = None;
                    }
                    Err(e) => {
                        warn!("Response #{} is not a list page: {}", seq, e);
                        state.snapshot.last_error = Some(e.to_string());
                    }
                },
                Err(e) => {
                    warn!("Fetch #{} failed: {}", seq, e);
                    state.snapshot.last_error = Some(e.to_string());
                }
            }
        }

        self.updates.send_modify(|revision| *revision += 1);

        if rejected {
            if let Some(handle) = self.poller().take() {
                handle.cancel();
            }
        }
    }
}

/// A list endpoint page kept fresh by a poller
pub struct ListFeed {
    query: PaginationQuery,
    path: String,
    shared: Arc<Shared>,
}

impl ListFeed {
    /// Start fetching `query`'s page of `base_path`
    ///
    /// The first fetch is issued before this returns. `login` is recorded
    /// if the backend rejects the session.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<T>(
        transport: Arc<T>,
        base_path: &str,
        query: PaginationQuery,
        schedule: PollSchedule,
        login: NavigationCommand,
    ) -> Self
    where
        T: Transport + ?Sized + 'static,
    {
        let path = query.api_path(base_path);
        let (updates, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            state: Mutex::new(FeedState::default()),
            poller: Mutex::new(None),
            updates,
        });

        let tick_shared = shared.clone();
        let tick_path = path.clone();
        let handle = spawn_poller(schedule, move || {
            let Some(seq) = tick_shared.issue() else {
                return;
            };
            let transport = transport.clone();
            let shared = tick_shared.clone();
            let path = tick_path.clone();
            let login = login.clone();
            tokio::spawn(async move {
                let result = transport.get_json(&path).await;
                shared.complete(seq, result, &login);
            });
        });

        {
            // the first fetch may already have been rejected
            let mut slot = shared.poller();
            if shared.state().snapshot.login_required.is_some() {
                handle.cancel();
            } else {
                *slot = Some(handle);
            }
        }

        info!("Feed started for {}", path);
        Self {
            query,
            path,
            shared,
        }
    }

    /// Feed of the current user's open process instances
    ///
    /// Page and page size are read from `search`, the current page's query.
    pub fn for_my_open_processes<T>(
        transport: Arc<T>,
        search: &str,
        schedule: PollSchedule,
        login: NavigationCommand,
    ) -> Self
    where
        T: Transport + ?Sized + 'static,
    {
        let query = PaginationQuery::decode_query(
            search,
            OPEN_PROCESSES_NAMESPACE,
            OPEN_PROCESSES_PER_PAGE,
        );
        Self::start(transport, OPEN_PROCESSES_PATH, query, schedule, login)
    }

    pub fn query(&self) -> &PaginationQuery {
        &self.query
    }

    /// Backend path fetched on every tick
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.shared.state().snapshot.clone()
    }

    pub fn latest(&self) -> Option<ListPage<Value>> {
        self.shared.state().snapshot.page.clone()
    }

    pub fn login_required(&self) -> Option<NavigationCommand> {
        self.shared.state().snapshot.login_required.clone()
    }

    /// Receiver notified every time a response is applied or fails
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.updates.subscribe()
    }

    /// True once no further fetch will be issued
    pub fn is_stopped(&self) -> bool {
        self.shared
            .poller()
            .as_ref()
            .map_or(true, PollHandle::is_finished)
    }

    /// Stop refreshing; responses already in flight are still applied
    pub fn stop(&self) {
        if let Some(handle) = self.shared.poller().take() {
            handle.cancel();
        }
    }
}

impl Drop for ListFeed {
    fn drop(&mut self) {
        self.stop();
    }
}
