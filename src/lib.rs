// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Portal session library
//!
//! Client-side building blocks for a workflow task portal:
//!
//! - [`session`]: identity claims and session facts derived from cookies
//! - [`auth`]: task deep-link matching and login/logout redirect construction
//! - [`polling`]: bounded interval refresh of list views
//! - [`pagination`]: namespaced page/per-page query parameters
//! - [`transport`]: the HTTP collaborator used by list views
//! - [`feed`]: a refreshing, paginated list view tying the above together
//! - [`config`]: YAML configuration

pub mod auth;
pub mod config;
pub mod feed;
pub mod pagination;
pub mod polling;
pub mod session;
pub mod transport;

pub use auth::{AuthFlow, DeepLinkTarget, NavigationCommand};
pub use pagination::PaginationQuery;
pub use polling::{PollHandle, PollRegistration, PollSchedule};
pub use session::{IdentityClaims, SessionFacts, SessionOracle};
