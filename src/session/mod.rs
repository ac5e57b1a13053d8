// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Session
//!
//! Identity facts derived from the access and identity token cookies.
//!
//! ## Components
//!
//! * **Claims**: unverified decoding of the identity token payload
//! * **Environment**: the read-only cookie and location capability injected by the host
//! * **Oracle**: logged-in state, display name, email and backend flags
//!
//! ## Usage
//!
//! ```
//! use portal_session::session::{CookieJar, SessionOracle, StaticEnvironment};
//!
//! let env = StaticEnvironment::new(CookieJar::parse("access_token=abc; id_token=undefined"));
//! let oracle = SessionOracle::new(env);
//!
//! assert!(oracle.is_logged_in());
//! assert_eq!(oracle.preferred_display_name(), None);
//! ```

pub mod claims;
pub mod environment;
pub mod oracle;

pub use claims::{IdentityClaims, MalformedTokenError};
pub use environment::{CookieJar, NavigationLocation, SessionEnvironment, StaticEnvironment};
pub use oracle::{SessionFacts, SessionOracle};
