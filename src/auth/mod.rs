// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Authentication handshake helpers
//!
//! This module contains the client side of the login and logout handshake:
//!
//! - [`deep_link`]: recognition of task view paths that must survive login
//! - [`flow`]: construction of login/logout redirects as navigation commands

pub mod deep_link;
pub mod flow;

pub use deep_link::DeepLinkTarget;
pub use flow::{AuthFlow, NavigationCommand};
