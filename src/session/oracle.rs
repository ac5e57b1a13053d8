// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Session facts derived from cookies
//!
//! [`SessionOracle`] answers questions such as "is the user logged in" or
//! "which name should be displayed" by reading the access and identity token
//! cookies from its [`SessionEnvironment`] on every call. Nothing is cached:
//! a logout performed in another view is observed on the next read.
//!
//! Decoding failures of the identity token never escape this layer. A
//! malformed token is logged and treated as "no identity", so callers see
//! `None`/`false` defaults.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use super::claims::IdentityClaims;
use super::environment::SessionEnvironment;
use crate::config::CookieConfig;

/// Claim set by the backend when authentication is turned off entirely
pub const AUTHENTICATION_DISABLED_CLAIM: &str = "authentication_disabled";
/// Claim set for guest users that may only complete a single task
pub const GUEST_TASK_COMPLETION_CLAIM: &str = "only_guest_task_completion";

/// Literal some hosts store when the identity token was never set
const UNSET_TOKEN_LITERAL: &str = "undefined";

/// Snapshot of everything the oracle knows about the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFacts {
    pub access_token_present: bool,
    pub is_logged_in: bool,
    pub authentication_disabled: bool,
    pub guest_task_completion_only: bool,
    pub preferred_display_name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Derives session facts from the cookies of a [`SessionEnvironment`]
#[derive(Debug, Clone)]
pub struct SessionOracle<E> {
    env: E,
    cookies: CookieConfig,
}

impl<E: SessionEnvironment> SessionOracle<E> {
    /// Oracle reading the default `access_token` / `id_token` cookies
    pub fn new(env: E) -> Self {
        Self::with_cookie_names(env, CookieConfig::default())
    }

    pub fn with_cookie_names(env: E, cookies: CookieConfig) -> Self {
        Self { env, cookies }
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    /// The access token cookie, verbatim
    pub fn access_token(&self) -> Option<String> {
        self.env.cookie(&self.cookies.access_token_name)
    }

    /// The identity token cookie, verbatim
    pub fn id_token(&self) -> Option<String> {
        self.env.cookie(&self.cookies.id_token_name)
    }

    /// True iff the access token cookie is present and non-empty
    ///
    /// The identity token never influences this flag.
    pub fn is_logged_in(&self) -> bool {
        self.access_token().is_some_and(|token| !token.is_empty())
    }

    /// Claims of the identity token, `None` when absent or undecodable
    pub fn current_claims(&self) -> Option<IdentityClaims> {
        let token = self.id_token()?;
        if token.is_empty() || token == UNSET_TOKEN_LITERAL {
            return None;
        }
        match IdentityClaims::decode(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                warn!("Ignoring malformed identity token: {}", e);
                None
            }
        }
    }

    pub fn authentication_disabled(&self) -> bool {
        self.bool_claim(AUTHENTICATION_DISABLED_CLAIM)
    }

    pub fn guest_task_completion_only(&self) -> bool {
        self.bool_claim(GUEST_TASK_COMPLETION_CLAIM)
    }

    /// Name to show for the current user
    ///
    /// Resolution order is `preferred_username`, then `name`, then
    /// `given_name`. Some providers (Google among them) omit
    /// `preferred_username`, hence the fallbacks. This is a heuristic and may
    /// not cover every provider.
    pub fn preferred_display_name(&self) -> Option<String> {
        let claims = self.current_claims()?;
        display_name_from(&claims)
    }

    pub fn email(&self) -> Option<String> {
        self.current_claims()
            .and_then(|claims| claims.get_str("email").map(str::to_string))
    }

    /// All facts computed from a single read of the cookies
    pub fn facts(&self) -> SessionFacts {
        let access_token_present = self.is_logged_in();
        let claims = self.current_claims();
        let flag = |name: &str| {
            claims
                .as_ref()
                .and_then(|c| c.get_bool(name))
                .unwrap_or(false)
        };

        SessionFacts {
            access_token_present,
            is_logged_in: access_token_present,
            authentication_disabled: flag(AUTHENTICATION_DISABLED_CLAIM),
            guest_task_completion_only: flag(GUEST_TASK_COMPLETION_CLAIM),
            preferred_display_name: claims.as_ref().and_then(display_name_from),
            email: claims
                .as_ref()
                .and_then(|c| c.get_str("email"))
                .map(str::to_string),
            expires_at: claims.as_ref().and_then(IdentityClaims::expires_at),
        }
    }

    fn bool_claim(&self, name: &str) -> bool {
        self.current_claims()
            .and_then(|claims| claims.get_bool(name))
            .unwrap_or(false)
    }
}

fn display_name_from(claims: &IdentityClaims) -> Option<String> {
    ["preferred_username", "name", "given_name"]
        .iter()
        .find_map(|claim| claims.get_str(claim))
        .map(str::to_string)
}
