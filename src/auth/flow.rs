// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Redirect-preserving login and logout
//!
//! Login and logout are full-page navigations to backend endpoints. The
//! backend talks to the identity provider and finally redirects the browser
//! to `redirect_url`. This module builds those URLs and returns them as
//! [`NavigationCommand`] values; performing the navigation is the host's job.
//!
//! The login URL carries its parameters in a fixed order:
//!
//! ```text
//! {backend}/login?redirect_url=<encoded href>[&process_instance_id=<id>&task_guid=<guid>]
//! ```
//!
//! Backends parsing it expect the deep-link parameters after `redirect_url`.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::deep_link::DeepLinkTarget;
use crate::config::BackendConfig;
use crate::session::{NavigationLocation, SessionEnvironment, SessionOracle};

/// A navigation the host must perform
///
/// Control does not come back to the current view once the host follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum NavigationCommand {
    /// Replace the current page with `url`
    Navigate { url: String },
}

impl NavigationCommand {
    pub fn url(&self) -> &str {
        match self {
            NavigationCommand::Navigate { url } => url,
        }
    }
}

impl fmt::Display for NavigationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "navigate to {}", self.url())
    }
}

/// Builds login and logout redirects against one backend
#[derive(Debug, Clone)]
pub struct AuthFlow {
    backend_base_url: String,
}

impl AuthFlow {
    pub fn new(backend_base_url: impl Into<String>) -> Self {
        let base: String = backend_base_url.into();
        Self {
            backend_base_url: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.trimmed_base_url())
    }

    pub fn backend_base_url(&self) -> &str {
        &self.backend_base_url
    }

    /// Login URL returning the user to `location` afterwards
    ///
    /// # Example
    ///
    /// ```
    /// use portal_session::auth::AuthFlow;
    /// use portal_session::session::NavigationLocation;
    ///
    /// let flow = AuthFlow::new("https://backend.example/v1.0");
    /// let guid = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";
    /// let path = format!("/tasks/42/{}", guid);
    /// let location = NavigationLocation::new("https://app.example", path, "");
    /// let redirect = format!("https%3A%2F%2Fapp.example%2Ftasks%2F42%2F{}", guid);
    /// assert_eq!(
    ///     flow.build_login_url(Some(&location)),
    ///     format!(
    ///         "{}?redirect_url={}&process_instance_id=42&task_guid={}",
    ///         "https://backend.example/v1.0/login", redirect, guid
    ///     )
    /// );
    /// ```
    ///
    /// Without a location the URL still carries an empty `redirect_url` and
    /// no deep-link parameters.
    pub fn build_login_url(&self, location: Option<&NavigationLocation>) -> String {
        let href = location.map(NavigationLocation::href).unwrap_or_default();
        let mut params = vec![format!("redirect_url={}", urlencoding::encode(&href))];

        if let Some(target) = location.and_then(|l| DeepLinkTarget::from_path(&l.path)) {
            debug!(
                "Login keeps task deep link {} / {}",
                target.process_instance_id, target.task_guid
            );
            params.extend(
                target
                    .login_params()
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value)),
            );
        }

        format!("{}/login?{}", self.backend_base_url, params.join("&"))
    }

    /// Logout URL sending the user back to `origin`
    ///
    /// A missing identity token is sent as the literal `null`, which the
    /// backend treats as "no token hint".
    pub fn build_logout_url(&self, origin: &str, id_token: Option<&str>) -> String {
        format!(
            "{}/logout?redirect_url={}&id_token={}",
            self.backend_base_url,
            origin,
            id_token.unwrap_or("null")
        )
    }

    /// Navigation to the login page when the session has no access token
    ///
    /// Returns `None` when already logged in.
    pub fn ensure_logged_in<E: SessionEnvironment>(
        &self,
        oracle: &SessionOracle<E>,
    ) -> Option<NavigationCommand> {
        if oracle.is_logged_in() {
            return None;
        }
        let location = oracle.environment().location();
        let url = self.build_login_url(location.as_ref());
        debug!("Not logged in, redirecting to {}", url);
        Some(NavigationCommand::Navigate { url })
    }

    /// Navigation to the logout endpoint for the current session
    pub fn logout<E: SessionEnvironment>(&self, oracle: &SessionOracle<E>) -> NavigationCommand {
        let origin = oracle
            .environment()
            .location()
            .map(|l| l.origin)
            .unwrap_or_default();
        let id_token = oracle.id_token();
        let url = self.build_logout_url(&origin, id_token.as_deref());
        debug!("Logging out through {}/logout", self.backend_base_url);
        NavigationCommand::Navigate { url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CookieJar, StaticEnvironment};

    const GUID: &str = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";

    fn flow() -> AuthFlow {
        AuthFlow::new("http://localhost:7000/v1.0/")
    }

    #[test]
    fn test_login_url_without_deep_link() {
        let location =
            NavigationLocation::new("http://localhost:7001", "/admin", "?page=2&per_page=10");
        assert_eq!(
            flow().build_login_url(Some(&location)),
            concat!(
                "http://localhost:7000/v1.0/login",
                "?redirect_url=http%3A%2F%2Flocalhost%3A7001%2Fadmin%3Fpage%3D2%26per_page%3D10"
            )
        );
    }

    #[test]
    fn test_login_url_with_deep_link_keeps_param_order() {
        let location =
            NavigationLocation::new("https://app.example", format!("/tasks/42/{}", GUID), "");
        let url = flow().build_login_url(Some(&location));

        let redirect = url.find("redirect_url=").unwrap();
        let instance = url.find("&process_instance_id=42").unwrap();
        let task = url.find(&format!("&task_guid={}", GUID)).unwrap();
        assert!(redirect < instance && instance < task);
        assert!(url.ends_with(&format!("&task_guid={}", GUID)));
    }

    #[test]
    fn test_login_url_without_location() {
        assert_eq!(
            flow().build_login_url(None),
            "http://localhost:7000/v1.0/login?redirect_url="
        );
    }

    #[test]
    fn test_logout_url() {
        assert_eq!(
            flow().build_logout_url("https://app.example", Some("a.b.c")),
            "http://localhost:7000/v1.0/logout?redirect_url=https://app.example&id_token=a.b.c"
        );
        assert_eq!(
            flow().build_logout_url("https://app.example", None),
            "http://localhost:7000/v1.0/logout?redirect_url=https://app.example&id_token=null"
        );
    }

    #[test]
    fn test_ensure_logged_in() {
        let location = NavigationLocation::new("https://app.example", "/", "");
        let anonymous = SessionOracle::new(
            StaticEnvironment::new(CookieJar::new().with("id_token", "tok")).at(location.clone()),
        );
        let command = flow().ensure_logged_in(&anonymous).unwrap();
        assert_eq!(
            command.url(),
            "http://localhost:7000/v1.0/login?redirect_url=https%3A%2F%2Fapp.example%2F"
        );

        let logged_in = SessionOracle::new(
            StaticEnvironment::new(CookieJar::new().with("access_token", "abc")).at(location),
        );
        assert_eq!(flow().ensure_logged_in(&logged_in), None);
    }

    #[test]
    fn test_logout_command_uses_origin_and_id_token() {
        let oracle = SessionOracle::new(
            StaticEnvironment::new(CookieJar::new().with("id_token", "x.y.z"))
                .at(NavigationLocation::new("https://app.example", "/tasks", "?a=1")),
        );
        assert_eq!(
            flow().logout(&oracle),
            NavigationCommand::Navigate {
                url: concat!(
                    "http://localhost:7000/v1.0/logout",
                    "?redirect_url=https://app.example&id_token=x.y.z"
                )
                .to_string()
            }
        );
    }
}
