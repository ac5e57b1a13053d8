// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Host environment seen by the session layer
//!
//! The session oracle and the login flow never read cookies or the current
//! location implicitly. They receive a [`SessionEnvironment`] which hosts
//! implement (a browser binding, a CLI reading a `Cookie` header, a test
//! fixture...). Every read goes back to the environment so a login or logout
//! performed elsewhere is visible on the next call.

use std::collections::HashMap;

use url::Url;

/// Read-only access to cookies and the current navigable location
pub trait SessionEnvironment {
    /// Value of the cookie `name`, `None` when the cookie is not set
    fn cookie(&self, name: &str) -> Option<String>;

    /// Current location, `None` when the host has no notion of one
    fn location(&self) -> Option<NavigationLocation>;
}

impl<E: SessionEnvironment + ?Sized> SessionEnvironment for &E {
    fn cookie(&self, name: &str) -> Option<String> {
        (**self).cookie(name)
    }

    fn location(&self) -> Option<NavigationLocation> {
        (**self).location()
    }
}

/// Origin, path and query string of the page the user is on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLocation {
    /// Scheme, host and port, e.g. `https://app.example`
    pub origin: String,
    /// Path component, e.g. `/tasks/42/...`
    pub path: String,
    /// Query string including its leading `?`, or empty
    pub search: String,
}

impl NavigationLocation {
    pub fn new(
        origin: impl Into<String>,
        path: impl Into<String>,
        search: impl Into<String>,
    ) -> Self {
        let search = search.into();
        let search = if search.is_empty() || search.starts_with('?') {
            search
        } else {
            format!("?{}", search)
        };
        Self {
            origin: origin.into(),
            path: path.into(),
            search,
        }
    }

    /// Full location without fragment: origin + path + search
    pub fn href(&self) -> String {
        format!("{}{}{}", self.origin, self.path, self.search)
    }

    /// Query string without its leading `?`
    pub fn query(&self) -> &str {
        self.search.strip_prefix('?').unwrap_or(&self.search)
    }
}

impl From<&Url> for NavigationLocation {
    fn from(url: &Url) -> Self {
        let search = url.query().map(|q| format!("?{}", q)).unwrap_or_default();
        Self {
            origin: url.origin().ascii_serialization(),
            path: url.path().to_string(),
            search,
        }
    }
}

/// Cookies parsed from a `Cookie` request header or `document.cookie` string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: HashMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name=value; name2=value2`
    ///
    /// Pairs without `=` are ignored. Values are trimmed, surrounding double
    /// quotes are removed and percent-escapes are decoded when they form valid
    /// UTF-8. When a name appears more than once the first value wins.
    pub fn parse(header: &str) -> Self {
        let mut cookies = HashMap::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() || cookies.contains_key(name) {
                continue;
            }
            let mut value = value.trim();
            if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                value = &value[1..value.len() - 1];
            }
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            cookies.insert(name.to_string(), value);
        }
        Self { cookies }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// A fixed snapshot of cookies and location
///
/// Used by the command line tool and by tests. Hosts with live state
/// implement [`SessionEnvironment`] directly instead.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    pub cookies: CookieJar,
    pub location: Option<NavigationLocation>,
}

impl StaticEnvironment {
    pub fn new(cookies: CookieJar) -> Self {
        Self {
            cookies,
            location: None,
        }
    }

    pub fn at(mut self, location: NavigationLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl SessionEnvironment for StaticEnvironment {
    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(str::to_string)
    }

    fn location(&self) -> Option<NavigationLocation> {
        self.location.clone()
    }
}
