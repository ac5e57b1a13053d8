// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Workflow backend configuration

use serde::{Deserialize, Serialize};

/// Location of the workflow backend.
///
/// `base_url` includes the API prefix. Login and logout endpoints are built
/// as `{base_url}/login` and `{base_url}/logout`, list endpoints as
/// `{base_url}{path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend API, without trailing slash.
    ///
    /// Default is `http://localhost:7000/v1.0`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout applied to every HTTP request in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:7000/v1.0".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl BackendConfig {
    /// Base URL with any trailing slash removed
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
