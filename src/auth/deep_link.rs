// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Task deep-link recognition
//!
//! A task view lives at `/tasks/<process instance id>/<task guid>`. When a
//! user lands on such a page without a session, the login handshake carries
//! both identifiers to the backend so the task can be resolved again after
//! the identity provider redirects back.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Exact task view path. Nothing may precede or follow it.
static TASK_SHOW_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/tasks/([0-9]+)/([0-9a-f]{8}-(?:[0-9a-f]{4}-){3}[0-9a-f]{12})$")
        .expect("task path pattern is valid")
});

/// Identifiers of the task a user was trying to reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLinkTarget {
    /// Decimal digits only
    pub process_instance_id: String,
    /// Lowercase hexadecimal 8-4-4-4-12 identifier
    pub task_guid: String,
}

impl DeepLinkTarget {
    /// Recognise a task view path
    ///
    /// Returns `None` for any path that is not exactly
    /// `/tasks/<digits>/<guid>`. A non-match is a routine outcome.
    ///
    /// # Example
    ///
    /// ```
    /// use portal_session::auth::DeepLinkTarget;
    ///
    /// let path = "/tasks/42/0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";
    /// let target = DeepLinkTarget::from_path(path).unwrap();
    /// assert_eq!(target.process_instance_id, "42");
    ///
    /// assert!(DeepLinkTarget::from_path("/tasks/42").is_none());
    /// ```
    pub fn from_path(path: &str) -> Option<Self> {
        let captures = TASK_SHOW_PATH.captures(path)?;
        Some(Self {
            process_instance_id: captures.get(1)?.as_str().to_string(),
            task_guid: captures.get(2)?.as_str().to_string(),
        })
    }

    /// Path of the task view this target designates
    pub fn path(&self) -> String {
        format!("/tasks/{}/{}", self.process_instance_id, self.task_guid)
    }

    /// Extra login query parameters, in wire order
    pub fn login_params(&self) -> [(&'static str, &str); 2] {
        [
            ("process_instance_id", self.process_instance_id.as_str()),
            ("task_guid", self.task_guid.as_str()),
        ]
    }
}
