// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use serde::{Deserialize, Serialize};

/// Names of the cookies the backend sets after a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_access_token_name")]
    pub access_token_name: String,

    #[serde(default = "default_id_token_name")]
    pub id_token_name: String,
}

fn default_access_token_name() -> String {
    "access_token".to_string()
}

fn default_id_token_name() -> String {
    "id_token".to_string()
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_token_name: default_access_token_name(),
            id_token_name: default_id_token_name(),
        }
    }
}
