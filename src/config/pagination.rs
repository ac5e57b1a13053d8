// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Page size settings for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the URL does not carry one. Default is 50.
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Page sizes offered to the user.
    #[serde(default = "default_per_page_options")]
    pub per_page_options: Vec<u32>,
}

fn default_per_page() -> u32 {
    50
}

fn default_per_page_options() -> Vec<u32> {
    vec![10, 50, 100]
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            per_page_options: default_per_page_options(),
        }
    }
}

impl PaginationConfig {
    /// Accept `per_page` only if it is one of the offered page sizes
    ///
    /// An empty option list offers every positive size.
    pub fn offered_per_page(&self, per_page: u32) -> Result<u32> {
        if per_page == 0 {
            anyhow::bail!("Page size must be positive");
        }
        if !self.per_page_options.is_empty() && !self.per_page_options.contains(&per_page) {
            anyhow::bail!(
                "Page size {} is not offered, choose one of {:?}",
                per_page,
                self.per_page_options
            );
        }
        Ok(per_page)
    }
}
