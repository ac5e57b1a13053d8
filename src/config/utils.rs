// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;
use url::Url;

use super::{Config, CONFIG_SCHEMA};

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./portal_session --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Validates the configuration against rules the JSON schema cannot express.
///
/// # Validation Rules
///
/// - **Backend URL**: must parse as an absolute `http` or `https` URL without
///   query string or fragment
/// - **Polling**: interval must be positive and strictly smaller than the timeout
/// - **Pagination**: the default page size and every page size option must be positive
/// - **Cookies**: cookie names must be non-empty and distinct
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    let url = Url::parse(&config.backend.base_url)
        .with_context(|| format!("Invalid backend URL: {}", config.backend.base_url))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Backend URL must use http or https: {}", config.backend.base_url);
    }
    if url.query().is_some() || url.fragment().is_some() {
        anyhow::bail!(
            "Backend URL must not carry a query string or fragment: {}",
            config.backend.base_url
        );
    }

    config
        .polling
        .schedule()
        .context("Invalid polling configuration")?;

    if config.pagination.default_per_page == 0 {
        anyhow::bail!("Default page size must be positive");
    }
    if config.pagination.per_page_options.contains(&0) {
        anyhow::bail!("Page size options must be positive");
    }

    let cookies = &config.cookies;
    if cookies.access_token_name.is_empty() || cookies.id_token_name.is_empty() {
        anyhow::bail!("Cookie names must not be empty");
    }
    if cookies.access_token_name == cookies.id_token_name {
        anyhow::bail!(
            "Access and identity token cookies must differ, both are '{}'",
            cookies.access_token_name
        );
    }

    Ok(())
}
