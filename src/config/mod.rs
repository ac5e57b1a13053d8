// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the portal session client
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings. The configuration is backed by a YAML file and
//! validated against a JSON schema before being deserialized.
//!
//! ## Configuration Structure
//!
//! - `backend`: Base URL of the workflow backend and request timeout
//! - `cookies`: Names of the access and identity token cookies
//! - `polling`: Refresh cadence and total refresh duration for list views
//! - `pagination`: Default page size and page size choices
//!
//! ## Usage
//!
//! ```no_run
//! use portal_session::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("portal.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some("https://backend.example/v1.0".to_string()), // Backend URL
//!     Some(10),                                           // Poll interval
//!     None,                                               // Poll timeout
//!     Some(25),                                           // Default per page
//! );
//!
//! println!("Backend: {}", config.backend.base_url);
//! ```

pub mod backend;
pub mod cookies;
pub mod pagination;
pub mod polling;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use backend::BackendConfig;
pub use cookies::CookieConfig;
pub use pagination::PaginationConfig;
pub use polling::PollingConfig;
pub use utils::{output_config_schema, validate_specific_rules};

/// Embedded JSON schema for the configuration file
pub(crate) const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Root configuration structure.
///
/// Every section falls back to its defaults when missing from the file, so
/// an empty YAML document is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Workflow backend location.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Cookie names holding the tokens set by the backend after login.
    #[serde(default)]
    pub cookies: CookieConfig,

    /// Bounded refresh of list views.
    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with default values. A file failing schema
    /// validation, deserialization or the additional rules makes the loader
    /// write a `.sample.yaml` file next to it and return an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        let config = match Self::from_yaml_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration error in {}: {:#}", path.display(), err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(err.context(format!(
                    "Invalid configuration file {}",
                    path.display()
                )));
            }
        };

        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        // An empty document is valid and means "all defaults"
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let yaml_value: serde_yml::Value =
            serde_yml::from_str(contents).context("Failed to parse YAML configuration")?;

        let json_value = serde_json::to_value(&yaml_value)
            .context("Failed to convert YAML to JSON for validation")?;

        let schema: serde_json::Value =
            serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)
            .context("Failed to build JSON schema validator")?;

        debug!("Validating configuration against schema");
        if let Err(error) = validator.validate(&json_value) {
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config =
            serde_yml::from_str(contents).context("Failed to deserialize configuration")?;

        validate_specific_rules(&config)?;
        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Validate the configuration against the additional rules
    pub fn validate(&self) -> Result<()> {
        validate_specific_rules(self)
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided override the existing
    /// configuration.
    ///
    /// # Parameters
    ///
    /// * `backend_url` - Base URL of the workflow backend
    /// * `poll_interval_seconds` - Refresh cadence of list views
    /// * `poll_timeout_seconds` - Total refresh duration of list views
    /// * `default_per_page` - Page size used when the URL carries none
    pub fn apply_args(
        &mut self,
        backend_url: Option<String>,
        poll_interval_seconds: Option<u64>,
        poll_timeout_seconds: Option<u64>,
        default_per_page: Option<u32>,
    ) {
        if let Some(url) = backend_url {
            debug!("Overriding backend URL from command line: {}", url);
            self.backend.base_url = url;
        }
        if let Some(interval) = poll_interval_seconds {
            debug!("Overriding poll interval from command line: {}s", interval);
            self.polling.interval_seconds = interval;
        }
        if let Some(timeout) = poll_timeout_seconds {
            debug!("Overriding poll timeout from command line: {}s", timeout);
            self.polling.timeout_seconds = timeout;
        }
        if let Some(per_page) = default_per_page {
            debug!("Overriding default page size from command line: {}", per_page);
            self.pagination.default_per_page = per_page;
        }
    }
}
