// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::{Transport, TransportError};
use crate::config::{BackendConfig, CookieConfig};
use crate::session::{SessionEnvironment, SessionOracle};

/// reqwest transport authenticating with the session's access token
///
/// The token is read from the environment on every request, so a token
/// refreshed by a new login is used without rebuilding the transport.
pub struct HttpTransport<E> {
    client: Client,
    base_url: String,
    oracle: SessionOracle<E>,
}

impl<E: SessionEnvironment> HttpTransport<E> {
    pub fn new(
        backend: &BackendConfig,
        cookies: CookieConfig,
        env: E,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(backend.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: backend.trimmed_base_url().to_string(),
            oracle: SessionOracle::with_cookie_names(env, cookies),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl<E> Transport for HttpTransport<E>
where
    E: SessionEnvironment + Send + Sync,
{
    async fn get_json(&self, path: &str) -> Result<Value, TransportError> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = self.oracle.access_token().filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("GET {} rejected with {}", url, status);
            return Err(TransportError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("GET {} failed with {}", url, status);
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode {
                reason: e.to_string(),
            })
    }
}
