// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Backend call contract
//!
//! List views only need one operation from the transport: fetch a JSON
//! document for a backend path. [`HttpTransport`] is the reqwest based
//! implementation; tests and other hosts provide their own.

pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpTransport;

/// Failure of a backend call
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {source}")]
    Request {
        #[from]
        source: reqwest::Error,
    },

    /// 401/403: the session is gone or expired, the caller should log in again
    #[error("Backend rejected the session (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Backend answered HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Backend response could not be decoded: {reason}")]
    Decode { reason: String },
}

impl TransportError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TransportError::Unauthorized { .. })
    }
}

/// Asynchronous access to backend JSON endpoints
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` relative to the backend base URL
    async fn get_json(&self, path: &str) -> Result<Value, TransportError>;
}

/// Fetch `path` and hand the decoded body to `on_success`
///
/// Errors are returned to the caller instead of being passed to the handler.
pub async fn call<T, F>(transport: &T, path: &str, on_success: F) -> Result<(), TransportError>
where
    T: Transport + ?Sized,
    F: FnOnce(Value),
{
    let body = transport.get_json(path).await?;
    on_success(body);
    Ok(())
}
