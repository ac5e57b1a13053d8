// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Identity token claim extraction
//!
//! This module reads the claims carried by an OpenID Connect ID token issued
//! by the upstream identity provider. The signature is **not** verified here:
//! the token reaches the client through a cookie set by the backend, which is
//! the party responsible for verification. The client only reads claims that
//! are already trusted.
//!
//! # Example
//!
//! ```
//! use portal_session::session::claims::IdentityClaims;
//!
//! // header {"alg":"none"} . payload {"email":"jane@example.org"} . empty signature
//! let token = "eyJhbGciOiJub25lIn0.eyJlbWFpbCI6ImphbmVAZXhhbXBsZS5vcmcifQ.";
//! let claims = IdentityClaims::decode(token).unwrap();
//! assert_eq!(claims.get_str("email"), Some("jane@example.org"));
//! ```

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Base64url engine accepting payload segments with or without padding
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons an identity token could not be turned into a claim mapping
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedTokenError {
    #[error("Identity token has {found} segments, expected 3")]
    SegmentCount { found: usize },

    #[error("Identity token payload segment is empty")]
    EmptyPayload,

    #[error("Identity token payload is not valid base64url: {reason}")]
    Encoding { reason: String },

    #[error("Identity token payload is not valid JSON: {reason}")]
    Json { reason: String },

    #[error("Identity token payload is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },
}

/// Claims carried by an identity token
///
/// Claims are kept as raw JSON values so that provider specific claims
/// (`authentication_disabled`, `only_guest_task_completion`, ...) can be read
/// without a fixed schema. Accessors only return a value when the claim has
/// the expected JSON type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityClaims {
    claims: Map<String, Value>,
}

impl IdentityClaims {
    /// Decode the payload segment of a compact JWS token
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTokenError`] when the token does not have exactly
    /// three dot separated segments, when the payload is not base64url, or
    /// when it does not decode to a JSON object.
    pub fn decode(token: &str) -> Result<Self, MalformedTokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(MalformedTokenError::SegmentCount {
                found: segments.len(),
            });
        }

        let payload = segments[1];
        if payload.is_empty() {
            return Err(MalformedTokenError::EmptyPayload);
        }

        let bytes = PAYLOAD_ENGINE
            .decode(payload)
            .map_err(|e| MalformedTokenError::Encoding {
                reason: e.to_string(),
            })?;

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| MalformedTokenError::Json {
                reason: e.to_string(),
            })?;

        match value {
            Value::Object(claims) => Ok(Self { claims }),
            other => Err(MalformedTokenError::NotAnObject {
                found: json_type_name(&other),
            }),
        }
    }

    /// Raw claim value, if present
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// String claim, `None` when absent or not a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// Boolean claim, `None` when absent or not a boolean
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.claims.get(name).and_then(Value::as_bool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Expiration time from the `exp` claim
    ///
    /// Informational only. Expiry is enforced by the backend on API calls.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.claims.get("exp").and_then(Value::as_i64)?;
        Utc.timestamp_opt(exp, 0).single()
    }
}

impl From<Map<String, Value>> for IdentityClaims {
    fn from(claims: Map<String, Value>) -> Self {
        Self { claims }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with_payload(payload: &Value) -> String {
        let header = PAYLOAD_ENGINE.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = PAYLOAD_ENGINE.encode(payload.to_string());
        format!("{}.{}.c2lnbmF0dXJl", header, body)
    }

    #[test]
    fn test_decode_reads_string_and_bool_claims() {
        let token = token_with_payload(&json!({
            "email": "jane@example.org",
            "authentication_disabled": true,
            "exp": 1_700_000_000
        }));
        let claims = IdentityClaims::decode(&token).unwrap();

        assert_eq!(claims.get_str("email"), Some("jane@example.org"));
        assert_eq!(claims.get_bool("authentication_disabled"), Some(true));
        assert_eq!(claims.get_str("exp"), None);
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_decode_accepts_padded_payload() {
        let header = PAYLOAD_ENGINE.encode(br#"{"alg":"none"}"#);
        let body = base64::engine::general_purpose::URL_SAFE.encode(br#"{"name":"ab"}"#);
        assert!(body.ends_with('='));

        let claims = IdentityClaims::decode(&format!("{}.{}.", header, body)).unwrap();
        assert_eq!(claims.get_str("name"), Some("ab"));
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        assert_eq!(
            IdentityClaims::decode("only-one-part"),
            Err(MalformedTokenError::SegmentCount { found: 1 })
        );
        assert_eq!(
            IdentityClaims::decode("a.b.c.d"),
            Err(MalformedTokenError::SegmentCount { found: 4 })
        );
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        assert_eq!(
            IdentityClaims::decode("a..c"),
            Err(MalformedTokenError::EmptyPayload)
        );
        assert!(matches!(
            IdentityClaims::decode("a.!!!.c"),
            Err(MalformedTokenError::Encoding { .. })
        ));

        let not_json = format!("a.{}.c", PAYLOAD_ENGINE.encode("not json"));
        assert!(matches!(
            IdentityClaims::decode(&not_json),
            Err(MalformedTokenError::Json { .. })
        ));

        let array = token_with_payload(&json!(["a", "b"]));
        assert_eq!(
            IdentityClaims::decode(&array),
            Err(MalformedTokenError::NotAnObject { found: "array" })
        );
    }
}
