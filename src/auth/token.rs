//! Session token inspection
//!
//! Tokens are issued and signed by the identity provider. Locally we only read
//! the payload to decide whether a token is worth refreshing; the signature is
//! checked by the provider during `auth-refresh`.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Claims carried by a provider-issued token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// Record id the token was issued for
    #[serde(default)]
    pub id: Option<String>,
    /// Token type (`auth`, `file`, ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    /// Expiration time (unix seconds)
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Check if token is expired; tokens without `exp` count as expired
    pub fn is_expired(&self) -> bool {
        match self.exp {
            Some(exp) => Utc::now().timestamp() >= exp,
            None => true,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Decode the token payload without verifying its signature
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    if token.is_empty() {
        return None;
    }

    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

/// A token is structurally valid when it decodes and has not expired
pub fn is_token_expired(token: &str) -> bool {
    decode_claims(token).map_or(true, |claims| claims.is_expired())
}

/// Expiration time of the token, if it can be decoded
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    decode_claims(token).and_then(|claims| claims.expires_at())
}
