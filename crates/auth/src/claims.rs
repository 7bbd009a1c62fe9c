use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::Role;
use crate::roles::deserialize_roles;

/// Decoded JWT payload.
///
/// `sub` and `exp` are required; everything the client does not interpret is
/// kept in `extra` so callers can still reach custom claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject; the backend puts the username here.
    pub sub: String,

    /// Expiry as Unix epoch seconds. NumericDate allows a fractional part.
    pub exp: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_roles")]
    pub roles: Vec<Role>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if !self.exp.is_finite() {
            return None;
        }
        let secs = self.exp.floor();
        let nanos = ((self.exp - secs) * 1e9) as u32;
        DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,
}

/// Validate the expiry of decoded claims against `now`.
///
/// A token whose expiry is at or before `now` is expired; the comparison keeps
/// sub-second precision.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    let now = now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9;
    if claims.exp.is_nan() || claims.exp <= now {
        return Err(TokenError::Expired);
    }
    Ok(())
}
