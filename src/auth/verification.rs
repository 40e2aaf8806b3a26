//! Activation keys for mail verification.

use chrono::{Duration, NaiveDateTime};
use rand::distr::Alphanumeric;
use rand::Rng;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::db::{User, TIMESTAMP_FORMAT};

/// Length of generated activation keys.
pub const ACTIVATION_KEY_LENGTH: usize = 40;

/// Reasons a supplied activation key is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("no verification is pending")]
    NoPendingKey,

    #[error("verification key is invalid")]
    InvalidKey,

    #[error("verification key has expired")]
    Expired,
}

/// A freshly issued activation key and its expiry timestamp.
#[derive(Debug, Clone)]
pub struct ActivationKey {
    pub key: String,
    pub expires_at: String,
}

impl ActivationKey {
    /// Issue a new key valid for `valid_hours` from `now`.
    pub fn issue(now: NaiveDateTime, valid_hours: i64) -> Self {
        let key = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(ACTIVATION_KEY_LENGTH)
            .map(char::from)
            .collect();
        let expires_at = (now + Duration::hours(valid_hours))
            .format(TIMESTAMP_FORMAT)
            .to_string();
        Self { key, expires_at }
    }
}

/// Check `supplied` against the key stored on `user` at time `now`.
pub fn check_key(user: &User, supplied: &str, now: NaiveDateTime) -> Result<(), KeyError> {
    if user.activation_key.is_empty() {
        return Err(KeyError::NoPendingKey);
    }
    let matches: bool = user
        .activation_key
        .as_bytes()
        .ct_eq(supplied.trim().as_bytes())
        .into();
    if !matches {
        return Err(KeyError::InvalidKey);
    }

    // A key without a parseable expiry is treated as expired.
    let expires_at = user
        .key_expires_at
        .as_deref()
        .and_then(|s| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok())
        .ok_or(KeyError::Expired)?;
    if expires_at <= now {
        return Err(KeyError::Expired);
    }
    Ok(())
}
