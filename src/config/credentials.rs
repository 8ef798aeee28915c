//! Bearer token resolution from persisted storage.
//!
//! The token is read on every request rather than cached, so a login or
//! logout in one part of the process is visible to the next request.

use crate::storage::{KeyValueStore, StorageError, AUTH_TOKEN_KEY};

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when needed for API calls.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString(String);

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value.
    ///
    /// Use sparingly and only when actually sending to APIs.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Status of credential resolution.
#[derive(Debug, Clone)]
pub enum CredentialStatus {
    /// A non-empty token is stored.
    Configured(SecureString),
    /// Nothing usable is stored; requests go out unauthenticated.
    Anonymous,
}

/// Resolve the bearer token persisted under `auth_token`.
///
/// Non-string or blank values count as absent.
pub fn resolve_credential(store: &dyn KeyValueStore) -> Result<CredentialStatus, StorageError> {
    let status = match store.load(AUTH_TOKEN_KEY)? {
        Some(serde_json::Value::String(token)) if !token.trim().is_empty() => {
            CredentialStatus::Configured(SecureString::new(token))
        }
        _ => CredentialStatus::Anonymous,
    };
    Ok(status)
}

/// Persist a freshly issued token.
pub fn store_token(store: &dyn KeyValueStore, token: &SecureString) -> Result<(), StorageError> {
    store.save(
        AUTH_TOKEN_KEY,
        &serde_json::Value::String(token.expose().to_string()),
    )
}

/// Forget the persisted token.
pub fn clear_token(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    store.remove(AUTH_TOKEN_KEY)
}
