//! Configuration: backend URL, timeouts, storage location, credentials.

mod credentials;
mod loader;
mod types;

pub use credentials::{clear_token, resolve_credential, store_token, CredentialStatus, SecureString};
pub use loader::{ConfigError, API_URL_ENV};
pub use types::{ApiConfig, AuthConfig, Config, StorageConfig};
