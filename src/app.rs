//! Wiring of configuration, storage, client and stores into one handle.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::{resolve_credential, Config, CredentialStatus};
use crate::notifications::NotificationStore;
use crate::services::{AuthService, FollowService, PostService, ReportService, UserService};
use crate::session::SessionStore;
use crate::storage::{FileStorage, KeyValueStore, StorageError};

/// Everything a front end needs, sharing one storage backend.
#[derive(Clone)]
pub struct Lofy {
    config: Config,
    api: ApiClient,
    session: SessionStore,
    notifications: NotificationStore,
}

impl Lofy {
    /// Persist under `config.storage.dir`.
    pub fn open(config: Config) -> Result<Self, ApiError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStorage::new(config.storage.dir.clone()));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api, storage.clone())?;
        let session = SessionStore::open(storage.clone());
        let notifications = NotificationStore::open(api.clone(), storage);
        tracing::debug!(base_url = %api.base_url(), "Client initialized");
        Ok(Self {
            config,
            api,
            session,
            notifications,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn credential(&self) -> Result<CredentialStatus, StorageError> {
        resolve_credential(self.api.storage().as_ref())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.api.clone(), self.session.clone())
    }

    pub fn follows(&self) -> FollowService {
        FollowService::new(self.api.clone(), self.session.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.api.clone())
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.api.clone())
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(
            self.api.clone(),
            self.session.clone(),
            self.config.auth.email_domain.clone(),
        )
    }
}
