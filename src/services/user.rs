use serde_json::json;

use super::ServiceError;
use crate::api::{ApiClient, ApiError, RequestOptions};
use crate::schema::{validate_user_profile, UserProfile};
use crate::session::{SessionPhase, SessionStore};

/// Current-user bootstrap and device registration.
#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
    session: SessionStore,
}

impl UserService {
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// Load `/user/me` into the session.
    ///
    /// On success the session holds the server's identity and followed
    /// threads and is `LoggedIn`. On failure a pending login is aborted and
    /// the previous identity is left in place.
    pub async fn fetch_current_user(&self) -> Result<UserProfile, ServiceError> {
        if self.session.phase() == SessionPhase::LoggedOut {
            self.session.begin_login();
        }

        let profile = match self.load_profile().await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::error!(error = %err, "Error fetching user details");
                self.session.abort_login();
                return Err(err.into());
            }
        };

        self.session.clear_user();
        self.session.init_followed_threads(profile.followed_thread_ids());
        self.session.set_alias(profile.alias.clone());
        self.session.set_id(profile.id);
        if let Some(role) = &profile.role {
            self.session.set_role(role.clone());
        }
        if self.session.phase() == SessionPhase::LoggingIn {
            self.session.complete_login();
        }

        tracing::info!(user_id = profile.id, threads = profile.followed_threads.len(), "User loaded");
        Ok(profile)
    }

    /// Register a push token for this device.
    pub async fn register_device_token(&self, token: &str) -> Result<(), ServiceError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Device token must not be empty".to_string(),
            ));
        }

        self.api
            .post(
                "/user/device-token",
                json!({ "device_push_token": token }),
                RequestOptions::default(),
            )
            .await?;
        tracing::info!("Push device token registered");
        Ok(())
    }

    async fn load_profile(&self) -> Result<UserProfile, ApiError> {
        let raw = self.api.get("/user/me").await?;
        Ok(validate_user_profile(&raw)?)
    }
}
