use serde_json::json;

use super::ServiceError;
use crate::api::{ApiClient, RequestOptions};
use crate::session::{FollowToggle, SessionStore};

/// Follow and unfollow threads with optimistic session updates.
#[derive(Clone)]
pub struct FollowService {
    api: ApiClient,
    session: SessionStore,
}

impl FollowService {
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// Flip follow state of `thread_id` and sync it with the backend.
    ///
    /// The session changes before the request; if the request fails the
    /// change is inverted and the error returned. Returns whether the thread
    /// is followed afterwards.
    pub async fn toggle(&self, thread_id: i64) -> Result<bool, ServiceError> {
        let command = FollowToggle::new(thread_id);
        let followed = command.apply(&self.session);
        let body = json!({ "thread_id": thread_id });

        let result = if followed {
            self.api
                .post("/user/follows", body, RequestOptions::default())
                .await
        } else {
            self.api.delete("/user/unfollows", body).await
        };

        match result {
            Ok(_) => {
                tracing::info!(thread_id, followed, "Thread follow updated");
                Ok(followed)
            }
            Err(err) => {
                tracing::error!(thread_id, error = %err, "Follow request failed, rolling back");
                command.invert(&self.session);
                Err(err.into())
            }
        }
    }
}
