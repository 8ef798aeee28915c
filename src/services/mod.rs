//! Typed operations over the HTTP client for the remaining endpoints.

mod auth;
mod follow;
mod post;
mod report;
mod user;

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

pub use auth::{account_name, AuthService};
pub use follow::FollowService;
pub use post::{DashboardFilter, DashboardQuery, PostService, TimeWindow};
pub use report::{ReportDraft, ReportRange, ReportService, ReportTarget};
pub use user::UserService;

/// Errors surfaced by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to persist credentials: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Message suitable for showing to the user as-is.
    pub fn message(&self) -> String {
        self.to_string()
    }
}
