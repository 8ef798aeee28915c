//! Notification cache with paginated fetch, dedup merge and read state.

mod merge;
mod store;

pub use merge::{dedup_last_wins, merge_notifications, MergeStats};
pub use store::{FetchOutcome, NotificationStore, DEFAULT_LIMIT, DEFAULT_PAGE, NOTIFICATION_STORE_KEY};
