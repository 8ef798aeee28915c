//! Local cache of the user's notifications.
//!
//! Every network-backed mutation (fetch, refresh, mark-as-read) runs under
//! one async gate, so a page fetched before a confirmed read cannot be merged
//! over it afterwards. The state lock is held only for the in-memory change
//! and the snapshot; the file write happens after it is released.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use super::merge::{dedup_last_wins, merge_notifications, MergeStats};
use crate::api::{path_with_query, ApiClient, ApiError, RequestOptions};
use crate::schema::{validate_notification_list, Notification};
use crate::storage::{load_typed, KeyValueStore, Snapshot, SnapshotWriter};

/// Storage key of the notification cache.
pub const NOTIFICATION_STORE_KEY: &str = "notification-storage";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

const NOTIFICATIONS_PATH: &str = "/others/notifications";

#[derive(Debug, Default, Deserialize)]
struct PersistedNotifications {
    #[serde(default)]
    notifications: Vec<Notification>,
}

#[derive(Serialize)]
struct PersistedView<'a> {
    notifications: &'a [Notification],
}

/// Result of a fetch. Failures have already been logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Merged(MergeStats),
    Replaced { count: usize },
    Failed,
}

#[derive(Clone)]
pub struct NotificationStore {
    api: ApiClient,
    inner: Arc<RwLock<Vec<Notification>>>,
    gate: Arc<Mutex<()>>,
    writer: Arc<SnapshotWriter>,
}

impl NotificationStore {
    /// Restore the cache from storage; unreadable state starts empty.
    pub fn open(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let restored =
            match load_typed::<PersistedNotifications>(storage.as_ref(), NOTIFICATION_STORE_KEY) {
                Ok(Some(persisted)) => dedup_last_wins(persisted.notifications),
                Ok(None) => Vec::new(),
                Err(err) => {
                    tracing::warn!(error = %err, "Discarding unreadable notification cache");
                    Vec::new()
                }
            };

        Self {
            api,
            inner: Arc::new(RwLock::new(restored)),
            gate: Arc::new(Mutex::new(())),
            writer: Arc::new(SnapshotWriter::new(storage, NOTIFICATION_STORE_KEY)),
        }
    }

    /// Snapshot of the collection in display order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.read().clone()
    }

    pub fn get(&self, id: i64) -> Option<Notification> {
        self.inner.read().iter().find(|n| n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.inner.read().iter().filter(|n| !n.is_read).count()
    }

    /// Replace the whole collection. Duplicate ids collapse, last one wins.
    pub fn set_notifications(&self, items: Vec<Notification>) {
        let items = dedup_last_wins(items);
        let snapshot = {
            let mut list = self.inner.write();
            *list = items;
            self.snapshot(&list)
        };
        self.persist(snapshot);
    }

    /// Fetch one page and merge it into the cache.
    ///
    /// Errors (network, timeout, server, validation) are logged and leave the
    /// cache untouched; they never propagate to the caller.
    pub async fn fetch_notifications(&self, page: u32, limit: u32) -> FetchOutcome {
        let _gate = self.gate.lock().await;

        let incoming = match self.fetch_page(page, limit).await {
            Ok(incoming) => incoming,
            Err(err) => {
                tracing::error!(
                    page,
                    limit,
                    error_type = err.error_type(),
                    error = %err,
                    "Failed to fetch and validate notifications"
                );
                return FetchOutcome::Failed;
            }
        };

        let (stats, total, snapshot) = {
            let mut list = self.inner.write();
            let (merged, stats) = merge_notifications(&list, incoming);
            *list = merged;
            (stats, list.len(), self.snapshot(&list))
        };
        self.persist_async(snapshot).await;

        tracing::info!(
            page,
            received = stats.received,
            added = stats.added,
            updated = stats.updated,
            total,
            "Merged notification page"
        );
        FetchOutcome::Merged(stats)
    }

    /// Fetch the first page and replace the cache with it, dropping entries
    /// the server no longer returns.
    pub async fn refresh_notifications(&self, limit: u32) -> FetchOutcome {
        let _gate = self.gate.lock().await;

        match self.fetch_page(DEFAULT_PAGE, limit).await {
            Ok(incoming) => {
                let items = dedup_last_wins(incoming);
                let count = items.len();
                let snapshot = {
                    let mut list = self.inner.write();
                    *list = items;
                    self.snapshot(&list)
                };
                self.persist_async(snapshot).await;
                tracing::info!(count, "Replaced notification cache");
                FetchOutcome::Replaced { count }
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to refresh notifications");
                FetchOutcome::Failed
            }
        }
    }

    /// Tell the server the notification was read.
    ///
    /// The local flag flips only after the server confirms. Failures are
    /// logged and returned; local state is not touched. Holds the fetch gate
    /// so an in-flight page cannot overwrite the confirmed flag.
    pub async fn mark_as_read(&self, id: i64) -> Result<(), ApiError> {
        let _gate = self.gate.lock().await;
        let path = path_with_query(NOTIFICATIONS_PATH, &[("noti_id", id.to_string())]);

        if let Err(err) = self.api.patch(&path, json!({}), RequestOptions::default()).await {
            tracing::error!(id, error = %err, "Failed to mark notification as read");
            return Err(err);
        }

        let snapshot = {
            let mut list = self.inner.write();
            let flipped = match list.iter_mut().find(|n| n.id == id) {
                Some(notification) => !std::mem::replace(&mut notification.is_read, true),
                None => {
                    tracing::debug!(id, "Marked a notification that is not cached");
                    false
                }
            };
            if flipped {
                self.snapshot(&list)
            } else {
                None
            }
        };
        self.persist_async(snapshot).await;
        Ok(())
    }

    /// No bulk endpoint exists on the backend yet; this neither calls the
    /// server nor changes local state.
    pub fn mark_all_as_read(&self) {
        tracing::debug!("mark_all_as_read has no backend endpoint; nothing changed");
    }

    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Notification>, ApiError> {
        let path = path_with_query(
            NOTIFICATIONS_PATH,
            &[
                ("page", page.max(1).to_string()),
                ("number", limit.max(1).to_string()),
            ],
        );
        let raw = self.api.get(&path).await?;
        Ok(validate_notification_list(&raw)?)
    }

    /// Capture the collection for persistence. Call with the state lock held.
    fn snapshot(&self, list: &[Notification]) -> Option<Snapshot> {
        match self.writer.snapshot(&PersistedView {
            notifications: list,
        }) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to serialize notifications");
                None
            }
        }
    }

    fn persist(&self, snapshot: Option<Snapshot>) {
        if let Some(snapshot) = snapshot {
            if let Err(err) = self.writer.write(snapshot) {
                tracing::warn!(error = %err, "Failed to persist notifications");
            }
        }
    }

    async fn persist_async(&self, snapshot: Option<Snapshot>) {
        if let Some(snapshot) = snapshot {
            if let Err(err) = self.writer.write_async(snapshot).await {
                tracing::warn!(error = %err, "Failed to persist notifications");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::storage::MemoryStorage;

    fn note(id: i64, is_read: bool) -> Notification {
        Notification {
            id,
            title: format!("n{}", id),
            message: "m".to_string(),
            time_created_iso: "2025-11-02T08:15:00Z".to_string(),
            is_read,
            link_post_id: None,
            reporter_user_id: 1,
            link_to_newpost: None,
        }
    }

    fn store() -> (NotificationStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let api = ApiClient::new(&ApiConfig::default(), storage.clone()).unwrap();
        (NotificationStore::open(api, storage.clone()), storage)
    }

    #[test]
    fn test_unread_count_is_derived() {
        let (store, _) = store();
        store.set_notifications(vec![note(1, false), note(2, true)]);
        assert_eq!(store.unread_count(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_set_notifications_dedups() {
        let (store, _) = store();
        store.set_notifications(vec![note(1, false), note(1, true)]);
        assert_eq!(store.len(), 1);
        assert!(store.get(1).unwrap().is_read);
    }

    #[test]
    fn test_mark_all_as_read_is_a_no_op() {
        let (store, _) = store();
        store.set_notifications(vec![note(1, false), note(2, false)]);
        store.mark_all_as_read();
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn test_cache_survives_reopen() {
        let (store, storage) = store();
        store.set_notifications(vec![note(3, false), note(1, true)]);

        let api = ApiClient::new(&ApiConfig::default(), storage.clone()).unwrap();
        let reopened = NotificationStore::open(api, storage);
        let ids: Vec<i64> = reopened.notifications().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(reopened.unread_count(), 1);
    }
}
