use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use super::{KeyValueStore, StorageError};

/// Writes successive snapshots of one key outside the owner's state lock.
///
/// The owner takes a [`Snapshot`] while its lock is held, so snapshot
/// sequence numbers follow mutation order. Writing happens after the lock is
/// released; a snapshot older than the last one written is dropped, so the
/// stored document never moves backwards.
pub struct SnapshotWriter {
    storage: Arc<dyn KeyValueStore>,
    key: &'static str,
    taken: AtomicU64,
    written: Mutex<u64>,
}

/// A serialized state captured under the owner's lock.
pub struct Snapshot {
    seq: u64,
    value: Value,
}

impl SnapshotWriter {
    pub fn new(storage: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            storage,
            key,
            taken: AtomicU64::new(0),
            written: Mutex::new(0),
        }
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Capture `state`. Call with the owner's lock held.
    pub fn snapshot<T: Serialize>(&self, state: &T) -> Result<Snapshot, StorageError> {
        let value = serde_json::to_value(state).map_err(|source| StorageError::Corrupt {
            key: self.key.to_string(),
            source,
        })?;
        let seq = self.taken.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Snapshot { seq, value })
    }

    /// Store `snapshot` unless a newer one was already written.
    ///
    /// Returns whether the snapshot was written. Blocks on file I/O; async
    /// callers go through [`SnapshotWriter::write_async`].
    pub fn write(&self, snapshot: Snapshot) -> Result<bool, StorageError> {
        let mut written = self.written.lock();
        if snapshot.seq <= *written {
            tracing::trace!(key = %self.key, seq = snapshot.seq, "Skipping superseded snapshot");
            return Ok(false);
        }
        self.storage.save(self.key, &snapshot.value)?;
        *written = snapshot.seq;
        Ok(true)
    }

    /// [`SnapshotWriter::write`] on the blocking pool.
    pub async fn write_async(self: &Arc<Self>, snapshot: Snapshot) -> Result<bool, StorageError> {
        let writer = Arc::clone(self);
        match tokio::task::spawn_blocking(move || writer.write(snapshot)).await {
            Ok(result) => result,
            Err(err) => Err(StorageError::Io {
                path: self.key.into(),
                source: std::io::Error::other(err),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    #[test]
    fn test_older_snapshot_is_not_written_over_newer() {
        let storage = Arc::new(MemoryStorage::new());
        let writer = SnapshotWriter::new(storage.clone(), "doc");

        let first = writer.snapshot(&json!({"v": 1})).unwrap();
        let second = writer.snapshot(&json!({"v": 2})).unwrap();

        assert!(writer.write(second).unwrap());
        assert!(!writer.write(first).unwrap());
        assert_eq!(storage.load("doc").unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn test_write_async_stores_value() {
        let storage = Arc::new(MemoryStorage::new());
        let writer = Arc::new(SnapshotWriter::new(storage.clone(), "doc"));

        let snapshot = writer.snapshot(&json!([1, 2])).unwrap();
        assert!(writer.write_async(snapshot).await.unwrap());
        assert_eq!(storage.load("doc").unwrap(), Some(json!([1, 2])));
    }
}
