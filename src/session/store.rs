//! Persisted user session.
//!
//! Same shape as the other stores: a cheap `Clone` handle over shared state.
//! Every mutation is snapshotted under the write lock and written through
//! after the lock is released; stale snapshots never overwrite newer ones.

use std::sync::Arc;

use parking_lot::RwLock;

use super::state::{Session, SessionPhase};
use crate::storage::{load_typed, KeyValueStore, SnapshotWriter};

/// Storage key of the session document.
pub const SESSION_STORE_KEY: &str = "user-store";

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
    writer: Arc<SnapshotWriter>,
}

impl SessionStore {
    /// Restore the session from storage, falling back to an empty session.
    ///
    /// A login that was in flight when the process stopped restores as logged out.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut session = match load_typed::<Session>(storage.as_ref(), SESSION_STORE_KEY) {
            Ok(Some(session)) => session,
            Ok(None) => Session::default(),
            Err(err) => {
                tracing::warn!(error = %err, "Discarding unreadable session state");
                Session::default()
            }
        };
        if session.phase == SessionPhase::LoggingIn {
            session.phase = SessionPhase::LoggedOut;
        }

        Self {
            inner: Arc::new(RwLock::new(session)),
            writer: Arc::new(SnapshotWriter::new(storage, SESSION_STORE_KEY)),
        }
    }

    /// Clone of the current session.
    pub fn snapshot(&self) -> Session {
        self.inner.read().clone()
    }

    pub fn id(&self) -> i64 {
        self.inner.read().id
    }

    pub fn alias(&self) -> String {
        self.inner.read().alias.clone()
    }

    pub fn role(&self) -> String {
        self.inner.read().role.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.read().phase
    }

    /// Followed thread ids in ascending order.
    pub fn followed_thread_ids(&self) -> Vec<i64> {
        self.inner.read().followed_thread_ids.iter().copied().collect()
    }

    pub fn set_id(&self, id: i64) {
        self.mutate(|s| s.id = id);
    }

    pub fn set_alias(&self, alias: impl Into<String>) {
        let alias = alias.into();
        self.mutate(|s| s.alias = alias);
    }

    pub fn set_role(&self, role: impl Into<String>) {
        let role = role.into();
        self.mutate(|s| s.role = role);
    }

    /// Replace the followed set wholesale; later calls overwrite, never merge.
    pub fn init_followed_threads(&self, ids: impl IntoIterator<Item = i64>) {
        let ids = ids.into_iter().collect();
        self.mutate(|s| s.followed_thread_ids = ids);
    }

    pub fn is_thread_followed(&self, thread_id: i64) -> bool {
        self.inner.read().followed_thread_ids.contains(&thread_id)
    }

    /// Flip membership of `thread_id` and return whether it is now followed.
    ///
    /// Calling it twice restores the original membership.
    pub fn toggle_thread_follow(&self, thread_id: i64) -> bool {
        self.mutate(|s| {
            if s.followed_thread_ids.remove(&thread_id) {
                false
            } else {
                s.followed_thread_ids.insert(thread_id);
                true
            }
        })
    }

    /// Reset alias and followed threads. The id is deliberately left as is.
    pub fn clear_user(&self) {
        self.mutate(|s| {
            s.alias.clear();
            s.followed_thread_ids.clear();
        });
    }

    /// `LoggedOut -> LoggingIn`. Returns false if the session is in another phase.
    pub fn begin_login(&self) -> bool {
        self.transition(SessionPhase::LoggingIn)
    }

    /// `LoggingIn -> LoggedIn`.
    pub fn complete_login(&self) -> bool {
        self.transition(SessionPhase::LoggedIn)
    }

    /// `LoggingIn -> LoggedOut` after a failed login.
    pub fn abort_login(&self) -> bool {
        self.phase() == SessionPhase::LoggingIn && self.transition(SessionPhase::LoggedOut)
    }

    /// Leave any phase for `LoggedOut` and clear the user.
    pub fn logout(&self) {
        self.mutate(|s| {
            s.phase = SessionPhase::LoggedOut;
            s.alias.clear();
            s.followed_thread_ids.clear();
        });
        tracing::info!("Session logged out");
    }

    fn transition(&self, next: SessionPhase) -> bool {
        self.mutate(|s| {
            if s.phase.can_transition_to(next) {
                tracing::debug!(from = ?s.phase, to = ?next, "Session phase changed");
                s.phase = next;
                true
            } else {
                tracing::warn!(from = ?s.phase, to = ?next, "Ignoring invalid session transition");
                false
            }
        })
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let (result, snapshot) = {
            let mut session = self.inner.write();
            let result = f(&mut session);
            (result, self.writer.snapshot(&*session))
        };
        if let Err(err) = snapshot.and_then(|snapshot| self.writer.write(snapshot)) {
            tracing::warn!(error = %err, "Failed to persist session");
        }
        result
    }
}
