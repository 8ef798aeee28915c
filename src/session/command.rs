//! Reversible session mutations for optimistic updates.
//!
//! A front end applies the command before the network call and invokes
//! `invert` if the call fails, so rollback never re-derives the inverse.

use super::store::SessionStore;

/// Flip follow membership of one thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowToggle {
    pub thread_id: i64,
}

impl FollowToggle {
    pub fn new(thread_id: i64) -> Self {
        Self { thread_id }
    }

    /// Returns whether the thread is followed afterwards.
    pub fn apply(&self, session: &SessionStore) -> bool {
        session.toggle_thread_follow(self.thread_id)
    }

    /// Undo a previous `apply`. Returns whether the thread is followed afterwards.
    pub fn invert(&self, session: &SessionStore) -> bool {
        session.toggle_thread_follow(self.thread_id)
    }
}
