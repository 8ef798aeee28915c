use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Login lifecycle: `LoggedOut -> LoggingIn -> LoggedIn -> LoggedOut`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    LoggedOut,
    LoggingIn,
    LoggedIn,
}

impl SessionPhase {
    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_transition_to(self, next: SessionPhase) -> bool {
        matches!(
            (self, next),
            (SessionPhase::LoggedOut, SessionPhase::LoggingIn)
                | (SessionPhase::LoggingIn, SessionPhase::LoggedIn)
                | (SessionPhase::LoggingIn, SessionPhase::LoggedOut)
                | (SessionPhase::LoggedIn, SessionPhase::LoggedOut)
        )
    }
}

/// Authenticated identity plus followed-thread membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub alias: String,
    #[serde(default)]
    pub role: String,
    #[serde(alias = "followedThreadIds", default)]
    pub followed_thread_ids: BTreeSet<i64>,
    #[serde(default)]
    pub phase: SessionPhase,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.phase == SessionPhase::LoggedIn
    }

    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}
