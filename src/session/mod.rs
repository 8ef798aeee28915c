//! User session: identity, role, login phase and followed threads.

mod command;
mod state;
mod store;

pub use command::FollowToggle;
pub use state::{Session, SessionPhase};
pub use store::{SessionStore, SESSION_STORE_KEY};
