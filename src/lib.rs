//! Client core for the Lofy lost-and-found service.
//!
//! [`api::ApiClient`] wraps the REST backend, [`schema`] validates what comes
//! back, [`session::SessionStore`] and [`notifications::NotificationStore`]
//! hold persisted client state, and [`services`] covers the remaining flows.

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod notifications;
pub mod schema;
pub mod services;
pub mod session;
pub mod storage;

pub use app::Lofy;
