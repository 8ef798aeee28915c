use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{validate_array, ValidationError};

/// A notification as cached on the client.
///
/// Field renames follow the backend's JSON so the persisted cache and the
/// wire format stay interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    #[serde(rename = "noti_message")]
    pub message: String,
    #[serde(rename = "time_created")]
    pub time_created_iso: String,
    pub is_read: bool,
    /// Post the notification points at, if any.
    #[serde(rename = "post_id")]
    pub link_post_id: Option<i64>,
    #[serde(rename = "usr_id")]
    pub reporter_user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_to_newpost: Option<String>,
}

/// Validate a `GET /others/notifications` payload.
pub fn validate_notification_list(raw: &Value) -> Result<Vec<Notification>, ValidationError> {
    validate_array(raw, |fields| {
        Ok(Notification {
            id: fields.integer("id")?,
            title: fields.string("title")?,
            message: fields.string("noti_message")?,
            time_created_iso: fields.string("time_created")?,
            is_read: fields.boolean("is_read")?,
            link_post_id: fields.nullable_integer("post_id")?,
            reporter_user_id: fields.integer("usr_id")?,
            link_to_newpost: fields.nullable_string("link_to_newpost")?,
        })
    })
}
