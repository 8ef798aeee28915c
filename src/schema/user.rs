use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Fields, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowedThread {
    pub thread_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usr_id: Option<i64>,
}

/// Payload of `GET /user/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub followed_threads: Vec<FollowedThread>,
}

impl UserProfile {
    pub fn followed_thread_ids(&self) -> Vec<i64> {
        self.followed_threads.iter().map(|t| t.thread_id).collect()
    }
}

/// Validate a `GET /user/me` payload. Some deployments wrap it in `{"data": ...}`.
pub fn validate_user_profile(raw: &Value) -> Result<UserProfile, ValidationError> {
    let raw = match raw.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => raw,
    };
    let fields = Fields::of(raw, String::new())?;

    let followed_threads = fields
        .optional_array("followed_threads")?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let thread = Fields::of(item, fields.element_path("followed_threads", index))?;
            Ok(FollowedThread {
                thread_id: thread.integer("thread_id")?,
                usr_id: thread.optional_integer("usr_id")?,
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(UserProfile {
        id: fields.integer("id")?,
        alias: fields.string("alias")?,
        role: fields.optional_string("role")?,
        followed_threads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_profile_with_threads() {
        let profile = validate_user_profile(&json!({
            "id": 1,
            "alias": "thinh",
            "followed_threads": [
                {"usr_id": 1, "thread_id": 4},
                {"usr_id": 1, "thread_id": 6}
            ]
        }))
        .unwrap();

        assert_eq!(profile.id, 1);
        assert_eq!(profile.followed_thread_ids(), vec![4, 6]);
        assert_eq!(profile.role, None);
    }

    #[test]
    fn test_missing_threads_is_empty() {
        let profile = validate_user_profile(&json!({"id": 2, "alias": "a", "role": "admin"})).unwrap();
        assert!(profile.followed_threads.is_empty());
        assert_eq!(profile.role.as_deref(), Some("admin"));
    }

    #[test]
    fn test_unwraps_data_envelope() {
        let profile = validate_user_profile(&json!({"data": {"id": 3, "alias": "b"}})).unwrap();
        assert_eq!(profile.id, 3);
    }

    #[test]
    fn test_bad_thread_entry_is_located() {
        let err = validate_user_profile(&json!({
            "id": 1,
            "alias": "x",
            "followed_threads": [{"thread_id": 4}, {"thread_id": "6"}]
        }))
        .unwrap_err();
        assert_eq!(err.path(), "followed_threads[1].thread_id");
    }
}
