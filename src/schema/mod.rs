//! Structural validators for server payloads.
//!
//! A payload is admitted only if every element carries every required field
//! with the exact JSON type; one bad element rejects the whole batch.

mod notification;
mod report;
mod user;

use serde_json::{Map, Value};
use thiserror::Error;

pub use notification::{validate_notification_list, Notification};
pub use report::{validate_report_list, Report, ReportStatus, ReportingUser};
pub use user::{validate_user_profile, FollowedThread, UserProfile};

/// Why a payload was rejected. `path` locates the offending value, e.g. `[2].user.id`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{path}: expected {expected}, got {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: missing required field")]
    MissingField { path: String },
}

impl ValidationError {
    pub fn path(&self) -> &str {
        match self {
            ValidationError::WrongType { path, .. } | ValidationError::MissingField { path } => {
                path
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}

/// Root must be an array; `validate` runs on each element with its index path.
fn validate_array<T>(
    raw: &Value,
    mut validate: impl FnMut(Fields<'_>) -> Result<T, ValidationError>,
) -> Result<Vec<T>, ValidationError> {
    let items = raw.as_array().ok_or_else(|| ValidationError::WrongType {
        path: display_path(""),
        expected: "array",
        found: kind_of(raw),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| Fields::of(item, format!("[{}]", index)).and_then(&mut validate))
        .collect()
}

/// Typed accessors over one JSON object, tracking the path for error messages.
pub(crate) struct Fields<'a> {
    path: String,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(value: &'a Value, path: String) -> Result<Self, ValidationError> {
        match value {
            Value::Object(object) => Ok(Self { path, object }),
            other => Err(ValidationError::WrongType {
                path: display_path(&path),
                expected: "object",
                found: kind_of(other),
            }),
        }
    }

    fn child_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path, name)
        }
    }

    fn wrong_type(&self, name: &str, expected: &'static str, value: &Value) -> ValidationError {
        ValidationError::WrongType {
            path: self.child_path(name),
            expected,
            found: kind_of(value),
        }
    }

    fn required(&self, name: &str) -> Result<&'a Value, ValidationError> {
        self.object
            .get(name)
            .ok_or_else(|| ValidationError::MissingField {
                path: self.child_path(name),
            })
    }

    pub(crate) fn integer(&self, name: &str) -> Result<i64, ValidationError> {
        let value = self.required(name)?;
        value
            .as_i64()
            .ok_or_else(|| self.wrong_type(name, "integer", value))
    }

    pub(crate) fn string(&self, name: &str) -> Result<String, ValidationError> {
        let value = self.required(name)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.wrong_type(name, "string", value))
    }

    pub(crate) fn boolean(&self, name: &str) -> Result<bool, ValidationError> {
        let value = self.required(name)?;
        value
            .as_bool()
            .ok_or_else(|| self.wrong_type(name, "boolean", value))
    }

    /// Present, integer or null.
    pub(crate) fn nullable_integer(&self, name: &str) -> Result<Option<i64>, ValidationError> {
        match self.required(name)? {
            Value::Null => Ok(None),
            value => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(name, "integer or null", value)),
        }
    }

    /// Absent or integer. An explicit null is rejected.
    pub(crate) fn optional_integer(&self, name: &str) -> Result<Option<i64>, ValidationError> {
        match self.object.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(name, "integer", value)),
        }
    }

    /// Present, string or null.
    pub(crate) fn nullable_string(&self, name: &str) -> Result<Option<String>, ValidationError> {
        match self.required(name)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            value => Err(self.wrong_type(name, "string or null", value)),
        }
    }

    /// Absent, null, or string.
    pub(crate) fn optional_string(&self, name: &str) -> Result<Option<String>, ValidationError> {
        match self.object.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(value) => Err(self.wrong_type(name, "string", value)),
        }
    }

    pub(crate) fn object(&self, name: &str) -> Result<Fields<'a>, ValidationError> {
        Fields::of(self.required(name)?, self.child_path(name))
    }

    /// Absent or null yields an empty list.
    pub(crate) fn optional_array(&self, name: &str) -> Result<&'a [Value], ValidationError> {
        match self.object.get(name) {
            None | Some(Value::Null) => Ok(<&[Value]>::default()),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(value) => Err(self.wrong_type(name, "array", value)),
        }
    }

    pub(crate) fn element_path(&self, name: &str, index: usize) -> String {
        format!("{}[{}]", self.child_path(name), index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_rejects_float_and_string() {
        let value = json!({"a": 1.5, "b": "1", "c": 3});
        let fields = Fields::of(&value, "[0]".to_string()).unwrap();

        assert_eq!(
            fields.integer("a").unwrap_err(),
            ValidationError::WrongType {
                path: "[0].a".to_string(),
                expected: "integer",
                found: "number",
            }
        );
        assert!(fields.integer("b").is_err());
        assert_eq!(fields.integer("c").unwrap(), 3);
    }

    #[test]
    fn test_nullable_requires_presence() {
        let value = json!({"post_id": null});
        let fields = Fields::of(&value, String::new()).unwrap();

        assert_eq!(fields.nullable_integer("post_id").unwrap(), None);
        assert_eq!(
            fields.nullable_integer("usr_id").unwrap_err(),
            ValidationError::MissingField {
                path: "usr_id".to_string()
            }
        );
        assert_eq!(fields.optional_integer("usr_id").unwrap(), None);
    }

    #[test]
    fn test_optional_integer_rejects_null() {
        let value = json!({"claim_id": null});
        let fields = Fields::of(&value, "[0]".to_string()).unwrap();

        assert_eq!(
            fields.optional_integer("claim_id").unwrap_err(),
            ValidationError::WrongType {
                path: "[0].claim_id".to_string(),
                expected: "integer",
                found: "null",
            }
        );
    }

    #[test]
    fn test_nullable_string_requires_presence() {
        let value = json!({"link": null, "name": "x", "count": 2});
        let fields = Fields::of(&value, String::new()).unwrap();

        assert_eq!(fields.nullable_string("link").unwrap(), None);
        assert_eq!(fields.nullable_string("name").unwrap(), Some("x".to_string()));
        assert!(fields.nullable_string("count").is_err());
        assert_eq!(
            fields.nullable_string("missing").unwrap_err(),
            ValidationError::MissingField {
                path: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_root_must_be_array() {
        let err = validate_array(&json!({"items": []}), |f| f.integer("id")).unwrap_err();
        assert_eq!(err.path(), "$");
    }
}
