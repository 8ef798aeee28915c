//! Request bodies and their wire encoding.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use super::error::ApiError;
use crate::config::SecureString;

/// Body handed to the client by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(FormData),
}

impl RequestBody {
    /// Form payloads are detected from the variant.
    pub fn is_form(&self) -> bool {
        matches!(self, RequestBody::Form(_))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<FormData> for RequestBody {
    fn from(form: FormData) -> Self {
        RequestBody::Form(form)
    }
}

impl From<()> for RequestBody {
    fn from(_: ()) -> Self {
        RequestBody::Empty
    }
}

/// A single multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text(String),
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// Ordered multipart payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, FormField)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .push((name.into(), FormField::Text(value.into())));
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FormField::File {
                file_name: file_name.into(),
                mime: mime.into(),
                bytes,
            },
        ));
        self
    }

    pub fn fields(&self) -> &[(String, FormField)] {
        &self.fields
    }

    /// Text value of the first field called `name`.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(field, value)| match value {
            FormField::Text(text) if field == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub(crate) fn into_multipart(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, field) in self.fields {
            form = match field {
                FormField::Text(text) => form.text(name, text),
                FormField::File {
                    file_name,
                    mime,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|e| ApiError::InvalidRequest(format!("bad mime '{}': {}", mime, e)))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Body after the JSON/multipart decision has been made.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedBody {
    None,
    Json(Vec<u8>),
    Multipart(FormData),
}

impl EncodedBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, EncodedBody::Multipart(_))
    }
}

/// Decide how `body` goes on the wire.
///
/// `force_form` overrides detection: `None` uses the body variant, `Some(true)`
/// sends multipart (JSON objects become text fields), `Some(false)` sends JSON.
pub fn encode_body(body: RequestBody, force_form: Option<bool>) -> Result<EncodedBody, ApiError> {
    let as_form = force_form.unwrap_or_else(|| body.is_form());

    match (as_form, body) {
        (true, RequestBody::Form(form)) => Ok(EncodedBody::Multipart(form)),
        (true, RequestBody::Empty) => Ok(EncodedBody::Multipart(FormData::new())),
        (true, RequestBody::Json(Value::Object(map))) => {
            let form = map.into_iter().fold(FormData::new(), |form, (key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                form.text(key, text)
            });
            Ok(EncodedBody::Multipart(form))
        }
        (true, RequestBody::Json(other)) => Err(ApiError::InvalidRequest(format!(
            "only JSON objects can be sent as form data, got {}",
            other
        ))),
        (false, RequestBody::Empty) => Ok(EncodedBody::None),
        (false, RequestBody::Json(value)) => serde_json::to_vec(&value)
            .map(EncodedBody::Json)
            .map_err(|e| ApiError::InvalidRequest(e.to_string())),
        (false, RequestBody::Form(form)) => {
            let mut map = Map::new();
            for (name, field) in form.fields {
                match field {
                    FormField::Text(text) => {
                        map.insert(name, Value::String(text));
                    }
                    FormField::File { .. } => {
                        return Err(ApiError::InvalidRequest(format!(
                            "file field '{}' cannot be sent as JSON",
                            name
                        )))
                    }
                }
            }
            serde_json::to_vec(&Value::Object(map))
                .map(EncodedBody::Json)
                .map_err(|e| ApiError::InvalidRequest(e.to_string()))
        }
    }
}

/// Build request headers.
///
/// JSON requests carry `Content-Type: application/json`; multipart requests
/// leave the content type to the multipart encoder.
pub fn build_headers(is_form: bool, token: Option<&SecureString>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if !is_form {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|_| ApiError::InvalidRequest("auth token is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
