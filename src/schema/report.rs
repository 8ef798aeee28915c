use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{validate_array, Fields, ValidationError};

/// Moderation state of a report. Unknown states are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Unresolved,
    Other(String),
}

impl ReportStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PENDING" => ReportStatus::Pending,
            "RESOLVED" => ReportStatus::Resolved,
            "UNRESOLVED" => ReportStatus::Unresolved,
            _ => ReportStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::Resolved => "RESOLVED",
            ReportStatus::Unresolved => "UNRESOLVED",
            ReportStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for ReportStatus {
    fn from(raw: String) -> Self {
        ReportStatus::parse(&raw)
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingUser {
    pub id: i64,
    pub alias: String,
    pub role: String,
}

/// A user report as listed in the admin view. Read only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    #[serde(rename = "time_created")]
    pub time_created_iso: String,
    #[serde(rename = "report_status")]
    pub status: ReportStatus,
    pub title: String,
    #[serde(rename = "report_message")]
    pub message: String,
    #[serde(rename = "post_id", default, skip_serializing_if = "Option::is_none")]
    pub target_post_id: Option<i64>,
    #[serde(rename = "claim_id", default, skip_serializing_if = "Option::is_none")]
    pub target_claim_id: Option<i64>,
    #[serde(rename = "user")]
    pub reporting_user: ReportingUser,
}

fn validate_user(fields: Fields<'_>) -> Result<ReportingUser, ValidationError> {
    Ok(ReportingUser {
        id: fields.integer("id")?,
        alias: fields.string("alias")?,
        role: fields.string("role")?,
    })
}

/// Validate a `POST /others/reports` payload.
pub fn validate_report_list(raw: &Value) -> Result<Vec<Report>, ValidationError> {
    validate_array(raw, |fields| {
        Ok(Report {
            id: fields.integer("id")?,
            time_created_iso: fields.string("time_created")?,
            status: ReportStatus::parse(&fields.string("report_status")?),
            title: fields.string("title")?,
            message: fields.string("report_message")?,
            target_post_id: fields.optional_integer("post_id")?,
            target_claim_id: fields.optional_integer("claim_id")?,
            reporting_user: validate_user(fields.object("user")?)?,
        })
    })
}
