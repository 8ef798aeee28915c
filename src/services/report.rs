use serde_json::{json, Value};

use super::ServiceError;
use crate::api::{ApiClient, ApiError, FormData, RequestOptions};
use crate::schema::{validate_report_list, Report};

/// Inclusive creation-time window for the admin report listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRange {
    start: String,
    end: String,
}

impl ReportRange {
    /// Both bounds are ISO 8601 timestamps as the backend parses them.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, ServiceError> {
        let start = start.into().trim().to_string();
        let end = end.into().trim().to_string();
        if start.is_empty() || end.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Report range needs both a start and an end date".to_string(),
            ));
        }
        // Same-format ISO timestamps order lexicographically.
        if start.len() == end.len() && start > end {
            return Err(ServiceError::InvalidInput(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    fn to_form(&self) -> FormData {
        FormData::new()
            .text("start_date", self.start.clone())
            .text("end_date", self.end.clone())
    }
}

/// What a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTarget {
    Post(i64),
    Claim(i64),
}

/// A report about to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub title: String,
    pub message: String,
    pub target: ReportTarget,
}

impl ReportDraft {
    fn to_body(&self) -> Result<Value, ServiceError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Please select a reason or specify one.".to_string(),
            ));
        }
        let message = self.message.trim();
        if message.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Please provide a description of the issue.".to_string(),
            ));
        }

        let mut body = json!({ "title": title, "report_message": message });
        match self.target {
            ReportTarget::Post(id) => body["post_id"] = json!(id),
            ReportTarget::Claim(id) => body["claim_id"] = json!(id),
        }
        Ok(body)
    }
}

/// Report submission and the admin report listing.
#[derive(Clone)]
pub struct ReportService {
    api: ApiClient,
}

impl ReportService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_reports(&self, range: &ReportRange) -> Result<Vec<Report>, ServiceError> {
        let raw = self
            .api
            .post(
                "/others/reports",
                range.to_form(),
                RequestOptions::default().form_data(true),
            )
            .await?;
        let reports = validate_report_list(&raw).map_err(ApiError::from)?;
        tracing::debug!(count = reports.len(), start = %range.start, end = %range.end, "Fetched reports");
        Ok(reports)
    }

    pub async fn send_report(&self, draft: &ReportDraft) -> Result<Value, ServiceError> {
        let body = draft.to_body()?;
        let response = self
            .api
            .post("/others/report/send-report", body, RequestOptions::default())
            .await?;
        tracing::info!(report_target = ?draft.target, "Report submitted");
        Ok(response)
    }
}
