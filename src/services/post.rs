use serde_json::{json, Map, Value};

use super::ServiceError;
use crate::api::{path_with_query, ApiClient, RequestOptions};

/// Relative creation window offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Today,
    ThisWeek,
    ThisMonth,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Today => "today",
            TimeWindow::ThisWeek => "this_week",
            TimeWindow::ThisMonth => "this_month",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "today" | "this_day" => Some(TimeWindow::Today),
            "this_week" | "week" => Some(TimeWindow::ThisWeek),
            "this_month" | "month" => Some(TimeWindow::ThisMonth),
            _ => None,
        }
    }
}

/// Exactly one dashboard filter at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DashboardFilter {
    #[default]
    All,
    Building(String),
    TimeRange(TimeWindow),
    /// `B` for the basement, otherwise `1` through `8`.
    Floor(String),
}

impl DashboardFilter {
    fn to_filters(&self) -> Result<Value, ServiceError> {
        let mut filters = Map::new();
        match self {
            DashboardFilter::All => {}
            DashboardFilter::Building(code) => {
                let code = code.trim();
                if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(ServiceError::InvalidInput(format!(
                        "Invalid building code: {:?}",
                        code
                    )));
                }
                filters.insert("building".to_string(), json!(code.to_ascii_uppercase()));
            }
            DashboardFilter::TimeRange(window) => {
                filters.insert("time_range".to_string(), json!(window.as_str()));
            }
            DashboardFilter::Floor(floor) => {
                let floor = floor.trim().to_ascii_uppercase();
                let valid = floor == "B" || matches!(floor.parse::<u8>(), Ok(1..=8));
                if !valid {
                    return Err(ServiceError::InvalidInput(format!(
                        "Invalid floor: {:?} (expected B or 1-8)",
                        floor
                    )));
                }
                filters.insert("floor".to_string(), json!(floor));
            }
        }
        Ok(Value::Object(filters))
    }
}

/// One dashboard page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    pub archived: bool,
    pub refresh: bool,
    pub page: u32,
    pub limit: u32,
    pub filter: DashboardFilter,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            archived: false,
            refresh: false,
            page: 1,
            limit: 10,
            filter: DashboardFilter::All,
        }
    }
}

impl DashboardQuery {
    fn path(&self) -> String {
        path_with_query(
            "/post/dashboard",
            &[
                ("archived", self.archived.to_string()),
                ("refresh", self.refresh.to_string()),
                ("page", self.page.max(1).to_string()),
                ("limit", self.limit.max(1).to_string()),
            ],
        )
    }
}

/// Dashboard post listing. Post bodies are returned as raw JSON.
#[derive(Clone)]
pub struct PostService {
    api: ApiClient,
}

impl PostService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn dashboard(&self, query: &DashboardQuery) -> Result<Value, ServiceError> {
        let body = json!({ "filters": query.filter.to_filters()? });
        let path = query.path();
        tracing::debug!(path = %path, filter = ?query.filter, "Fetching dashboard");
        Ok(self.api.post(&path, body, RequestOptions::default()).await?)
    }
}
