use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::builder::{ReportBuilder, ReportOptions};
use super::series::ReportWindow;
use super::views::AggregateReport;
use crate::config::ReportConfig;
use crate::error::AppError;

/// Body of `POST /api/v1/reports`. Every field except `records` is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub records: Vec<Value>,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub evaluator: Option<String>,
    #[serde(default)]
    pub permit_number: Option<String>,
}

impl ReportRequest {
    fn options(&self, defaults: &ReportConfig) -> ReportOptions {
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let mut options = ReportOptions::from_config(defaults, today)
            .with_window(ReportWindow::new(self.period_start, self.period_end));
        if let Some(evaluator) = non_blank(self.evaluator.as_deref()) {
            options.evaluator = Some(evaluator);
        }
        if let Some(permit) = non_blank(self.permit_number.as_deref()) {
            options.permit_number = Some(permit);
        }
        options
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Router exposing the report builder over HTTP.
pub fn report_router(defaults: Arc<ReportConfig>) -> Router {
    Router::new()
        .route("/api/v1/reports", post(build_report_handler))
        .with_state(defaults)
}

pub(crate) async fn build_report_handler(
    State(defaults): State<Arc<ReportConfig>>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<AggregateReport>, AppError> {
    let options = request.options(&defaults);
    let mut builder = ReportBuilder::new(options)?;
    builder.ingest_all(request.records);
    Ok(Json(builder.finish()))
}
