use super::builder::RecordIssue;
use super::catalog::{normalize_label, CatalogRow};
use super::fees::{Amount, FeeBucket};
use super::series::{ChartDataPoint, MonthlyStatusEntry, StatusSeriesChart};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMetadata {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub generated_on: NaiveDate,
    pub evaluator: Option<String>,
    pub permit_number: Option<String>,
    pub validity_start: Option<NaiveDate>,
    pub validity_end: Option<NaiveDate>,
}

/// The finished batch handed to rendering and upload collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub metadata: ReportMetadata,
    pub rows: Vec<CatalogRow>,
    pub fee_buckets: Vec<FeeBucket>,
    pub monthly: Vec<ChartDataPoint>,
    pub monthly_statuses: Vec<MonthlyStatusEntry>,
    pub status_series: StatusSeriesChart,
    pub total_fee: Amount,
    pub fee_total: Amount,
    pub applications_processed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<RecordIssue>,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation_reason: Option<String>,
}

impl AggregateReport {
    pub fn row(&self, name: &str) -> Option<&CatalogRow> {
        let key = normalize_label(name);
        self.rows.iter().find(|row| normalize_label(&row.name) == key)
    }

    /// Condensed view: the busiest rows and the non-empty fee buckets.
    pub fn summary(&self, top_rows: usize) -> ReportSummary {
        let mut active_rows: Vec<RowSummaryEntry> = self
            .rows
            .iter()
            .filter(|row| row.count > 0)
            .map(|row| RowSummaryEntry {
                name: row.name.clone(),
                count: row.count,
                total_fee: row.total_fee,
                receive_kind_label: row.receive_kind.label(),
            })
            .collect();
        active_rows.sort_by(|a, b| b.count.cmp(&a.count));
        active_rows.truncate(top_rows);

        let active_buckets = self
            .fee_buckets
            .iter()
            .filter(|bucket| bucket.value != Amount::ZERO)
            .cloned()
            .collect();

        ReportSummary {
            applications_processed: self.applications_processed,
            issue_count: self.issues.len(),
            truncated: self.truncated,
            total_fee: self.total_fee,
            fee_total: self.fee_total,
            top_rows: active_rows,
            active_buckets,
            monthly: self.monthly.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RowSummaryEntry {
    pub name: String,
    pub count: u64,
    pub total_fee: Amount,
    pub receive_kind_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub applications_processed: usize,
    pub issue_count: usize,
    pub truncated: bool,
    pub total_fee: Amount,
    pub fee_total: Amount,
    pub top_rows: Vec<RowSummaryEntry>,
    pub active_buckets: Vec<FeeBucket>,
    pub monthly: Vec<ChartDataPoint>,
}
