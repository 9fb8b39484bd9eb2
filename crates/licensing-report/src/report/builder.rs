use super::accumulator;
use super::catalog::{CatalogError, ReportCatalog};
use super::fees::{Amount, FeeLedger};
use super::record::{ApplicationRecord, RecordError};
use super::series::{default_palette, MonthlyHistogram, ReportWindow, RollingStatusWindow};
use super::source::SourceError;
use super::views::{AggregateReport, ReportMetadata};
use crate::config::ReportConfig;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Per-batch inputs that are not part of the record stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub window: ReportWindow,
    pub today: NaiveDate,
    pub palette: Vec<String>,
    pub evaluator: Option<String>,
    pub permit_number: Option<String>,
}

impl ReportOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            window: ReportWindow::default(),
            today,
            palette: default_palette(),
            evaluator: None,
            permit_number: None,
        }
    }

    pub fn from_config(config: &ReportConfig, today: NaiveDate) -> Self {
        Self {
            palette: config.palette.clone(),
            evaluator: config.evaluator.clone(),
            permit_number: config.permit_number.clone(),
            ..Self::new(today)
        }
    }

    pub fn with_window(mut self, window: ReportWindow) -> Self {
        self.window = window;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStep {
    Intake,
    Classify,
    Fees,
}

impl RecordStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::Classify => "classify",
            Self::Fees => "fees",
        }
    }
}

/// A step that was skipped for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIssue {
    pub position: usize,
    pub step: RecordStep,
    pub message: String,
}

/// Single-pass accumulator over an application stream.
///
/// Each application runs through classification, fee rollup and the timeline
/// builders. A step that rejects the application is logged and recorded as a
/// [`RecordIssue`]; the remaining steps and applications still run.
#[derive(Debug)]
pub struct ReportBuilder {
    options: ReportOptions,
    catalog: ReportCatalog,
    fees: FeeLedger,
    monthly: MonthlyHistogram,
    rolling: RollingStatusWindow,
    total_fee: Amount,
    processed: usize,
    evaluator: Option<String>,
    validity_start: Option<NaiveDate>,
    validity_end: Option<NaiveDate>,
    issues: Vec<RecordIssue>,
    truncation: Option<String>,
}

impl ReportBuilder {
    pub fn new(options: ReportOptions) -> Result<Self, CatalogError> {
        Ok(Self::with_catalog(ReportCatalog::baseline()?, options))
    }

    pub fn with_catalog(catalog: ReportCatalog, options: ReportOptions) -> Self {
        Self {
            monthly: MonthlyHistogram::new(options.window),
            rolling: RollingStatusWindow::ending(options.today),
            evaluator: options.evaluator.clone(),
            fees: FeeLedger::baseline(),
            catalog,
            options,
            total_fee: Amount::ZERO,
            processed: 0,
            validity_start: None,
            validity_end: None,
            issues: Vec::new(),
            truncation: None,
        }
    }

    pub fn ingest(&mut self, value: Value) {
        self.ingest_record(&ApplicationRecord::new(value));
    }

    pub fn ingest_all<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        for value in values {
            self.ingest(value);
        }
    }

    /// Consumes a fallible stream; the first read error ends the batch and marks it truncated.
    pub fn ingest_stream<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Result<Value, SourceError>>,
    {
        for value in values {
            match value {
                Ok(value) => self.ingest(value),
                Err(err) => {
                    warn!(
                        after = self.processed,
                        error = %err,
                        "application stream failed; reporting partial batch"
                    );
                    self.truncation = Some(err.to_string());
                    break;
                }
            }
        }
    }

    pub fn ingest_record(&mut self, record: &ApplicationRecord) {
        let position = self.processed;
        self.processed += 1;

        if let Err(err) = record.ensure_object() {
            self.note(position, RecordStep::Intake, err);
            return;
        }

        match accumulator::accumulate(&mut self.catalog, record) {
            Ok(_) => self.total_fee += record.total_fee(),
            Err(err) => self.note(position, RecordStep::Classify, err),
        }

        if let Err(err) = self.post_fees(record) {
            self.note(position, RecordStep::Fees, err);
        }

        self.track_timeline(record);
        self.capture_metadata(record);
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn issues(&self) -> &[RecordIssue] {
        &self.issues
    }

    pub fn catalog(&self) -> &ReportCatalog {
        &self.catalog
    }

    pub fn finish(self) -> AggregateReport {
        let metadata = ReportMetadata {
            period_start: self.options.window.start,
            period_end: self.options.window.end,
            generated_on: self.options.today,
            evaluator: self.evaluator,
            permit_number: self.options.permit_number,
            validity_start: self.validity_start,
            validity_end: self.validity_end,
        };

        let report = AggregateReport {
            metadata,
            monthly: self.monthly.data_points(&self.options.palette),
            monthly_statuses: self.monthly.entries(),
            status_series: self.rolling.chart(),
            total_fee: self.total_fee,
            fee_total: self.fees.total(),
            applications_processed: self.processed,
            truncated: self.truncation.is_some(),
            truncation_reason: self.truncation,
            issues: self.issues,
            rows: self.catalog.into_rows(),
            fee_buckets: self.fees.into_buckets(),
        };

        info!(
            applications = report.applications_processed,
            rows = report.rows.len(),
            issues = report.issues.len(),
            truncated = report.truncated,
            "license report assembled"
        );

        report
    }

    fn post_fees(&mut self, record: &ApplicationRecord) -> Result<(), RecordError> {
        let lines = record.fee_lines();
        if let Some(line) = lines.iter().find(|line| line.amount.is_negative()) {
            return Err(RecordError::NegativeFeeLine {
                item: line.item.clone(),
                amount: line.amount,
            });
        }
        if let Some(line) = lines.iter().find(|line| line.amount.exceeds_ceiling()) {
            return Err(RecordError::AmountOutOfRange {
                field: line.item.clone(),
                amount: line.amount,
            });
        }

        self.fees.post_all(&lines);
        Ok(())
    }

    fn track_timeline(&mut self, record: &ApplicationRecord) {
        let (Some(updated_at), Some(status)) = (record.updated_at(), record.status()) else {
            return;
        };

        self.monthly.record(updated_at, status);
        self.rolling.record(updated_at, status);
    }

    fn capture_metadata(&mut self, record: &ApplicationRecord) {
        if self.evaluator.is_none() {
            self.evaluator = record.evaluator_name();
        }
        if let Some(start) = record.validity_start() {
            self.validity_start = Some(self.validity_start.map_or(start, |s| s.min(start)));
        }
        if let Some(end) = record.validity_end() {
            self.validity_end = Some(self.validity_end.map_or(end, |e| e.max(end)));
        }
    }

    fn note(&mut self, position: usize, step: RecordStep, err: RecordError) {
        warn!(position, step = step.label(), error = %err, "application step skipped");
        self.issues.push(RecordIssue {
            position,
            step,
            message: err.to_string(),
        });
    }
}
