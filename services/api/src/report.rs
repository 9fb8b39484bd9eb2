use crate::infra::parse_date;
use chrono::{NaiveDate, Utc};
use clap::Args;
use licensing_report::config::{AppConfig, ReportConfig};
use licensing_report::error::AppError;
use licensing_report::report::{
    AggregateReport, RecordStream, ReportBuilder, ReportOptions, ReportWindow,
};
use licensing_report::telemetry;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON export of application records (array, NDJSON, or `-` for stdin)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// First day of the reporting period (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) period_start: Option<NaiveDate>,
    /// Last day of the reporting period (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) period_end: Option<NaiveDate>,
    /// Reference date for the rolling status chart (defaults to today, UTC)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Evaluator printed on the report
    #[arg(long)]
    pub(crate) evaluator: Option<String>,
    /// Permit number printed on the report
    #[arg(long)]
    pub(crate) permit_number: Option<String>,
    /// Emit the full aggregate as JSON instead of the console summary
    #[arg(long)]
    pub(crate) json: bool,
    /// Number of busiest catalog rows listed in the console summary
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let report = build_report(&args, &config.report)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report).map_err(io::Error::from)?;
        writeln!(out)?;
    } else {
        render_report(&mut out, &report, args.top)?;
    }
    Ok(())
}

pub(crate) fn build_report(
    args: &ReportArgs,
    defaults: &ReportConfig,
) -> Result<AggregateReport, AppError> {
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let mut options = ReportOptions::from_config(defaults, today)
        .with_window(ReportWindow::new(args.period_start, args.period_end));
    if let Some(evaluator) = args.evaluator.clone() {
        options.evaluator = Some(evaluator);
    }
    if let Some(permit_number) = args.permit_number.clone() {
        options.permit_number = Some(permit_number);
    }

    let mut builder = ReportBuilder::new(options)?;
    if args.input.as_os_str() == "-" {
        builder.ingest_stream(RecordStream::new(io::stdin().lock()));
    } else {
        builder.ingest_stream(RecordStream::open(&args.input)?);
    }
    Ok(builder.finish())
}

pub(crate) fn render_report<W: Write>(
    out: &mut W,
    report: &AggregateReport,
    top: usize,
) -> io::Result<()> {
    let metadata = &report.metadata;
    let summary = report.summary(top);

    writeln!(out, "Licensing application report")?;
    writeln!(
        out,
        "Period: {} -> {} (generated {})",
        display_date(metadata.period_start),
        display_date(metadata.period_end),
        metadata.generated_on
    )?;
    if let Some(evaluator) = &metadata.evaluator {
        writeln!(out, "Evaluator: {evaluator}")?;
    }
    if let Some(permit) = &metadata.permit_number {
        writeln!(out, "Permit number: {permit}")?;
    }
    if metadata.validity_start.is_some() || metadata.validity_end.is_some() {
        writeln!(
            out,
            "Validity: {} -> {}",
            display_date(metadata.validity_start),
            display_date(metadata.validity_end)
        )?;
    }

    writeln!(
        out,
        "\nApplications processed: {} | issues: {} | total fee {} | fee buckets {}",
        summary.applications_processed, summary.issue_count, summary.total_fee, summary.fee_total
    )?;
    if let Some(reason) = &report.truncation_reason {
        writeln!(out, "WARNING: input ended early ({reason}); figures are partial")?;
    }

    if summary.top_rows.is_empty() {
        writeln!(out, "\nCatalog rows: none counted")?;
    } else {
        writeln!(out, "\nBusiest catalog rows")?;
        for row in &summary.top_rows {
            writeln!(
                out,
                "- {}: {} | fee {} | {}",
                row.name, row.count, row.total_fee, row.receive_kind_label
            )?;
        }
    }

    if !summary.active_buckets.is_empty() {
        writeln!(out, "\nFee buckets")?;
        for bucket in &summary.active_buckets {
            writeln!(out, "- {}: {}", bucket.name, bucket.value)?;
        }
    }

    if !summary.monthly.is_empty() {
        writeln!(out, "\nApplications by month")?;
        for point in &summary.monthly {
            writeln!(out, "- {}: {}", point.label, point.value)?;
        }
    }

    writeln!(out, "\nLast {} days by status", report.status_series.categories.len())?;
    for series in &report.status_series.series {
        let total: u64 = series.data.iter().sum();
        writeln!(out, "- {}: {}", series.name, total)?;
    }

    if !report.issues.is_empty() {
        writeln!(out, "\nSkipped steps")?;
        for issue in &report.issues {
            writeln!(
                out,
                "- record {} [{}]: {}",
                issue.position,
                issue.step.label(),
                issue.message
            )?;
        }
    }

    Ok(())
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.to_string())
        .unwrap_or_else(|| "open".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn args(input: PathBuf) -> ReportArgs {
        ReportArgs {
            input,
            period_start: None,
            period_end: None,
            today: NaiveDate::from_ymd_opt(2026, 10, 19),
            evaluator: None,
            permit_number: Some("PN-0042".to_string()),
            json: false,
            top: 5,
        }
    }

    fn write_input(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write input");
        file
    }

    #[test]
    fn builds_and_renders_report_from_file() {
        let input = write_input(
            r#"[
                {
                    "service": { "applicationType": { "label": "Permit to Purchase (NEW)" } },
                    "totalFee": 180,
                    "soa": [{ "item": "Permit Fee", "amount": 180 }],
                    "status": "Approved",
                    "updatedAt": "2026-10-10T08:00:00Z",
                    "evaluator": { "firstName": "Lia", "lastName": "Santos" }
                }
            ]"#,
        );

        let report =
            build_report(&args(input.path().to_path_buf()), &ReportConfig::default())
                .expect("report builds");
        assert_eq!(report.applications_processed, 1);
        assert!(!report.truncated);

        let mut rendered = Vec::new();
        render_report(&mut rendered, &report, 5).expect("render succeeds");
        let text = String::from_utf8(rendered).expect("utf8 output");
        assert!(text.contains("Permit to Purchase (NEW): 1"));
        assert!(text.contains("Evaluator: Lia Santos"));
        assert!(text.contains("Permit number: PN-0042"));
        assert!(text.contains("Last 30 days by status"));
        assert!(text.contains("- Approved: 1"));
    }

    #[test]
    fn reports_partial_batch_on_malformed_input() {
        let input = write_input("{\"status\": \"Declined\"}\n{\"status\": ");
        let report =
            build_report(&args(input.path().to_path_buf()), &ReportConfig::default())
                .expect("partial report builds");
        assert_eq!(report.applications_processed, 1);
        assert!(report.truncated);

        let mut rendered = Vec::new();
        render_report(&mut rendered, &report, 5).expect("render succeeds");
        let text = String::from_utf8(rendered).expect("utf8 output");
        assert!(text.contains("input ended early"));
    }

    #[test]
    fn reference_date_defaults_to_utc_today() {
        let input = write_input("[]");
        let mut args = args(input.path().to_path_buf());
        args.today = None;

        let before = Utc::now().date_naive();
        let report = build_report(&args, &ReportConfig::default()).expect("report builds");
        let after = Utc::now().date_naive();

        let generated_on = report.metadata.generated_on;
        assert!(generated_on == before || generated_on == after);
        assert_eq!(report.status_series.categories.last(), Some(&generated_on));
    }

    #[test]
    fn missing_input_is_an_error() {
        let result = build_report(
            &args(PathBuf::from("/definitely/not/here.json")),
            &ReportConfig::default(),
        );
        assert!(matches!(result, Err(AppError::Source(_))));
    }
}
