use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use super::catalog::normalize_label;
use serde::Serialize;
use std::collections::BTreeMap;

/// Length of the rolling status window, in days, ending today.
pub const ROLLING_WINDOW_DAYS: usize = 30;

pub const DEFAULT_PALETTE: [&str; 10] = [
    "#4E79A7", "#F28E2B", "#E15759", "#76B7B2", "#59A14F", "#EDC948", "#B07AA1", "#FF9DA7",
    "#9C755F", "#BAB0AC",
];

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|color| color.to_string()).collect()
}

/// Reporting period. Only the year of `start` and the months of both bounds are
/// consulted when filtering the monthly histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReportWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    // Month-only comparison: a record on the 31st passes an end bound of the 1st.
    pub fn admits(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date.year() != start.year() || date.month() < start.month() {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date.month() > end.month() {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|date| date.format("%b %Y").to_string())
            .unwrap_or_else(|| format!("{:02}/{}", self.month, self.year))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub value: u64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyStatusEntry {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub statuses: BTreeMap<String, u64>,
}

/// Status tallies per calendar month for records inside the report window.
#[derive(Debug, Clone, Default)]
pub struct MonthlyHistogram {
    window: ReportWindow,
    months: BTreeMap<MonthKey, BTreeMap<String, u64>>,
}

impl MonthlyHistogram {
    pub fn new(window: ReportWindow) -> Self {
        Self {
            window,
            months: BTreeMap::new(),
        }
    }

    /// Returns whether the record was inside the window and tallied.
    pub fn record(&mut self, updated_at: DateTime<Utc>, status: &str) -> bool {
        let date = updated_at.date_naive();
        if !self.window.admits(date) {
            return false;
        }

        *self
            .months
            .entry(MonthKey::of(date))
            .or_default()
            .entry(status_key(status))
            .or_default() += 1;
        true
    }

    pub fn count(&self, key: MonthKey, status: &str) -> u64 {
        self.months
            .get(&key)
            .and_then(|statuses| statuses.get(&status_key(status)))
            .copied()
            .unwrap_or(0)
    }

    /// One point per month, ascending by `(year, month)`, colors assigned in that order.
    pub fn data_points(&self, palette: &[String]) -> Vec<ChartDataPoint> {
        self.months
            .iter()
            .enumerate()
            .map(|(position, (key, statuses))| ChartDataPoint {
                label: key.label(),
                year: key.year,
                month: key.month,
                value: statuses.values().sum(),
                color: palette_color(palette, position),
            })
            .collect()
    }

    pub fn entries(&self) -> Vec<MonthlyStatusEntry> {
        self.months
            .iter()
            .map(|(key, statuses)| MonthlyStatusEntry {
                label: key.label(),
                year: key.year,
                month: key.month,
                statuses: statuses.clone(),
            })
            .collect()
    }
}

/// Tracked statuses key by their display label, anything else by its folded text.
fn status_key(status: &str) -> String {
    TrackedStatus::parse(status)
        .map(|tracked| tracked.label().to_string())
        .unwrap_or_else(|| normalize_label(status))
}

fn palette_color(palette: &[String], position: usize) -> String {
    if palette.is_empty() {
        return DEFAULT_PALETTE[position % DEFAULT_PALETTE.len()].to_string();
    }
    palette[position % palette.len()].clone()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedStatus {
    Declined,
    ForApproval,
    Approved,
    ForEvaluation,
}

impl TrackedStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Declined,
            Self::ForApproval,
            Self::Approved,
            Self::ForEvaluation,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Declined => "Declined",
            Self::ForApproval => "For Approval",
            Self::Approved => "Approved",
            Self::ForEvaluation => "For Evaluation",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ordered()
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(&normalized))
    }

    const fn position(self) -> usize {
        match self {
            Self::Declined => 0,
            Self::ForApproval => 1,
            Self::Approved => 2,
            Self::ForEvaluation => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackedSeries {
    pub name: &'static str,
    pub stack: &'static str,
    pub data: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSeriesChart {
    pub categories: Vec<NaiveDate>,
    pub series: Vec<StackedSeries>,
}

/// Daily counts of the tracked statuses over the thirty UTC days ending `today`.
#[derive(Debug, Clone)]
pub struct RollingStatusWindow {
    first_day: NaiveDate,
    days: [[u64; 4]; ROLLING_WINDOW_DAYS],
}

impl RollingStatusWindow {
    pub fn ending(today: NaiveDate) -> Self {
        Self {
            first_day: today - Duration::days(ROLLING_WINDOW_DAYS as i64 - 1),
            days: [[0; 4]; ROLLING_WINDOW_DAYS],
        }
    }

    /// Returns whether the record fell on a tracked day with a tracked status.
    pub fn record(&mut self, updated_at: DateTime<Utc>, status: &str) -> bool {
        let Some(status) = TrackedStatus::parse(status) else {
            return false;
        };
        let offset = (updated_at.date_naive() - self.first_day).num_days();
        if !(0..ROLLING_WINDOW_DAYS as i64).contains(&offset) {
            return false;
        }

        self.days[offset as usize][status.position()] += 1;
        true
    }

    pub fn categories(&self) -> Vec<NaiveDate> {
        (0..ROLLING_WINDOW_DAYS as i64)
            .map(|offset| self.first_day + Duration::days(offset))
            .collect()
    }

    // Raw daily counts; charts stack them rather than normalizing to proportions.
    pub fn series(&self) -> Vec<StackedSeries> {
        TrackedStatus::ordered()
            .into_iter()
            .map(|status| StackedSeries {
                name: status.label(),
                stack: "status",
                data: self
                    .days
                    .iter()
                    .map(|counts| counts[status.position()])
                    .collect(),
            })
            .collect()
    }

    pub fn chart(&self) -> StatusSeriesChart {
        StatusSeriesChart {
            categories: self.categories(),
            series: self.series(),
        }
    }
}
