//! Classification and accumulation engine for licensing application reports.
//!
//! Applications stream through [`ReportBuilder`] one at a time: each is resolved
//! to its catalog row, classified per station particular, rolled into the fee
//! buckets and tallied into the status charts. [`ReportBuilder::finish`] yields
//! the serialisable [`AggregateReport`].

pub mod accumulator;
mod builder;
pub mod catalog;
pub mod classifier;
pub mod fees;
pub mod record;
pub mod router;
pub mod series;
pub mod source;
pub mod views;

pub use builder::{RecordIssue, RecordStep, ReportBuilder, ReportOptions};
pub use catalog::{CatalogError, CatalogRow, Element, ReceiveKind, ReportCatalog};
pub use fees::{Amount, FeeBucket, FeeLedger, FeeLine};
pub use record::{ApplicationRecord, RecordError};
pub use router::report_router;
pub use series::{ChartDataPoint, ReportWindow, StackedSeries, TrackedStatus};
pub use source::{read_records, RecordStream, SourceError};
pub use views::{AggregateReport, ReportMetadata, ReportSummary};
