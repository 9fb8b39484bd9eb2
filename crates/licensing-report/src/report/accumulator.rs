use super::catalog::{CatalogRow, ReceiveKind, ReportCatalog};
use super::classifier::{receive_kind, ClassificationContext, SkipReason};
use super::fees::{surcharge_total, Amount};
use super::record::{ApplicationRecord, RecordError};
use tracing::debug;

/// Count added to a classified row: one for the application, plus equipment items and license-years.
pub fn classifier_bump(equipment_count: u64, years: u64) -> u64 {
    1u64.saturating_add(equipment_count.max(1))
        .saturating_add(years.max(1))
}

/// What one application adds to the row named by its own label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseContribution<'a> {
    pub label: Option<&'a str>,
    pub kind: ReceiveKind,
    pub total_fee: Amount,
    pub surcharge: Amount,
    pub element: Option<&'a str>,
    pub record_type: Option<&'a str>,
}

impl<'a> BaseContribution<'a> {
    /// Validates before anything is applied so a rejected record leaves no partial increments.
    pub fn from_record(record: &'a ApplicationRecord) -> Result<Self, RecordError> {
        let total_fee = record.total_fee();
        if total_fee.is_negative() {
            return Err(RecordError::NegativeTotalFee(total_fee));
        }
        if total_fee.exceeds_ceiling() {
            return Err(RecordError::AmountOutOfRange {
                field: "totalFee".to_string(),
                amount: total_fee,
            });
        }

        let lines = record.fee_lines();
        if let Some(line) = lines
            .iter()
            .find(|line| line.is_surcharge() && line.amount.is_negative())
        {
            return Err(RecordError::NegativeFeeLine {
                item: line.item.clone(),
                amount: line.amount,
            });
        }
        if let Some(line) = lines
            .iter()
            .find(|line| line.is_surcharge() && line.amount.exceeds_ceiling())
        {
            return Err(RecordError::AmountOutOfRange {
                field: line.item.clone(),
                amount: line.amount,
            });
        }

        let label = record.application_label();
        Ok(Self {
            label,
            kind: label.map(receive_kind).unwrap_or_default(),
            total_fee,
            surcharge: surcharge_total(&lines),
            element: record.element(),
            record_type: record.record_type(),
        })
    }

    pub fn apply(&self, row: &mut CatalogRow) {
        row.count = row.count.saturating_add(1);
        row.total_fee += self.total_fee;
        row.surcharge += self.surcharge;
        row.set_receive_kind_once(self.kind);
        if let Some(record_type) = self.record_type {
            row.set_type_once(record_type);
        }
        if let Some(element) = self.element {
            row.bump_element(element);
        }
    }
}

/// Rows touched by one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationOutcome {
    pub base_row: usize,
    pub classified_rows: Vec<usize>,
    pub skipped: Vec<SkipReason>,
}

/// Applies the base-row contribution, then the per-particular classifier bumps.
pub fn accumulate(
    catalog: &mut ReportCatalog,
    record: &ApplicationRecord,
) -> Result<ClassificationOutcome, RecordError> {
    record.ensure_object()?;
    let contribution = BaseContribution::from_record(record)?;

    let base_row = catalog.ensure_row(contribution.label);
    if let Some(row) = catalog.row_mut(base_row) {
        contribution.apply(row);
    }

    let mut outcome = ClassificationOutcome {
        base_row,
        ..ClassificationOutcome::default()
    };
    classify_particulars(catalog, record, &mut outcome);
    Ok(outcome)
}

fn classify_particulars(
    catalog: &mut ReportCatalog,
    record: &ApplicationRecord,
    outcome: &mut ClassificationOutcome,
) {
    let context =
        match ClassificationContext::resolve(record.application_label(), record.nature_of_service())
        {
            Ok(context) => context,
            Err(reason) => {
                debug!(
                    label = record.application_label().unwrap_or_default(),
                    reason = reason.label(),
                    "application not classified"
                );
                outcome.skipped.push(reason);
                return;
            }
        };

    let bump = classifier_bump(record.equipment_count(), record.years());
    for particular in record.particulars() {
        match context.target_label(particular.station_class) {
            Ok(label) => {
                let position = catalog.ensure_row(Some(label));
                if let Some(row) = catalog.row_mut(position) {
                    row.count = row.count.saturating_add(bump);
                    row.set_receive_kind_once(context.kind);
                }
                outcome.classified_rows.push(position);
            }
            Err(reason) => {
                debug!(
                    family = context.family.label(),
                    nature = context.nature.code(),
                    station_class = particular.station_class.unwrap_or_default(),
                    reason = reason.label(),
                    "particular skipped"
                );
                outcome.skipped.push(reason);
            }
        }
    }
}
