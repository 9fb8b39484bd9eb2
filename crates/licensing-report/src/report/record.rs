use super::fees::{Amount, FeeLine};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Failure of one processing step for one application. Never fatal to a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("application is a JSON {kind}, expected an object")]
    NotAnObject { kind: &'static str },
    #[error("application total fee is negative ({0})")]
    NegativeTotalFee(Amount),
    #[error("fee line '{item}' has a negative amount ({amount})")]
    NegativeFeeLine { item: String, amount: Amount },
    #[error("'{field}' amount {amount} is beyond the accepted ceiling")]
    AmountOutOfRange { field: String, amount: Amount },
}

/// Read-only view over one loosely-shaped application document.
///
/// Every accessor returns `None` (or an empty collection) when a path segment is
/// missing, null or of an unexpected type.
#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    value: Value,
}

/// One station entry attached to an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Particular<'a> {
    pub station_class: Option<&'a str>,
    pub equipment_count: usize,
}

impl From<Value> for ApplicationRecord {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl ApplicationRecord {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn is_object(&self) -> bool {
        self.value.is_object()
    }

    pub fn json_kind(&self) -> &'static str {
        match &self.value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn ensure_object(&self) -> Result<(), RecordError> {
        if self.is_object() {
            Ok(())
        } else {
            Err(RecordError::NotAnObject {
                kind: self.json_kind(),
            })
        }
    }

    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        lookup(&self.value, path)
    }

    pub fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(as_text)
    }

    pub fn u64_at(&self, path: &[&str]) -> Option<u64> {
        self.get(path).and_then(as_count)
    }

    pub fn amount_at(&self, path: &[&str]) -> Option<Amount> {
        self.get(path).and_then(as_amount)
    }

    pub fn array_at(&self, path: &[&str]) -> &[Value] {
        self.get(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn timestamp_at(&self, path: &[&str]) -> Option<DateTime<Utc>> {
        self.get(path).and_then(as_timestamp)
    }

    pub fn application_label(&self) -> Option<&str> {
        self.str_at(&["service", "applicationType", "label"])
    }

    pub fn element(&self) -> Option<&str> {
        self.str_at(&["service", "applicationType", "element"])
    }

    pub fn nature_of_service(&self) -> Option<&str> {
        self.str_at(&["service", "natureOfService", "type"])
    }

    /// Declared license-years, at least 1.
    pub fn years(&self) -> u64 {
        self.u64_at(&["service", "applicationDetails", "noOfYears"])
            .unwrap_or(1)
            .max(1)
    }

    pub fn particulars(&self) -> Vec<Particular<'_>> {
        self.array_at(&["service", "particulars"])
            .iter()
            .filter(|particular| particular.is_object())
            .map(|particular| Particular {
                station_class: lookup(particular, &["stationClass"]).and_then(as_text),
                equipment_count: lookup(particular, &["equipments"])
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len),
            })
            .collect()
    }

    /// Equipment items across all particulars, at least 1.
    pub fn equipment_count(&self) -> u64 {
        let total: usize = self
            .particulars()
            .iter()
            .map(|particular| particular.equipment_count)
            .sum();
        (total as u64).max(1)
    }

    pub fn total_fee(&self) -> Amount {
        self.amount_at(&["totalFee"]).unwrap_or_default()
    }

    /// Statement-of-account lines; entries that are not objects are ignored and a
    /// missing amount counts as zero.
    pub fn fee_lines(&self) -> Vec<FeeLine> {
        self.array_at(&["soa"])
            .iter()
            .filter(|line| line.is_object())
            .map(|line| {
                FeeLine::new(
                    lookup(line, &["item"]).and_then(as_text).unwrap_or_default(),
                    lookup(line, &["amount"])
                        .and_then(as_amount)
                        .unwrap_or_default(),
                )
            })
            .collect()
    }

    pub fn status(&self) -> Option<&str> {
        self.str_at(&["status"])
    }

    pub fn record_type(&self) -> Option<&str> {
        self.str_at(&["type"])
    }

    /// `updatedAt`, falling back to `createdAt`.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_at(&["updatedAt"])
            .or_else(|| self.timestamp_at(&["createdAt"]))
    }

    pub fn validity_start(&self) -> Option<NaiveDate> {
        self.timestamp_at(&["service", "validityStart"])
            .map(|timestamp| timestamp.date_naive())
    }

    pub fn validity_end(&self) -> Option<NaiveDate> {
        self.timestamp_at(&["service", "validityEnd"])
            .map(|timestamp| timestamp.date_naive())
    }

    /// `First Middle Last Suffix`, skipping blank parts.
    pub fn evaluator_name(&self) -> Option<String> {
        let parts: Vec<&str> = ["firstName", "middleName", "lastName", "suffix"]
            .into_iter()
            .filter_map(|field| self.str_at(&["evaluator", field]))
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, segment| current.as_object()?.get(*segment))
        .filter(|found| !found.is_null())
}

fn as_text(value: &Value) -> Option<&str> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|n| n.is_finite() && *n >= 0.0 && *n < u64::MAX as f64)
                    .map(|n| n as u64)
            }),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn as_amount(value: &Value) -> Option<Amount> {
    match value {
        Value::Number(number) => number.as_f64().and_then(Amount::from_f64),
        Value::String(text) => Amount::parse(text),
        Value::Object(map) => map
            .get("$numberDecimal")
            .and_then(Value::as_str)
            .and_then(Amount::parse),
        _ => None,
    }
}

fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_timestamp(text),
        Value::Number(number) => number.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::Object(map) => map.get("$date").and_then(as_timestamp),
        _ => None,
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ApplicationRecord {
        ApplicationRecord::new(value)
    }

    #[test]
    fn reads_nested_fields() {
        let application = record(json!({
            "service": {
                "applicationType": { "label": " Radio Station License - New ", "element": "Element 2" },
                "natureOfService": { "type": "CP (Public Correspondence)" },
                "applicationDetails": { "noOfYears": "3" },
                "particulars": [
                    { "stationClass": "FX", "equipments": [{}, {}] },
                    { "stationClass": "ML", "equipments": [{}] },
                ],
            },
            "totalFee": "1,520.75",
            "soa": [
                { "item": "License Fee", "amount": 700 },
                { "item": "Surcharge", "amount": "20.5" },
            ],
            "status": "Approved",
            "type": "ROC",
        }));

        assert_eq!(application.application_label(), Some("Radio Station License - New"));
        assert_eq!(application.element(), Some("Element 2"));
        assert_eq!(application.nature_of_service(), Some("CP (Public Correspondence)"));
        assert_eq!(application.years(), 3);
        assert_eq!(application.equipment_count(), 3);
        assert_eq!(application.particulars()[1].station_class, Some("ML"));
        assert_eq!(application.total_fee(), Amount::from_centavos(152_075));
        assert_eq!(
            application.fee_lines(),
            vec![
                FeeLine::new("License Fee", Amount::from_centavos(70_000)),
                FeeLine::new("Surcharge", Amount::from_centavos(2_050)),
            ]
        );
        assert_eq!(application.status(), Some("Approved"));
        assert_eq!(application.record_type(), Some("ROC"));
    }

    #[test]
    fn mistyped_and_missing_fields_fall_back_to_defaults() {
        let application = record(json!({
            "service": {
                "applicationType": "not an object",
                "applicationDetails": { "noOfYears": -4 },
                "particulars": { "stationClass": "FX" },
            },
            "totalFee": [1, 2],
            "soa": [ "junk", { "amount": "abc" }, { "item": 5, "amount": 10 } ],
            "status": 7,
        }));

        assert_eq!(application.application_label(), None);
        assert_eq!(application.nature_of_service(), None);
        assert_eq!(application.years(), 1);
        assert!(application.particulars().is_empty());
        assert_eq!(application.equipment_count(), 1);
        assert_eq!(application.total_fee(), Amount::ZERO);
        assert_eq!(
            application.fee_lines(),
            vec![
                FeeLine::new("", Amount::ZERO),
                FeeLine::new("", Amount::from_centavos(1_000)),
            ]
        );
        assert_eq!(application.status(), None);
        assert_eq!(application.updated_at(), None);
        assert_eq!(application.evaluator_name(), None);
    }

    #[test]
    fn non_object_records_read_as_empty() {
        let application = record(json!([1, 2, 3]));
        assert!(!application.is_object());
        assert_eq!(application.json_kind(), "array");
        assert_eq!(application.years(), 1);
        assert!(application.fee_lines().is_empty());
    }

    #[test]
    fn timestamps_accept_common_encodings() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date");
        let cases = [
            json!({ "updatedAt": "2026-03-14T08:30:00+08:00" }),
            json!({ "updatedAt": "2026-03-14" }),
            json!({ "updatedAt": { "$date": "2026-03-14T10:00:00Z" } }),
            json!({ "updatedAt": 1_773_482_400_000_i64 }),
            json!({ "updatedAt": null, "createdAt": "2026-03-14T23:59:59Z" }),
        ];

        for case in cases {
            let timestamp = record(case.clone()).updated_at().expect("timestamp parses");
            assert_eq!(timestamp.date_naive(), expected, "{case}");
        }
    }

    #[test]
    fn evaluator_name_joins_present_parts() {
        let application = record(json!({
            "evaluator": { "firstName": "Maria", "middleName": "", "lastName": "Santos", "suffix": "Jr." }
        }));
        assert_eq!(application.evaluator_name().as_deref(), Some("Maria Santos Jr."));
    }

    #[test]
    fn validity_dates_read_from_service() {
        let application = record(json!({
            "service": { "validityStart": "2026-01-01", "validityEnd": "2028-12-31T00:00:00Z" }
        }));
        assert_eq!(application.validity_start(), NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(application.validity_end(), NaiveDate::from_ymd_opt(2028, 12, 31));
    }
}
