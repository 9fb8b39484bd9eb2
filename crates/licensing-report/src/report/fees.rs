use super::catalog::normalize_label;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Largest magnitude accepted on a single record field: one hundred billion pesos.
pub const AMOUNT_CEILING: Amount = Amount(10_000_000_000_000);

/// Monetary amount held as integer centavos so rollups stay exact in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_centavos(centavos: i64) -> Self {
        Self(centavos)
    }

    pub const fn centavos(self) -> i64 {
        self.0
    }

    /// Rounds to the nearest centavo; non-finite or out of range input yields `None`.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * 100.0).round();
        if scaled.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self(scaled as i64))
    }

    /// Parses `"1,250.50"`, `"1.5e2"`, `"₱ 300"` or `"PHP 300"` style strings.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let unprefixed = match trimmed.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("php") => &trimmed[3..],
            _ => trimmed,
        };
        let cleaned: String = unprefixed
            .chars()
            .filter(|ch| !ch.is_whitespace() && !matches!(ch, ',' | '₱'))
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        cleaned.parse::<f64>().ok().and_then(Self::from_f64)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn exceeds_ceiling(self) -> bool {
        self.0.unsigned_abs() > AMOUNT_CEILING.0.unsigned_abs()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// One itemized statement-of-account line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeLine {
    pub item: String,
    pub amount: Amount,
}

impl FeeLine {
    pub fn new(item: impl Into<String>, amount: Amount) -> Self {
        Self {
            item: item.into(),
            amount,
        }
    }

    pub fn is_surcharge(&self) -> bool {
        let normalized = normalize_label(&self.item);
        SURCHARGE_ITEMS
            .iter()
            .any(|name| normalize_label(name) == normalized)
    }
}

/// Fee line names whose amounts also accrue to a row's surcharge column.
pub const SURCHARGE_ITEMS: [&str; 3] = ["Surcharge", "SUR - License Fee", "SUR - Spectrum User Fee"];

pub const OTHER_BUCKET: &str = "Other";

/// Baseline fee buckets in report order. `Other` absorbs every unmatched line.
pub const FEE_BUCKETS: [&str; 45] = [
    "Filing Fee",
    "Application Fee",
    "Processing Fee",
    "Purchase Permit Fee",
    "Possess Permit Fee",
    "Construction Permit Fee",
    "License Fee",
    "Spectrum User Fee",
    "Inspection Fee",
    "Modification Fee",
    "Registration Fee",
    "Certificate Fee",
    "Examination Fee",
    "Seminar Fee",
    "Permit Fee",
    "Sell/Transfer Permit Fee",
    "Storage Permit Fee",
    "Dealer Permit Fee",
    "Manufacturer Permit Fee",
    "Service Center Permit Fee",
    "Retailer/Reseller Permit Fee",
    "Import Permit Fee",
    "Export Permit Fee",
    "Duplicate Fee",
    "Type Approval Fee",
    "Type Acceptance Fee",
    "Amateur Station License Fee",
    "Club Station License Fee",
    "Special Permit Fee",
    "Temporary Permit Fee",
    "Radio Operator Certificate Fee",
    "Ship Station License Fee",
    "Frequency Assignment Fee",
    "Supervision and Regulation Fee",
    "Verification and Authentication Fee",
    "Penalty",
    "Fines",
    "Surcharge",
    "SUR - License Fee",
    "SUR - Spectrum User Fee",
    "SUR - Permit Fee",
    "Documentary Stamp Tax",
    "Administrative Fee",
    "Miscellaneous Fee",
    OTHER_BUCKET,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeBucket {
    pub name: String,
    pub value: Amount,
}

/// Ordered fee buckets with case-insensitive name lookup and an `Other` fallback.
#[derive(Debug, Clone)]
pub struct FeeLedger {
    buckets: Vec<FeeBucket>,
    index: HashMap<String, usize>,
    other: usize,
}

impl Default for FeeLedger {
    fn default() -> Self {
        Self::baseline()
    }
}

impl FeeLedger {
    pub fn baseline() -> Self {
        Self::with_buckets(FEE_BUCKETS)
    }

    /// Builds a ledger from `names`, appending `Other` when the list lacks it.
    pub fn with_buckets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buckets = Vec::new();
        let mut index = HashMap::new();
        for name in names {
            let name = name.into();
            let key = normalize_label(&name);
            if key.is_empty() || index.contains_key(&key) {
                continue;
            }
            index.insert(key, buckets.len());
            buckets.push(FeeBucket {
                name,
                value: Amount::ZERO,
            });
        }

        let other_key = normalize_label(OTHER_BUCKET);
        let other = match index.get(&other_key) {
            Some(position) => *position,
            None => {
                index.insert(other_key, buckets.len());
                buckets.push(FeeBucket {
                    name: OTHER_BUCKET.to_string(),
                    value: Amount::ZERO,
                });
                buckets.len() - 1
            }
        };

        Self {
            buckets,
            index,
            other,
        }
    }

    /// Adds the line to its named bucket, or to `Other`. Returns the bucket position.
    pub fn post(&mut self, line: &FeeLine) -> usize {
        let position = self
            .index
            .get(&normalize_label(&line.item))
            .copied()
            .unwrap_or(self.other);
        self.buckets[position].value += line.amount;
        position
    }

    pub fn post_all<'a, I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = &'a FeeLine>,
    {
        for line in lines {
            self.post(line);
        }
    }

    pub fn bucket(&self, name: &str) -> Option<&FeeBucket> {
        self.index
            .get(&normalize_label(name))
            .map(|position| &self.buckets[*position])
    }

    pub fn other(&self) -> &FeeBucket {
        &self.buckets[self.other]
    }

    pub fn buckets(&self) -> &[FeeBucket] {
        &self.buckets
    }

    pub fn total(&self) -> Amount {
        self.buckets.iter().map(|bucket| bucket.value).sum()
    }

    pub fn into_buckets(self) -> Vec<FeeBucket> {
        self.buckets
    }
}

pub fn surcharge_total(lines: &[FeeLine]) -> Amount {
    lines
        .iter()
        .filter(|line| line.is_surcharge())
        .map(|line| line.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pesos(value: i64) -> Amount {
        Amount::from_centavos(value * 100)
    }

    #[test]
    fn unmatched_lines_fold_into_other() {
        let mut ledger = FeeLedger::baseline();
        ledger.post(&FeeLine::new("Surcharge", pesos(50)));
        ledger.post(&FeeLine::new("Unknown Fee", pesos(30)));

        assert_eq!(ledger.bucket("Surcharge").map(|b| b.value), Some(pesos(50)));
        assert_eq!(ledger.other().value, pesos(30));
        let touched = ledger
            .buckets()
            .iter()
            .filter(|bucket| bucket.value != Amount::ZERO)
            .count();
        assert_eq!(touched, 2);
    }

    #[test]
    fn bucket_lookup_ignores_case_and_spacing() {
        let mut ledger = FeeLedger::baseline();
        ledger.post(&FeeLine::new("  license   FEE ", pesos(120)));
        assert_eq!(ledger.bucket("License Fee").map(|b| b.value), Some(pesos(120)));
        assert_eq!(ledger.other().value, Amount::ZERO);
    }

    #[test]
    fn ledger_total_conserves_posted_amounts_in_any_order() {
        let lines = vec![
            FeeLine::new("Filing Fee", Amount::from_centavos(18_050)),
            FeeLine::new("SUR - License Fee", Amount::from_centavos(3_333)),
            FeeLine::new("Mystery", Amount::from_centavos(1)),
            FeeLine::new("", Amount::from_centavos(999)),
            FeeLine::new("Documentary Stamp Tax", Amount::from_centavos(3_000)),
        ];
        let expected: Amount = lines.iter().map(|line| line.amount).sum();

        let mut forward = FeeLedger::baseline();
        forward.post_all(&lines);
        let mut backward = FeeLedger::baseline();
        backward.post_all(lines.iter().rev());

        assert_eq!(forward.total(), expected);
        assert_eq!(forward.buckets(), backward.buckets());
    }

    #[test]
    fn custom_bucket_list_always_has_other() {
        let ledger = FeeLedger::with_buckets(["License Fee", "license fee"]);
        assert_eq!(ledger.buckets().len(), 2);
        assert_eq!(ledger.other().name, OTHER_BUCKET);
    }

    #[test]
    fn surcharge_total_only_counts_surcharge_items() {
        let lines = vec![
            FeeLine::new("Surcharge", pesos(10)),
            FeeLine::new("sur - spectrum user fee", pesos(5)),
            FeeLine::new("Spectrum User Fee", pesos(100)),
        ];
        assert_eq!(surcharge_total(&lines), pesos(15));
    }

    #[test]
    fn amount_parsing_and_display() {
        assert_eq!(Amount::parse("1,250.50"), Some(Amount::from_centavos(125_050)));
        assert_eq!(Amount::parse("abc"), None);
        assert_eq!(Amount::parse("1e3"), Some(Amount::from_centavos(100_000)));
        assert_eq!(Amount::parse("1.5e2"), Some(Amount::from_centavos(15_000)));
        assert_eq!(Amount::parse("₱ 300"), Some(pesos(300)));
        assert_eq!(Amount::parse("php 1,000.25"), Some(Amount::from_centavos(100_025)));
        assert_eq!(Amount::parse("1e400"), None);
        assert_eq!(Amount::parse("12-34"), None);
        assert_eq!(Amount::from_f64(0.1 + 0.2), Some(Amount::from_centavos(30)));
        assert_eq!(Amount::from_f64(f64::NAN), None);
        assert_eq!(Amount::from_centavos(-505).to_string(), "-5.05");
        assert_eq!(pesos(1200).to_string(), "1200.00");
    }

    #[test]
    fn ceiling_bounds_single_amounts() {
        assert!(!AMOUNT_CEILING.exceeds_ceiling());
        assert!(Amount::from_centavos(AMOUNT_CEILING.centavos() + 1).exceeds_ceiling());
        assert!(Amount::from_centavos(-AMOUNT_CEILING.centavos() - 1).exceeds_ceiling());
        assert!(!pesos(2_500_000).exceeds_ceiling());
    }

    #[test]
    fn fee_bucket_names_are_unique() {
        let ledger = FeeLedger::baseline();
        assert_eq!(ledger.buckets().len(), FEE_BUCKETS.len());
    }
}
