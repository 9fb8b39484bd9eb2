use super::fees::Amount;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// Label of the sentinel row that absorbs records without a usable label.
pub const UNKNOWN_ROW: &str = "Unknown";

const BASELINE_CATALOG: &str = include_str!("../../data/catalog.csv");

/// Trims, collapses inner whitespace, strips invisible characters and case-folds.
pub(crate) fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Whether a row counts new licenses or renewals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiveKind {
    New,
    Renewal,
    #[default]
    Unset,
}

impl ReceiveKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Renewal => "Renewal",
            Self::Unset => "Unset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    pub name: String,
    pub count: u64,
    pub total_fee: Amount,
    pub surcharge: Amount,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub row_type: Option<String>,
    pub receive_kind: ReceiveKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<Element>>,
}

impl CatalogRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
            total_fee: Amount::ZERO,
            surcharge: Amount::ZERO,
            row_type: None,
            receive_kind: ReceiveKind::Unset,
            elements: None,
        }
    }

    pub fn with_elements<I, S>(name: impl Into<String>, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements = elements
            .into_iter()
            .map(|element| Element {
                name: element.into(),
                value: 0,
            })
            .collect();
        Self {
            elements: Some(elements),
            ..Self::new(name)
        }
    }

    /// Increments the named element, appending it when the row has not seen it yet.
    pub fn bump_element(&mut self, name: &str) {
        let key = normalize_label(name);
        if key.is_empty() {
            return;
        }

        let elements = self.elements.get_or_insert_with(Vec::new);
        match elements
            .iter_mut()
            .find(|element| normalize_label(&element.name) == key)
        {
            Some(element) => element.value += 1,
            None => elements.push(Element {
                name: name.trim().to_string(),
                value: 1,
            }),
        }
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        let key = normalize_label(name);
        self.elements
            .as_deref()
            .and_then(|elements| elements.iter().find(|e| normalize_label(&e.name) == key))
    }

    /// First writer wins; later values are ignored.
    pub fn set_type_once(&mut self, value: &str) {
        if self.row_type.is_none() && !value.trim().is_empty() {
            self.row_type = Some(value.trim().to_string());
        }
    }

    pub fn set_receive_kind_once(&mut self, kind: ReceiveKind) {
        if self.receive_kind == ReceiveKind::Unset {
            self.receive_kind = kind;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog data: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error while reading catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Insertion-ordered set of report rows keyed by normalized label.
#[derive(Debug, Clone, Default)]
pub struct ReportCatalog {
    rows: Vec<CatalogRow>,
    index: HashMap<String, usize>,
}

impl ReportCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The fixed service-category list every report starts from.
    pub fn baseline() -> Result<Self, CatalogError> {
        Self::from_reader(BASELINE_CATALOG.as_bytes())
    }

    /// Reads `name,elements` CSV rows; elements are `|`-separated.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut catalog = Self::empty();

        for record in csv_reader.deserialize::<CatalogCsvRow>() {
            let row = record?;
            let position = catalog.ensure_row(Some(&row.name));
            if let Some(elements) = row.elements {
                let target = &mut catalog.rows[position];
                if target.elements.is_none() {
                    *target = CatalogRow::with_elements(target.name.clone(), elements);
                }
            }
        }

        catalog.ensure_row(Some(UNKNOWN_ROW));
        Ok(catalog)
    }

    /// Returns the position of the row matching `label`, appending a zeroed row when absent.
    /// Missing or blank labels resolve to the `Unknown` row.
    pub fn ensure_row(&mut self, label: Option<&str>) -> usize {
        let label = label
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(UNKNOWN_ROW);
        let key = normalize_label(label);

        if let Some(position) = self.index.get(&key) {
            return *position;
        }

        let position = self.rows.len();
        self.rows.push(CatalogRow::new(label));
        self.index.insert(key, position);
        position
    }

    pub fn find(&self, label: &str) -> Option<usize> {
        self.index.get(&normalize_label(label)).copied()
    }

    pub fn row(&self, position: usize) -> Option<&CatalogRow> {
        self.rows.get(position)
    }

    pub fn row_mut(&mut self, position: usize) -> Option<&mut CatalogRow> {
        self.rows.get_mut(position)
    }

    pub fn row_named(&self, label: &str) -> Option<&CatalogRow> {
        self.find(label).and_then(|position| self.row(position))
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<CatalogRow> {
        self.rows
    }
}

#[derive(Debug, Deserialize)]
struct CatalogCsvRow {
    name: String,
    #[serde(default, deserialize_with = "split_elements")]
    elements: Option<Vec<String>>,
}

fn split_elements<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let elements: Vec<String> = raw
        .unwrap_or_default()
        .split('|')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    Ok((!elements.is_empty()).then_some(elements))
}
