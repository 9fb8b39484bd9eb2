//! Rule tables mapping an application's service family, nature of service and
//! per-particular station class onto the catalog rows that count it.
//!
//! The table is plain data: every `(family, nature, station class)` key names a
//! new-license row and its renewal sibling. Keys that do not parse never match,
//! so such particulars contribute nothing.

use super::catalog::{normalize_label, ReceiveKind};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFamily {
    Microwave,
    Vsat,
    Wdn,
    Generic,
}

impl ServiceFamily {
    pub const fn ordered() -> [Self; 4] {
        [Self::Microwave, Self::Vsat, Self::Wdn, Self::Generic]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Microwave => "Microwave",
            Self::Vsat => "VSAT",
            Self::Wdn => "WDN",
            Self::Generic => "Radio Station License",
        }
    }

    /// Picks the first family whose marker occurs in the service label.
    /// `Generic` only fires for plain radio station license labels.
    pub fn detect(service_label: &str) -> Option<Self> {
        let normalized = normalize_label(service_label);
        Self::ordered()
            .into_iter()
            .find(|family| normalized.contains(family.marker()))
    }

    const fn marker(self) -> &'static str {
        match self {
            Self::Microwave => "microwave",
            Self::Vsat => "vsat",
            Self::Wdn => "wdn",
            Self::Generic => "radio station license",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NatureOfService {
    PublicCorrespondence,
    Private,
    Government,
}

impl NatureOfService {
    pub const fn code(self) -> &'static str {
        match self {
            Self::PublicCorrespondence => "CP",
            Self::Private => "CV",
            Self::Government => "CO",
        }
    }

    /// Accepts `"CP (Public Correspondence)"`, a bare code, or the long name alone.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_label(raw);
        let code = normalized
            .split(|ch: char| ch.is_whitespace() || ch == '(' || ch == '-')
            .next()
            .unwrap_or_default();

        match code {
            "cp" => return Some(Self::PublicCorrespondence),
            "cv" => return Some(Self::Private),
            "co" => return Some(Self::Government),
            _ => {}
        }

        if normalized.contains("public correspondence") {
            Some(Self::PublicCorrespondence)
        } else if normalized.contains("private") {
            Some(Self::Private)
        } else if normalized.contains("government") {
            Some(Self::Government)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StationClass {
    Portable,
    LandMobile,
    Fixed,
    LandBase,
    FixedLandBase,
    Repeater,
}

impl StationClass {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Portable,
            Self::LandMobile,
            Self::Fixed,
            Self::LandBase,
            Self::FixedLandBase,
            Self::Repeater,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Portable => "P",
            Self::LandMobile => "ML",
            Self::Fixed => "FX",
            Self::LandBase => "FB",
            Self::FixedLandBase => "FX-FB",
            Self::Repeater => "RT",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let compact: String = raw
            .trim()
            .to_ascii_uppercase()
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| if ch == '/' { '-' } else { ch })
            .collect();

        match compact.as_str() {
            "P" => Some(Self::Portable),
            "ML" => Some(Self::LandMobile),
            "FX" => Some(Self::Fixed),
            "FB" => Some(Self::LandBase),
            "FX-FB" | "FXFB" => Some(Self::FixedLandBase),
            "RT" => Some(Self::Repeater),
            _ => None,
        }
    }
}

/// The two catalog rows a rule can count into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPair {
    pub new: &'static str,
    pub renewal: &'static str,
}

impl LabelPair {
    pub const fn pick(&self, kind: ReceiveKind) -> Option<&'static str> {
        match kind {
            ReceiveKind::New => Some(self.new),
            ReceiveKind::Renewal => Some(self.renewal),
            ReceiveKind::Unset => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuleEntry {
    pub family: ServiceFamily,
    pub nature: NatureOfService,
    pub station_class: StationClass,
    pub labels: LabelPair,
}

const fn rule(
    family: ServiceFamily,
    nature: NatureOfService,
    station_class: StationClass,
    new: &'static str,
    renewal: &'static str,
) -> RuleEntry {
    RuleEntry {
        family,
        nature,
        station_class,
        labels: LabelPair { new, renewal },
    }
}

type RuleKey = (ServiceFamily, NatureOfService, StationClass);

static RULE_INDEX: OnceLock<HashMap<RuleKey, LabelPair>> = OnceLock::new();

pub fn rule_table() -> &'static [RuleEntry] {
    use NatureOfService::*;
    use ServiceFamily::*;
    use StationClass::*;

    // Private and Government share rows outside the generic family.
    #[rustfmt::skip]
    static RULES: [RuleEntry; 72] = [
    // Radio Station License
    rule(Generic, PublicCorrespondence, Portable, "Radio Station License - Portable CP (NEW)", "Radio Station License - Portable CP (RENEWAL)"),
    rule(Generic, PublicCorrespondence, LandMobile, "Radio Station License - Land Mobile CP (NEW)", "Radio Station License - Land Mobile CP (RENEWAL)"),
    rule(Generic, PublicCorrespondence, Fixed, "Radio Station License - Fixed CP (NEW)", "Radio Station License - Fixed CP (RENEWAL)"),
    rule(Generic, PublicCorrespondence, LandBase, "Radio Station License - Land Base CP (NEW)", "Radio Station License - Land Base CP (RENEWAL)"),
    rule(Generic, PublicCorrespondence, FixedLandBase, "Radio Station License - Fixed and Land Base CP (NEW)", "Radio Station License - Fixed and Land Base CP (RENEWAL)"),
    rule(Generic, PublicCorrespondence, Repeater, "Radio Station License - Repeater CP (NEW)", "Radio Station License - Repeater CP (RENEWAL)"),
    rule(Generic, Private, Portable, "Radio Station License - Portable CV (NEW)", "Radio Station License - Portable CV (RENEWAL)"),
    rule(Generic, Private, LandMobile, "Radio Station License - Land Mobile CV (NEW)", "Radio Station License - Land Mobile CV (RENEWAL)"),
    rule(Generic, Private, Fixed, "Radio Station License - Fixed CV (NEW)", "Radio Station License - Fixed CV (RENEWAL)"),
    rule(Generic, Private, LandBase, "Radio Station License - Land Base CV (NEW)", "Radio Station License - Land Base CV (RENEWAL)"),
    rule(Generic, Private, FixedLandBase, "Radio Station License - Fixed and Land Base CV (NEW)", "Radio Station License - Fixed and Land Base CV (RENEWAL)"),
    rule(Generic, Private, Repeater, "Radio Station License - Repeater CV (NEW)", "Radio Station License - Repeater CV (RENEWAL)"),
    rule(Generic, Government, Portable, "Radio Station License - Portable CO (NEW)", "Radio Station License - Portable CO (RENEWAL)"),
    rule(Generic, Government, LandMobile, "Radio Station License - Land Mobile CO (NEW)", "Radio Station License - Land Mobile CO (RENEWAL)"),
    rule(Generic, Government, Fixed, "Radio Station License - Fixed CO (NEW)", "Radio Station License - Fixed CO (RENEWAL)"),
    rule(Generic, Government, LandBase, "Radio Station License - Land Base CO (NEW)", "Radio Station License - Land Base CO (RENEWAL)"),
    rule(Generic, Government, FixedLandBase, "Radio Station License - Fixed and Land Base CO (NEW)", "Radio Station License - Fixed and Land Base CO (RENEWAL)"),
    rule(Generic, Government, Repeater, "Radio Station License - Repeater CO (NEW)", "Radio Station License - Repeater CO (RENEWAL)"),
    // Microwave Radio Station License
    rule(Microwave, PublicCorrespondence, Portable, "Microwave Radio Station License - Portable CP (NEW)", "Microwave Radio Station License - Portable CP (RENEWAL)"),
    rule(Microwave, PublicCorrespondence, LandMobile, "Microwave Radio Station License - Land Mobile CP (NEW)", "Microwave Radio Station License - Land Mobile CP (RENEWAL)"),
    rule(Microwave, PublicCorrespondence, Fixed, "Microwave Radio Station License - Fixed CP (NEW)", "Microwave Radio Station License - Fixed CP (RENEWAL)"),
    rule(Microwave, PublicCorrespondence, LandBase, "Microwave Radio Station License - Land Base CP (NEW)", "Microwave Radio Station License - Land Base CP (RENEWAL)"),
    rule(Microwave, PublicCorrespondence, FixedLandBase, "Microwave Radio Station License - Fixed and Land Base CP (NEW)", "Microwave Radio Station License - Fixed and Land Base CP (RENEWAL)"),
    rule(Microwave, PublicCorrespondence, Repeater, "Microwave Radio Station License - Repeater CP (NEW)", "Microwave Radio Station License - Repeater CP (RENEWAL)"),
    rule(Microwave, Private, Portable, "Microwave Radio Station License - Portable CV/CO (NEW)", "Microwave Radio Station License - Portable CV/CO (RENEWAL)"),
    rule(Microwave, Private, LandMobile, "Microwave Radio Station License - Land Mobile CV/CO (NEW)", "Microwave Radio Station License - Land Mobile CV/CO (RENEWAL)"),
    rule(Microwave, Private, Fixed, "Microwave Radio Station License - Fixed CV/CO (NEW)", "Microwave Radio Station License - Fixed CV/CO (RENEWAL)"),
    rule(Microwave, Private, LandBase, "Microwave Radio Station License - Land Base CV/CO (NEW)", "Microwave Radio Station License - Land Base CV/CO (RENEWAL)"),
    rule(Microwave, Private, FixedLandBase, "Microwave Radio Station License - Fixed and Land Base CV/CO (NEW)", "Microwave Radio Station License - Fixed and Land Base CV/CO (RENEWAL)"),
    rule(Microwave, Private, Repeater, "Microwave Radio Station License - Repeater CV/CO (NEW)", "Microwave Radio Station License - Repeater CV/CO (RENEWAL)"),
    rule(Microwave, Government, Portable, "Microwave Radio Station License - Portable CV/CO (NEW)", "Microwave Radio Station License - Portable CV/CO (RENEWAL)"),
    rule(Microwave, Government, LandMobile, "Microwave Radio Station License - Land Mobile CV/CO (NEW)", "Microwave Radio Station License - Land Mobile CV/CO (RENEWAL)"),
    rule(Microwave, Government, Fixed, "Microwave Radio Station License - Fixed CV/CO (NEW)", "Microwave Radio Station License - Fixed CV/CO (RENEWAL)"),
    rule(Microwave, Government, LandBase, "Microwave Radio Station License - Land Base CV/CO (NEW)", "Microwave Radio Station License - Land Base CV/CO (RENEWAL)"),
    rule(Microwave, Government, FixedLandBase, "Microwave Radio Station License - Fixed and Land Base CV/CO (NEW)", "Microwave Radio Station License - Fixed and Land Base CV/CO (RENEWAL)"),
    rule(Microwave, Government, Repeater, "Microwave Radio Station License - Repeater CV/CO (NEW)", "Microwave Radio Station License - Repeater CV/CO (RENEWAL)"),
    // VSAT Radio Station License
    rule(Vsat, PublicCorrespondence, Portable, "VSAT Radio Station License - Portable CP (NEW)", "VSAT Radio Station License - Portable CP (RENEWAL)"),
    rule(Vsat, PublicCorrespondence, LandMobile, "VSAT Radio Station License - Land Mobile CP (NEW)", "VSAT Radio Station License - Land Mobile CP (RENEWAL)"),
    rule(Vsat, PublicCorrespondence, Fixed, "VSAT Radio Station License - Fixed CP (NEW)", "VSAT Radio Station License - Fixed CP (RENEWAL)"),
    rule(Vsat, PublicCorrespondence, LandBase, "VSAT Radio Station License - Land Base CP (NEW)", "VSAT Radio Station License - Land Base CP (RENEWAL)"),
    rule(Vsat, PublicCorrespondence, FixedLandBase, "VSAT Radio Station License - Fixed and Land Base CP (NEW)", "VSAT Radio Station License - Fixed and Land Base CP (RENEWAL)"),
    rule(Vsat, PublicCorrespondence, Repeater, "VSAT Radio Station License - Repeater CP (NEW)", "VSAT Radio Station License - Repeater CP (RENEWAL)"),
    rule(Vsat, Private, Portable, "VSAT Radio Station License - Portable CV/CO (NEW)", "VSAT Radio Station License - Portable CV/CO (RENEWAL)"),
    rule(Vsat, Private, LandMobile, "VSAT Radio Station License - Land Mobile CV/CO (NEW)", "VSAT Radio Station License - Land Mobile CV/CO (RENEWAL)"),
    rule(Vsat, Private, Fixed, "VSAT Radio Station License - Fixed CV/CO (NEW)", "VSAT Radio Station License - Fixed CV/CO (RENEWAL)"),
    rule(Vsat, Private, LandBase, "VSAT Radio Station License - Land Base CV/CO (NEW)", "VSAT Radio Station License - Land Base CV/CO (RENEWAL)"),
    rule(Vsat, Private, FixedLandBase, "VSAT Radio Station License - Fixed and Land Base CV/CO (NEW)", "VSAT Radio Station License - Fixed and Land Base CV/CO (RENEWAL)"),
    rule(Vsat, Private, Repeater, "VSAT Radio Station License - Repeater CV/CO (NEW)", "VSAT Radio Station License - Repeater CV/CO (RENEWAL)"),
    rule(Vsat, Government, Portable, "VSAT Radio Station License - Portable CV/CO (NEW)", "VSAT Radio Station License - Portable CV/CO (RENEWAL)"),
    rule(Vsat, Government, LandMobile, "VSAT Radio Station License - Land Mobile CV/CO (NEW)", "VSAT Radio Station License - Land Mobile CV/CO (RENEWAL)"),
    rule(Vsat, Government, Fixed, "VSAT Radio Station License - Fixed CV/CO (NEW)", "VSAT Radio Station License - Fixed CV/CO (RENEWAL)"),
    rule(Vsat, Government, LandBase, "VSAT Radio Station License - Land Base CV/CO (NEW)", "VSAT Radio Station License - Land Base CV/CO (RENEWAL)"),
    rule(Vsat, Government, FixedLandBase, "VSAT Radio Station License - Fixed and Land Base CV/CO (NEW)", "VSAT Radio Station License - Fixed and Land Base CV/CO (RENEWAL)"),
    rule(Vsat, Government, Repeater, "VSAT Radio Station License - Repeater CV/CO (NEW)", "VSAT Radio Station License - Repeater CV/CO (RENEWAL)"),
    // WDN Radio Station License
    rule(Wdn, PublicCorrespondence, Portable, "WDN Radio Station License - Portable CP (NEW)", "WDN Radio Station License - Portable CP (RENEWAL)"),
    rule(Wdn, PublicCorrespondence, LandMobile, "WDN Radio Station License - Land Mobile CP (NEW)", "WDN Radio Station License - Land Mobile CP (RENEWAL)"),
    rule(Wdn, PublicCorrespondence, Fixed, "WDN Radio Station License - Fixed CP (NEW)", "WDN Radio Station License - Fixed CP (RENEWAL)"),
    rule(Wdn, PublicCorrespondence, LandBase, "WDN Radio Station License - Land Base CP (NEW)", "WDN Radio Station License - Land Base CP (RENEWAL)"),
    rule(Wdn, PublicCorrespondence, FixedLandBase, "WDN Radio Station License - Fixed and Land Base CP (NEW)", "WDN Radio Station License - Fixed and Land Base CP (RENEWAL)"),
    rule(Wdn, PublicCorrespondence, Repeater, "WDN Radio Station License - Repeater CP (NEW)", "WDN Radio Station License - Repeater CP (RENEWAL)"),
    rule(Wdn, Private, Portable, "WDN Radio Station License - Portable CV/CO (NEW)", "WDN Radio Station License - Portable CV/CO (RENEWAL)"),
    rule(Wdn, Private, LandMobile, "WDN Radio Station License - Land Mobile CV/CO (NEW)", "WDN Radio Station License - Land Mobile CV/CO (RENEWAL)"),
    rule(Wdn, Private, Fixed, "WDN Radio Station License - Fixed CV/CO (NEW)", "WDN Radio Station License - Fixed CV/CO (RENEWAL)"),
    rule(Wdn, Private, LandBase, "WDN Radio Station License - Land Base CV/CO (NEW)", "WDN Radio Station License - Land Base CV/CO (RENEWAL)"),
    rule(Wdn, Private, FixedLandBase, "WDN Radio Station License - Fixed and Land Base CV/CO (NEW)", "WDN Radio Station License - Fixed and Land Base CV/CO (RENEWAL)"),
    rule(Wdn, Private, Repeater, "WDN Radio Station License - Repeater CV/CO (NEW)", "WDN Radio Station License - Repeater CV/CO (RENEWAL)"),
    rule(Wdn, Government, Portable, "WDN Radio Station License - Portable CV/CO (NEW)", "WDN Radio Station License - Portable CV/CO (RENEWAL)"),
    rule(Wdn, Government, LandMobile, "WDN Radio Station License - Land Mobile CV/CO (NEW)", "WDN Radio Station License - Land Mobile CV/CO (RENEWAL)"),
    rule(Wdn, Government, Fixed, "WDN Radio Station License - Fixed CV/CO (NEW)", "WDN Radio Station License - Fixed CV/CO (RENEWAL)"),
    rule(Wdn, Government, LandBase, "WDN Radio Station License - Land Base CV/CO (NEW)", "WDN Radio Station License - Land Base CV/CO (RENEWAL)"),
    rule(Wdn, Government, FixedLandBase, "WDN Radio Station License - Fixed and Land Base CV/CO (NEW)", "WDN Radio Station License - Fixed and Land Base CV/CO (RENEWAL)"),
    rule(Wdn, Government, Repeater, "WDN Radio Station License - Repeater CV/CO (NEW)", "WDN Radio Station License - Repeater CV/CO (RENEWAL)"),
    ];

    &RULES
}

/// Looks up the rows for a fully-resolved key.
pub fn labels_for(
    family: ServiceFamily,
    nature: NatureOfService,
    station_class: StationClass,
) -> Option<LabelPair> {
    RULE_INDEX
        .get_or_init(|| {
            rule_table()
                .iter()
                .map(|entry| {
                    (
                        (entry.family, entry.nature, entry.station_class),
                        entry.labels,
                    )
                })
                .collect()
        })
        .get(&(family, nature, station_class))
        .copied()
}

/// New vs. renewal for an application, from its top-level label.
/// "renewal" is checked first because it contains "new"; modifications count as renewals.
pub fn receive_kind(application_label: &str) -> ReceiveKind {
    let normalized = normalize_label(application_label);
    if normalized.contains("renewal") || normalized.contains("modification") {
        ReceiveKind::Renewal
    } else if normalized.contains("new") {
        ReceiveKind::New
    } else {
        ReceiveKind::Unset
    }
}

/// Application-wide inputs the per-particular rules need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationContext {
    pub family: ServiceFamily,
    pub nature: NatureOfService,
    pub kind: ReceiveKind,
}

impl ClassificationContext {
    pub fn resolve(
        application_label: Option<&str>,
        nature_of_service: Option<&str>,
    ) -> Result<Self, SkipReason> {
        let label = application_label.ok_or(SkipReason::NoFamily)?;
        let family = ServiceFamily::detect(label).ok_or(SkipReason::NoFamily)?;
        let nature = nature_of_service
            .and_then(NatureOfService::parse)
            .ok_or(SkipReason::UnknownNature)?;
        Ok(Self {
            family,
            nature,
            kind: receive_kind(label),
        })
    }

    /// Row label for one particular's station class.
    pub fn target_label(&self, station_class: Option<&str>) -> Result<&'static str, SkipReason> {
        let station_class = station_class
            .and_then(StationClass::parse)
            .ok_or(SkipReason::UnknownStationClass)?;
        let pair = labels_for(self.family, self.nature, station_class)
            .ok_or(SkipReason::NoRule)?;
        pair.pick(self.kind).ok_or(SkipReason::UnsetReceiveKind)
    }
}

/// Why a particular did not contribute to any classified row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoFamily,
    UnknownNature,
    UnknownStationClass,
    UnsetReceiveKind,
    NoRule,
}

impl SkipReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoFamily => "no service family",
            Self::UnknownNature => "unknown nature of service",
            Self::UnknownStationClass => "unknown station class",
            Self::UnsetReceiveKind => "receive kind not set",
            Self::NoRule => "no rule for key",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::catalog::ReportCatalog;
    use std::collections::HashSet;

    const NATURES: [NatureOfService; 3] = [
        NatureOfService::PublicCorrespondence,
        NatureOfService::Private,
        NatureOfService::Government,
    ];

    #[test]
    fn every_key_has_exactly_one_rule() {
        let keys: HashSet<RuleKey> = rule_table()
            .iter()
            .map(|entry| (entry.family, entry.nature, entry.station_class))
            .collect();
        assert_eq!(keys.len(), 72);

        for family in ServiceFamily::ordered() {
            for nature in NATURES {
                for class in StationClass::ordered() {
                    let pair = labels_for(family, nature, class).expect("rule present");
                    assert_ne!(pair.new, pair.renewal);
                    assert!(pair.new.ends_with("(NEW)"));
                    assert!(pair.renewal.ends_with("(RENEWAL)"));
                }
            }
        }
    }

    #[test]
    fn every_rule_label_is_a_baseline_row() {
        let catalog = ReportCatalog::baseline().expect("baseline catalog parses");
        for entry in rule_table() {
            assert!(catalog.find(entry.labels.new).is_some(), "{}", entry.labels.new);
            assert!(
                catalog.find(entry.labels.renewal).is_some(),
                "{}",
                entry.labels.renewal
            );
        }
    }

    #[test]
    fn private_and_government_share_rows_outside_generic() {
        for class in StationClass::ordered() {
            let generic_cv = labels_for(ServiceFamily::Generic, NatureOfService::Private, class);
            let generic_co =
                labels_for(ServiceFamily::Generic, NatureOfService::Government, class);
            assert_ne!(generic_cv, generic_co);

            let vsat_cv = labels_for(ServiceFamily::Vsat, NatureOfService::Private, class);
            let vsat_co = labels_for(ServiceFamily::Vsat, NatureOfService::Government, class);
            assert_eq!(vsat_cv, vsat_co);
        }
    }

    #[test]
    fn family_detection_checks_in_priority_order() {
        assert_eq!(
            ServiceFamily::detect("Microwave VSAT Radio Station License - New"),
            Some(ServiceFamily::Microwave)
        );
        assert_eq!(
            ServiceFamily::detect("vsat radio station license"),
            Some(ServiceFamily::Vsat)
        );
        assert_eq!(
            ServiceFamily::detect("WDN Radio Station License (Renewal)"),
            Some(ServiceFamily::Wdn)
        );
        assert_eq!(
            ServiceFamily::detect("Radio Station License - New"),
            Some(ServiceFamily::Generic)
        );
        assert_eq!(ServiceFamily::detect("Permit to Purchase"), None);
    }

    #[test]
    fn nature_parsing_accepts_codes_and_names() {
        assert_eq!(
            NatureOfService::parse("CP (Public Correspondence)"),
            Some(NatureOfService::PublicCorrespondence)
        );
        assert_eq!(NatureOfService::parse("cv"), Some(NatureOfService::Private));
        assert_eq!(
            NatureOfService::parse("CO - Government"),
            Some(NatureOfService::Government)
        );
        assert_eq!(
            NatureOfService::parse("Private"),
            Some(NatureOfService::Private)
        );
        assert_eq!(NatureOfService::parse("Commercial"), None);
    }

    #[test]
    fn station_class_parsing() {
        assert_eq!(StationClass::parse(" fx "), Some(StationClass::Fixed));
        assert_eq!(StationClass::parse("FX/FB"), Some(StationClass::FixedLandBase));
        assert_eq!(StationClass::parse("FX - FB"), Some(StationClass::FixedLandBase));
        assert_eq!(StationClass::parse("ML"), Some(StationClass::LandMobile));
        assert_eq!(StationClass::parse("XX"), None);
        for class in StationClass::ordered() {
            assert_eq!(StationClass::parse(class.code()), Some(class));
        }
    }

    #[test]
    fn receive_kind_prefers_renewal_over_new() {
        assert_eq!(receive_kind("Radio Station License - Renewal"), ReceiveKind::Renewal);
        assert_eq!(receive_kind("Radio Station License - NEW"), ReceiveKind::New);
        assert_eq!(
            receive_kind("Radio Station License - Modification"),
            ReceiveKind::Renewal
        );
        assert_eq!(receive_kind("Radio Station License"), ReceiveKind::Unset);
    }

    #[test]
    fn fixed_cp_generic_picks_new_or_renewal_row() {
        let mut context = ClassificationContext::resolve(
            Some("Radio Station License - New"),
            Some("CP (Public Correspondence)"),
        )
        .expect("context resolves");
        assert_eq!(
            context.target_label(Some("FX")),
            Ok("Radio Station License - Fixed CP (NEW)")
        );

        context.kind = ReceiveKind::Renewal;
        assert_eq!(
            context.target_label(Some("FX")),
            Ok("Radio Station License - Fixed CP (RENEWAL)")
        );

        context.kind = ReceiveKind::Unset;
        assert_eq!(
            context.target_label(Some("FX")),
            Err(SkipReason::UnsetReceiveKind)
        );
    }

    #[test]
    fn unresolvable_keys_are_skipped() {
        assert_eq!(
            ClassificationContext::resolve(Some("Permit to Purchase - New"), Some("CP")),
            Err(SkipReason::NoFamily)
        );
        assert_eq!(
            ClassificationContext::resolve(Some("Radio Station License - New"), None),
            Err(SkipReason::UnknownNature)
        );
        let context = ClassificationContext::resolve(Some("VSAT - New"), Some("CO"))
            .expect("context resolves");
        assert_eq!(
            context.target_label(Some("Z")),
            Err(SkipReason::UnknownStationClass)
        );
        assert_eq!(
            context.target_label(Some("RT")),
            Ok("VSAT Radio Station License - Repeater CV/CO (NEW)")
        );
    }
}
