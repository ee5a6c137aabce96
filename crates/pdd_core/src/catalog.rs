//! Declarative catalog of wizard steps and their fields.
//!
//! Declaring a field here never writes anything: the UI builds its forms from
//! these specs, collects raw text, and hands it to
//! [`Session::submit_section`](crate::Session::submit_section) which parses
//! and commits in one go.

use std::path::Path;

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::errors::InputError;
use crate::inputs::{self, keys};
use crate::store::{FormStore, FormValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display)]
pub enum Section {
    #[strum(to_string = "Project details")]
    Project,
    #[strum(to_string = "Project identification")]
    Identification,
    #[strum(to_string = "Project description")]
    Description,
    #[strum(to_string = "Baseline scenario")]
    Baseline,
    #[strum(to_string = "Additionality")]
    Additionality,
    #[strum(to_string = "Monitoring plan")]
    Monitoring,
    #[strum(to_string = "Grouped project")]
    Grouping,
}

/// Input widget family of a field, with its declared constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    /// Free numeric input with a lower bound.
    Number { min: f64, max: Option<f64>, step: f64 },
    /// Whole number in an inclusive range.
    Integer { min: i64, max: i64 },
    /// Whole number picked by stepping through an inclusive range.
    Slider { min: i64, max: i64, step: i64 },
    Choice { options: &'static [&'static str] },
    /// Path of a local file read into memory on submit.
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub help: Option<&'static str>,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required: false,
        default: None,
        help: None,
    }
}

impl FieldSpec {
    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    const fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Parse raw form text into a store value.
    ///
    /// `Ok(None)` means an optional field was left blank and nothing is
    /// committed. Upload fields only have their path checked here; reading
    /// the file happens on submit.
    pub fn parse(&self, raw: &str) -> Result<Option<FormValue>, InputError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return if self.required {
                Err(InputError::Empty { field: self.label })
            } else {
                Ok(None)
            };
        }

        let value = match self.kind {
            FieldKind::Text => FormValue::Text(raw.to_string()),
            FieldKind::Number { min, max, .. } => {
                let v: f64 = raw.parse().map_err(|_| InputError::InvalidNumber {
                    field: self.label,
                    raw: raw.to_string(),
                })?;
                if !v.is_finite() {
                    return Err(InputError::InvalidNumber {
                        field: self.label,
                        raw: raw.to_string(),
                    });
                }
                let upper = max.unwrap_or(f64::INFINITY);
                if v < min || v > upper {
                    return Err(InputError::OutOfRange {
                        field: self.label,
                        value: v,
                        min,
                        max: upper,
                    });
                }
                FormValue::Float(v)
            }
            FieldKind::Integer { min, max } | FieldKind::Slider { min, max, .. } => {
                let v: i64 = raw.parse().map_err(|_| InputError::InvalidNumber {
                    field: self.label,
                    raw: raw.to_string(),
                })?;
                if v < min || v > max {
                    return Err(InputError::OutOfRange {
                        field: self.label,
                        value: v as f64,
                        min: min as f64,
                        max: max as f64,
                    });
                }
                FormValue::Int(v)
            }
            FieldKind::Choice { options } => {
                let chosen = options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(raw))
                    .ok_or(InputError::UnknownOption {
                        field: self.label,
                        options,
                    })?;
                FormValue::Choice((*chosen).to_string())
            }
            FieldKind::Upload => {
                if !Path::new(raw).is_file() {
                    return Err(InputError::MissingFile {
                        field: self.label,
                        path: raw.to_string(),
                    });
                }
                FormValue::Text(raw.to_string())
            }
        };
        Ok(Some(value))
    }

    pub fn is_upload(&self) -> bool {
        matches!(self.kind, FieldKind::Upload)
    }
}

pub const SPECIES_OPTIONS: &[&str] = &["Neem", "Bamboo", "Teak", "Poplar"];

const PROJECT_FIELDS: &[FieldSpec] = &[
    field(keys::DEVELOPER_NAME, "Project developer name", FieldKind::Text),
    field(keys::LOCATION, "Project location (district/state)", FieldKind::Text),
    field(
        keys::LAND_AREA,
        "Total land area (hectares)",
        FieldKind::Number {
            min: inputs::LAND_AREA_MIN,
            max: None,
            step: inputs::LAND_AREA_STEP,
        },
    )
    .required()
    .default_value("0.1"),
    field(
        keys::TREE_DENSITY,
        "Tree density (trees per hectare)",
        FieldKind::Slider {
            min: 100,
            max: 1000,
            step: 50,
        },
    )
    .required()
    .default_value("400"),
    field(
        keys::START_YEAR,
        "Start year of project",
        FieldKind::Integer {
            min: 2020,
            max: 2100,
        },
    )
    .required()
    .default_value("2025"),
    field(
        keys::DURATION,
        "Duration (years)",
        FieldKind::Slider {
            min: 5,
            max: 40,
            step: 1,
        },
    )
    .required()
    .default_value("20"),
    field(
        keys::SPECIES,
        "Dominant tree species",
        FieldKind::Choice {
            options: SPECIES_OPTIONS,
        },
    )
    .required()
    .default_value("Neem"),
];

const IDENTIFICATION_FIELDS: &[FieldSpec] = &[
    field("identification.project_title", "Project title", FieldKind::Text).required(),
    field(
        "identification.proponent",
        "Project proponent (organisation)",
        FieldKind::Text,
    )
    .required(),
    field("identification.contact_email", "Contact e-mail", FieldKind::Text),
    field(
        "identification.methodology",
        "Applied methodology",
        FieldKind::Choice {
            options: &["VM0047 (ARR)", "AR-ACM0003", "Other"],
        },
    )
    .required()
    .default_value("VM0047 (ARR)"),
    field(
        "identification.registry_status",
        "Registry status",
        FieldKind::Choice {
            options: &["Not yet listed", "Under development", "Listed"],
        },
    )
    .default_value("Not yet listed"),
];

const DESCRIPTION_FIELDS: &[FieldSpec] = &[
    field("description.summary", "Project summary", FieldKind::Text)
        .required()
        .help("Two or three sentences on what the project does"),
    field("description.activities", "Planting activities", FieldKind::Text).required(),
    field(
        "description.land_tenure",
        "Land tenure",
        FieldKind::Choice {
            options: &[
                "Private ownership",
                "Lease",
                "Community land",
                "Government land",
            ],
        },
    )
    .required()
    .default_value("Private ownership"),
    field("description.site_map", "Site map (file path)", FieldKind::Upload)
        .help("Optional image or PDF of the project boundary"),
];

const BASELINE_FIELDS: &[FieldSpec] = &[
    field(
        "baseline.land_use",
        "Current land use",
        FieldKind::Choice {
            options: &["Cropland", "Grassland", "Degraded land", "Fallow"],
        },
    )
    .required()
    .default_value("Cropland"),
    field("baseline.scenario", "Baseline scenario", FieldKind::Text)
        .required()
        .help("What would happen on the land without the project"),
    field(
        "baseline.existing_tree_cover_pct",
        "Existing tree cover (%)",
        FieldKind::Integer { min: 0, max: 100 },
    )
    .default_value("0"),
];

const ADDITIONALITY_FIELDS: &[FieldSpec] = &[
    field(
        "additionality.barrier",
        "Main barrier",
        FieldKind::Choice {
            options: &[
                "Financial",
                "Technological",
                "Institutional",
                "None identified",
            ],
        },
    )
    .required()
    .default_value("Financial"),
    field(
        "additionality.justification",
        "Additionality justification",
        FieldKind::Text,
    )
    .required(),
    field(
        "additionality.common_practice",
        "Common practice analysis",
        FieldKind::Text,
    ),
];

const MONITORING_FIELDS: &[FieldSpec] = &[
    field(
        "monitoring.method",
        "Monitoring method",
        FieldKind::Choice {
            options: &["Field sample plots", "Remote sensing", "Hybrid"],
        },
    )
    .required()
    .default_value("Field sample plots"),
    field(
        "monitoring.frequency_years",
        "Verification interval (years)",
        FieldKind::Slider {
            min: 1,
            max: 10,
            step: 1,
        },
    )
    .required()
    .default_value("5"),
    field(
        "monitoring.responsible_party",
        "Responsible party",
        FieldKind::Text,
    )
    .required(),
    field(
        "monitoring.plan_document",
        "Monitoring plan (file path)",
        FieldKind::Upload,
    ),
];

const GROUPING_FIELDS: &[FieldSpec] = &[
    field(
        "grouping.is_grouped",
        "Grouped project",
        FieldKind::Choice {
            options: &["No", "Yes"],
        },
    )
    .required()
    .default_value("No"),
    field(
        "grouping.eligibility_criteria",
        "Eligibility criteria for new instances",
        FieldKind::Text,
    ),
    field(
        "grouping.expected_instances",
        "Expected project instances",
        FieldKind::Integer { min: 1, max: 1000 },
    )
    .default_value("1"),
];

impl Section {
    /// Key prefix shared by all fields of the section.
    pub fn key(self) -> &'static str {
        match self {
            Section::Project => "project",
            Section::Identification => "identification",
            Section::Description => "description",
            Section::Baseline => "baseline",
            Section::Additionality => "additionality",
            Section::Monitoring => "monitoring",
            Section::Grouping => "grouping",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Section::Project => PROJECT_FIELDS,
            Section::Identification => IDENTIFICATION_FIELDS,
            Section::Description => DESCRIPTION_FIELDS,
            Section::Baseline => BASELINE_FIELDS,
            Section::Additionality => ADDITIONALITY_FIELDS,
            Section::Monitoring => MONITORING_FIELDS,
            Section::Grouping => GROUPING_FIELDS,
        }
    }

    pub fn field(self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.key == key)
    }

    /// The PDD chapters, i.e. everything after the project-details step.
    pub fn pdd_sections() -> impl Iterator<Item = Section> {
        Section::iter().filter(|s| *s != Section::Project)
    }

    /// `(committed, total)` field counts.
    pub fn progress(self, store: &FormStore) -> (usize, usize) {
        let fields = self.fields();
        let filled = fields.iter().filter(|f| store.contains(f.key)).count();
        (filled, fields.len())
    }

    /// Required fields of this section not yet committed.
    pub fn missing_required(self, store: &FormStore) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter(|f| f.required && !store.contains(f.key))
            .map(|f| f.key)
            .collect()
    }
}

/// Look a field up across all sections.
pub fn find_field(key: &str) -> Option<&'static FieldSpec> {
    Section::iter().find_map(|s| s.field(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed_by_their_section() {
        for section in Section::iter() {
            for f in section.fields() {
                assert!(
                    f.key.starts_with(&format!("{}.", section.key())),
                    "{} not under {}",
                    f.key,
                    section.key()
                );
            }
        }
    }

    #[test]
    fn defaults_parse_for_every_field() {
        for section in Section::iter() {
            for f in section.fields() {
                if let Some(d) = f.default {
                    assert!(f.parse(d).is_ok(), "default of {} rejected", f.key);
                }
            }
        }
    }

    #[test]
    fn parse_enforces_declared_ranges() {
        let density = find_field(keys::TREE_DENSITY).unwrap();
        assert_eq!(density.parse("400").unwrap(), Some(FormValue::Int(400)));
        assert!(matches!(
            density.parse("1001"),
            Err(InputError::OutOfRange { .. })
        ));
        assert!(matches!(
            density.parse("lots"),
            Err(InputError::InvalidNumber { .. })
        ));

        let land = find_field(keys::LAND_AREA).unwrap();
        assert_eq!(land.parse(" 12.5 ").unwrap(), Some(FormValue::Float(12.5)));
        assert!(land.parse("0").is_err());
        assert!(matches!(land.parse(""), Err(InputError::Empty { .. })));
    }

    #[test]
    fn optional_blank_commits_nothing() {
        let email = find_field("identification.contact_email").unwrap();
        assert_eq!(email.parse("   ").unwrap(), None);
    }

    #[test]
    fn choice_is_normalised_to_declared_option() {
        let species = find_field(keys::SPECIES).unwrap();
        assert_eq!(
            species.parse("teak").unwrap(),
            Some(FormValue::Choice("Teak".into()))
        );
        assert!(matches!(
            species.parse("Mango"),
            Err(InputError::UnknownOption { .. })
        ));
    }

    #[test]
    fn upload_path_must_exist() {
        let map = find_field("description.site_map").unwrap();
        assert!(matches!(
            map.parse("/definitely/not/here.png"),
            Err(InputError::MissingFile { .. })
        ));
    }
}
