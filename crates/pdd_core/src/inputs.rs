//! Project inputs collected by the "Project details" step.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::InputError;
use crate::store::{FormStore, FormValue};

/// Store keys written by [`ProjectInputs::to_form_values`].
pub mod keys {
    pub const DEVELOPER_NAME: &str = "project.developer_name";
    pub const LOCATION: &str = "project.location";
    pub const LAND_AREA: &str = "project.land_area_ha";
    pub const TREE_DENSITY: &str = "project.tree_density";
    pub const START_YEAR: &str = "project.start_year";
    pub const DURATION: &str = "project.duration_years";
    pub const SPECIES: &str = "project.species";
}

pub const LAND_AREA_MIN: f64 = 0.1;
pub const LAND_AREA_STEP: f64 = 0.1;
pub const TREE_DENSITY_RANGE: RangeInclusive<u32> = 100..=1000;
pub const TREE_DENSITY_STEP: u32 = 50;
pub const TREE_DENSITY_DEFAULT: u32 = 400;
pub const START_YEAR_RANGE: RangeInclusive<u32> = 2020..=2100;
pub const START_YEAR_DEFAULT: u32 = 2025;
pub const DURATION_RANGE: RangeInclusive<u32> = 5..=40;
pub const DURATION_DEFAULT: u32 = 20;

/// Dominant tree species of the project.
///
/// Unknown names are kept as `Other` rather than rejected; the estimator
/// falls back to its default biomass factor for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Species {
    Neem,
    Bamboo,
    Teak,
    Poplar,
    Other(String),
}

impl Species {
    /// The species offered by the selection field, in display order.
    pub const KNOWN: [Species; 4] = [
        Species::Neem,
        Species::Bamboo,
        Species::Teak,
        Species::Poplar,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Species::Neem => "Neem",
            Species::Bamboo => "Bamboo",
            Species::Teak => "Teak",
            Species::Poplar => "Poplar",
            Species::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Species::Other(_))
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let known = Species::KNOWN
            .into_iter()
            .find(|sp| sp.as_str().eq_ignore_ascii_case(trimmed));
        Ok(known.unwrap_or_else(|| Species::Other(trimmed.to_string())))
    }
}

impl From<String> for Species {
    fn from(value: String) -> Self {
        match value.parse::<Species>() {
            Ok(species) => species,
            Err(never) => match never {},
        }
    }
}

impl From<Species> for String {
    fn from(value: Species) -> Self {
        value.as_str().to_string()
    }
}

/// Everything the estimator needs, plus the developer name and location
/// entered on the same form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInputs {
    pub developer_name: String,
    pub location: String,
    pub land_area_hectares: f64,
    pub tree_density_per_hectare: u32,
    pub start_year: u32,
    pub duration_years: u32,
    pub species: Species,
}

impl Default for ProjectInputs {
    fn default() -> Self {
        Self {
            developer_name: String::new(),
            location: String::new(),
            land_area_hectares: LAND_AREA_MIN,
            tree_density_per_hectare: TREE_DENSITY_DEFAULT,
            start_year: START_YEAR_DEFAULT,
            duration_years: DURATION_DEFAULT,
            species: Species::Neem,
        }
    }
}

impl ProjectInputs {
    /// Range checks applied when the inputs are submitted.
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.land_area_hectares.is_finite() || self.land_area_hectares <= 0.0 {
            return Err(InputError::NotPositive {
                field: "land area",
                value: self.land_area_hectares,
            });
        }
        check_range("tree density", self.tree_density_per_hectare, &TREE_DENSITY_RANGE)?;
        check_range("start year", self.start_year, &START_YEAR_RANGE)?;
        check_range("duration", self.duration_years, &DURATION_RANGE)?;
        Ok(())
    }

    pub fn to_form_values(&self) -> Vec<(&'static str, FormValue)> {
        vec![
            (keys::DEVELOPER_NAME, FormValue::Text(self.developer_name.clone())),
            (keys::LOCATION, FormValue::Text(self.location.clone())),
            (keys::LAND_AREA, FormValue::Float(self.land_area_hectares)),
            (
                keys::TREE_DENSITY,
                FormValue::Int(i64::from(self.tree_density_per_hectare)),
            ),
            (keys::START_YEAR, FormValue::Int(i64::from(self.start_year))),
            (keys::DURATION, FormValue::Int(i64::from(self.duration_years))),
            (keys::SPECIES, FormValue::Choice(self.species.to_string())),
        ]
    }

    /// Read the inputs back from a store.
    ///
    /// Returns the keys that are absent (or hold a value of the wrong shape)
    /// when the project-details step has not been completed. The two
    /// free-text fields are optional and default to empty.
    pub fn from_store(store: &FormStore) -> Result<Self, Vec<String>> {
        let mut missing = Vec::new();

        let land_area = store.get_float(keys::LAND_AREA);
        let density = store.get_int(keys::TREE_DENSITY).and_then(|v| u32::try_from(v).ok());
        let start_year = store.get_int(keys::START_YEAR).and_then(|v| u32::try_from(v).ok());
        let duration = store.get_int(keys::DURATION).and_then(|v| u32::try_from(v).ok());
        let species = store
            .get_text(keys::SPECIES)
            .map(|s| Species::from(s.to_string()));

        if land_area.is_none() {
            missing.push(keys::LAND_AREA.to_string());
        }
        if density.is_none() {
            missing.push(keys::TREE_DENSITY.to_string());
        }
        if start_year.is_none() {
            missing.push(keys::START_YEAR.to_string());
        }
        if duration.is_none() {
            missing.push(keys::DURATION.to_string());
        }
        if species.is_none() {
            missing.push(keys::SPECIES.to_string());
        }

        match (land_area, density, start_year, duration, species) {
            (Some(land_area), Some(density), Some(start_year), Some(duration), Some(species)) => {
                Ok(Self {
                    developer_name: store
                        .get_text(keys::DEVELOPER_NAME)
                        .unwrap_or_default()
                        .to_string(),
                    location: store
                        .get_text(keys::LOCATION)
                        .unwrap_or_default()
                        .to_string(),
                    land_area_hectares: land_area,
                    tree_density_per_hectare: density,
                    start_year,
                    duration_years: duration,
                    species,
                })
            }
            _ => Err(missing),
        }
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), InputError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(InputError::OutOfRange {
            field,
            value: f64::from(value),
            min: f64::from(*range.start()),
            max: f64::from(*range.end()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_parse_is_case_insensitive() {
        assert_eq!("teak".parse::<Species>().unwrap(), Species::Teak);
        assert_eq!(" BAMBOO ".parse::<Species>().unwrap(), Species::Bamboo);
        assert_eq!(
            "Mango".parse::<Species>().unwrap(),
            Species::Other("Mango".into())
        );
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut inputs = ProjectInputs::default();
        assert!(inputs.validate().is_ok());

        inputs.tree_density_per_hectare = 1050;
        assert!(matches!(
            inputs.validate(),
            Err(InputError::OutOfRange { field: "tree density", .. })
        ));

        inputs.tree_density_per_hectare = 400;
        inputs.land_area_hectares = 0.0;
        assert!(matches!(
            inputs.validate(),
            Err(InputError::NotPositive { field: "land area", .. })
        ));

        inputs.land_area_hectares = 2.5;
        inputs.duration_years = 4;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn species_serializes_as_plain_string() {
        let json = serde_json::to_string(&Species::Other("Mango".into())).unwrap();
        assert_eq!(json, "\"Mango\"");
        let back: Species = serde_json::from_str("\"poplar\"").unwrap();
        assert_eq!(back, Species::Poplar);
    }
}
