//! Simplified carbon-credit estimate.
//!
//! Biomass grows linearly with project duration (scaled per decade) from a
//! per-species biomass factor. This is the documented simplification used by
//! the wizard, not an allometric growth model; keep it linear.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::inputs::{ProjectInputs, Species};

pub const DEFAULT_CARBON_FRACTION: f64 = 0.47;
pub const DEFAULT_CO2E_FACTOR: f64 = 3.67;
pub const DEFAULT_BUFFER_FRACTION: f64 = 0.22;
pub const DEFAULT_BIOMASS_PER_TREE: f64 = 8.0;

/// Constants of the estimation methodology.
///
/// `Default` carries the published numbers; the wizard configuration may
/// override any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Methodology {
    /// Fraction of dry biomass that is carbon.
    pub carbon_fraction: f64,
    /// Carbon to CO2-equivalent conversion (44/12).
    pub co2e_factor: f64,
    /// Share withheld as risk buffer.
    pub buffer_fraction: f64,
    /// Biomass per tree (tons per decade) for species missing from the table.
    pub default_biomass_per_tree: f64,
    /// Biomass per tree keyed by species name.
    ///
    /// A configured table is merged over the built-in factors, so naming one
    /// species keeps the others.
    #[serde(deserialize_with = "merge_species_biomass")]
    pub species_biomass: BTreeMap<String, f64>,
}

fn default_species_biomass() -> BTreeMap<String, f64> {
    [
        (Species::Neem, 10.0),
        (Species::Bamboo, 5.0),
        (Species::Teak, 12.0),
        (Species::Poplar, 8.0),
    ]
    .into_iter()
    .map(|(species, factor)| (species.to_string(), factor))
    .collect()
}

fn merge_species_biomass<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let configured = BTreeMap::<String, f64>::deserialize(deserializer)?;
    let mut table = default_species_biomass();
    for (name, factor) in configured {
        // a lowercased key replaces the built-in entry instead of shadowing it
        table.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        table.insert(name, factor);
    }
    Ok(table)
}

impl Default for Methodology {
    fn default() -> Self {
        Self {
            carbon_fraction: DEFAULT_CARBON_FRACTION,
            co2e_factor: DEFAULT_CO2E_FACTOR,
            buffer_fraction: DEFAULT_BUFFER_FRACTION,
            default_biomass_per_tree: DEFAULT_BIOMASS_PER_TREE,
            species_biomass: default_species_biomass(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub total_biomass_tons: f64,
    pub carbon_content_tons: f64,
    pub co2e_tons: f64,
    pub buffer_deduction_tons: f64,
    pub usable_credits_tons: f64,
}

impl Methodology {
    /// Biomass factor for `species`; unknown species get the default.
    ///
    /// Names are matched case-insensitively since configuration layers may
    /// lowercase table keys.
    pub fn biomass_per_tree(&self, species: &Species) -> f64 {
        let name = species.as_str();
        self.species_biomass
            .get(name)
            .or_else(|| {
                self.species_biomass
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .copied()
            .unwrap_or(self.default_biomass_per_tree)
    }

    pub fn estimate(&self, inputs: &ProjectInputs) -> EstimationResult {
        let biomass_per_tree = self.biomass_per_tree(&inputs.species);
        let total_trees = inputs.land_area_hectares * f64::from(inputs.tree_density_per_hectare);
        let decades = f64::from(inputs.duration_years) / 10.0;

        let total_biomass_tons = total_trees * (biomass_per_tree * decades);
        let carbon_content_tons = total_biomass_tons * self.carbon_fraction;
        let co2e_tons = carbon_content_tons * self.co2e_factor;
        let buffer_deduction_tons = co2e_tons * self.buffer_fraction;
        let usable_credits_tons = co2e_tons - buffer_deduction_tons;

        EstimationResult {
            total_biomass_tons,
            carbon_content_tons,
            co2e_tons,
            buffer_deduction_tons,
            usable_credits_tons,
        }
    }

    /// Buffer share as a whole percentage, for labels ("22%").
    pub fn buffer_percent(&self) -> f64 {
        (self.buffer_fraction * 100.0).round()
    }
}

/// Estimate with the default methodology.
pub fn estimate(inputs: &ProjectInputs) -> EstimationResult {
    Methodology::default().estimate(inputs)
}

/// Whole tons with thousands separators, e.g. `137,992`.
pub fn format_tons(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_tons_groups_thousands() {
        assert_eq!(format_tons(0.0), "0");
        assert_eq!(format_tons(999.4), "999");
        assert_eq!(format_tons(1000.0), "1,000");
        assert_eq!(format_tons(137_992.0), "137,992");
        assert_eq!(format_tons(30_358.24), "30,358");
        assert_eq!(format_tons(1_234_567.5), "1,234,568");
        assert_eq!(format_tons(-4200.0), "-4,200");
    }

    #[test]
    fn default_table_matches_published_factors() {
        let m = Methodology::default();
        assert_eq!(m.biomass_per_tree(&Species::Neem), 10.0);
        assert_eq!(m.biomass_per_tree(&Species::Bamboo), 5.0);
        assert_eq!(m.biomass_per_tree(&Species::Teak), 12.0);
        assert_eq!(m.biomass_per_tree(&Species::Poplar), 8.0);
        assert_eq!(m.biomass_per_tree(&Species::Other("Mango".into())), 8.0);
        assert_eq!(m.buffer_percent(), 22.0);
    }

    #[test]
    fn partial_methodology_keeps_defaults() {
        let m: Methodology = serde_json::from_str(r#"{ "buffer_fraction": 0.2 }"#).unwrap();
        assert_eq!(m.buffer_fraction, 0.2);
        assert_eq!(m.carbon_fraction, DEFAULT_CARBON_FRACTION);
        assert_eq!(m.species_biomass.len(), 4);
    }

    #[test]
    fn configured_species_merge_over_builtin_table() {
        let m: Methodology = serde_json::from_str(
            r#"{ "species_biomass": { "neem": 11.0, "Mango": 6.5 } }"#,
        )
        .unwrap();
        assert_eq!(m.biomass_per_tree(&Species::Neem), 11.0);
        assert_eq!(m.biomass_per_tree(&Species::Teak), 12.0);
        assert_eq!(m.biomass_per_tree(&Species::Bamboo), 5.0);
        assert_eq!(m.biomass_per_tree(&Species::Other("Mango".into())), 6.5);
        // "neem" replaced "Neem" rather than sitting next to it
        assert_eq!(m.species_biomass.len(), 5);
        assert_eq!(m.default_biomass_per_tree, DEFAULT_BIOMASS_PER_TREE);
    }
}
