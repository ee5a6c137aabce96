//! Integration tests for the carbon estimate:
//! - worked scenarios with the default methodology
//! - structural properties (buffer share, monotonic duration)
//! - methodology overrides

use pdd_core::{estimate, format_tons, EstimationResult, Methodology, ProjectInputs, Species};

fn inputs(land: f64, density: u32, duration: u32, species: Species) -> ProjectInputs {
    ProjectInputs {
        developer_name: "Green Roots Ltd".into(),
        location: "Nagpur, Maharashtra".into(),
        land_area_hectares: land,
        tree_density_per_hectare: density,
        start_year: 2025,
        duration_years: duration,
        species,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * b.abs().max(1.0)
}

#[test]
fn neem_ten_hectares_twenty_years() {
    let r = estimate(&inputs(10.0, 400, 20, Species::Neem));

    assert!(close(r.total_biomass_tons, 80_000.0), "{r:?}");
    assert!(close(r.carbon_content_tons, 37_600.0), "{r:?}");
    assert!(close(r.co2e_tons, 137_992.0), "{r:?}");
    assert!(close(r.buffer_deduction_tons, 30_358.24), "{r:?}");
    assert!(close(r.usable_credits_tons, 107_633.76), "{r:?}");

    assert_eq!(format_tons(r.co2e_tons), "137,992");
    assert_eq!(format_tons(r.usable_credits_tons), "107,634");
}

#[test]
fn unknown_species_uses_default_factor() {
    let r = estimate(&inputs(5.0, 200, 10, Species::Other("Mango".into())));
    assert!(close(r.total_biomass_tons, 8_000.0), "{r:?}");

    let poplar = estimate(&inputs(5.0, 200, 10, Species::Poplar));
    assert_eq!(r, poplar);
}

#[test]
fn estimate_is_deterministic() {
    let i = inputs(3.7, 650, 17, Species::Teak);
    let a = estimate(&i);
    let b = estimate(&i);
    assert_eq!(a.co2e_tons.to_bits(), b.co2e_tons.to_bits());
    assert_eq!(a, b);
}

#[test]
fn usable_credits_are_seventy_eight_percent() {
    for species in Species::KNOWN {
        for (land, density, duration) in [(0.1, 100, 5), (12.5, 450, 23), (250.0, 1000, 40)] {
            let r = estimate(&inputs(land, density, duration, species.clone()));
            assert!(close(r.usable_credits_tons, r.co2e_tons * 0.78), "{r:?}");
            assert!(close(
                r.co2e_tons,
                r.buffer_deduction_tons + r.usable_credits_tons
            ));
        }
    }
}

#[test]
fn longer_projects_store_more_biomass() {
    let mut previous: Option<EstimationResult> = None;
    for duration in 5..=40 {
        let r = estimate(&inputs(2.0, 300, duration, Species::Bamboo));
        if let Some(p) = previous {
            assert!(r.total_biomass_tons > p.total_biomass_tons);
        }
        previous = Some(r);
    }
}

#[test]
fn methodology_override_changes_only_its_constant() {
    let base = estimate(&inputs(10.0, 400, 20, Species::Neem));
    let custom = Methodology {
        buffer_fraction: 0.1,
        ..Methodology::default()
    }
    .estimate(&inputs(10.0, 400, 20, Species::Neem));

    assert_eq!(custom.co2e_tons, base.co2e_tons);
    assert!(close(custom.buffer_deduction_tons, base.co2e_tons * 0.1));
}
