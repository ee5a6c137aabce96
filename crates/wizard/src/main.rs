mod action;
mod app;
mod cli;
mod components;
mod config;
mod errors;
mod forms;
mod logging;
mod pages;
mod tui;

use clap::Parser;
use color_eyre::Result;
use pdd_core::{ProjectInputs, Species, format_tons, template::write_default_template};
use serde_json::json;

use crate::{
    app::App,
    cli::{Cli, Cmd},
    config::Config,
};

#[tokio::main]
pub async fn main() -> Result<()> {
    let args = Cli::parse();
    errors::init()?;
    logging::init()?;

    match args.command_or_default() {
        Cmd::Run { template, out_dir } => {
            let mut config = Config::new()?;
            if template.is_some() {
                config.export.template_path = template;
            }
            if out_dir.is_some() {
                config.export.output_dir = out_dir;
            }
            let mut app = App::new(config);
            app.run().await?;
        }
        Cmd::Estimate {
            land_area,
            tree_density,
            duration,
            species,
            json,
        } => {
            let config = Config::new()?;
            let inputs = ProjectInputs {
                land_area_hectares: land_area,
                tree_density_per_hectare: tree_density,
                duration_years: duration,
                species: Species::from(species),
                ..ProjectInputs::default()
            };
            inputs.validate()?;
            let result = config.methodology.estimate(&inputs);
            let total_trees = inputs.land_area_hectares * f64::from(inputs.tree_density_per_hectare);

            if json {
                let out = json!({
                    "inputs": inputs,
                    "total_trees": total_trees,
                    "result": result,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let buffer = format!(
                    "Buffer deduction ({}%)",
                    config.methodology.buffer_percent()
                );
                for (label, value) in [
                    ("Total trees", total_trees),
                    ("Total biomass (t)", result.total_biomass_tons),
                    ("Carbon content (t)", result.carbon_content_tons),
                    ("CO2e (t)", result.co2e_tons),
                    (buffer.as_str(), result.buffer_deduction_tons),
                    ("Usable carbon credits (t)", result.usable_credits_tons),
                ] {
                    println!("{label:<28}{:>14}", format_tons(value));
                }
            }
        }
        Cmd::Template { out } => {
            write_default_template(&out)?;
            println!("Template written to {}", out.display());
        }
    }
    Ok(())
}
