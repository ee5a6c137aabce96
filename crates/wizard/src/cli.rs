use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "wizard",
    version,
    about = "Agroforestry carbon-credit PDD wizard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Cmd {
    /// Run interactive TUI (default)
    Run {
        /// DOCX template to fill; overrides `export.template_path`
        #[arg(long, value_name = "PATH")]
        template: Option<PathBuf>,
        /// Directory the PDD is written to; overrides `export.output_dir`
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Print a carbon-credit estimate without opening the TUI
    Estimate {
        /// Total land area in hectares
        #[arg(long)]
        land_area: f64,
        /// Trees per hectare (100-1000)
        #[arg(long, default_value_t = 400)]
        tree_density: u32,
        /// Project duration in years (5-40)
        #[arg(long, default_value_t = 20)]
        duration: u32,
        /// Dominant species (Neem, Bamboo, Teak, Poplar or any other name)
        #[arg(long, default_value = "Neem")]
        species: String,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write the built-in DOCX template for customisation
    Template {
        #[arg(long, value_name = "PATH", default_value = "pdd_template.docx")]
        out: PathBuf,
    },
}

impl Cli {
    pub fn command_or_default(self) -> Cmd {
        self.cmd.unwrap_or(Cmd::Run {
            template: None,
            out_dir: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_runs_tui() {
        let cli = Cli::try_parse_from(["wizard"]).unwrap();
        assert_eq!(
            cli.command_or_default(),
            Cmd::Run {
                template: None,
                out_dir: None
            }
        );
    }

    #[test]
    fn estimate_defaults() {
        let cli = Cli::try_parse_from(["wizard", "estimate", "--land-area", "10"]).unwrap();
        match cli.command_or_default() {
            Cmd::Estimate {
                land_area,
                tree_density,
                duration,
                species,
                json,
            } => {
                assert_eq!(land_area, 10.0);
                assert_eq!(tree_density, 400);
                assert_eq!(duration, 20);
                assert_eq!(species, "Neem");
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn estimate_requires_land_area() {
        assert!(Cli::try_parse_from(["wizard", "estimate"]).is_err());
    }
}
