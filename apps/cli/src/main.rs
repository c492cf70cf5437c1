//! mensura - parse, convert and inspect physical quantities.

mod config;
mod logging;
mod report;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mensura_units::{DimensionOp, DimensionVector, Locale, QuantityValue, Registries};

use crate::config::Config;
use crate::report::{
    emit, ConversionReport, DimensionReport, DimensionSummary, DimensionsReport, QuantityReport,
    UnitRow, UnitsReport,
};

#[derive(Parser, Debug)]
#[command(name = "mensura", version)]
#[command(about = "Parse, convert and inspect physical quantities")]
struct Cli {
    /// Locale for number formats and unit spellings (e.g. de-DE, ru)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (in addition to ./mensura.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a quantity to another unit of the same dimension
    Convert {
        /// Quantity text, e.g. "12.5 km/h"
        quantity: String,

        /// Dimension the quantity belongs to (e.g. speed)
        #[arg(short, long)]
        dimension: String,

        /// Target unit abbreviation
        #[arg(short, long)]
        to: String,
    },

    /// Parse a quantity and show its base value
    Parse {
        quantity: String,

        #[arg(short, long)]
        dimension: String,
    },

    /// Parse a dimension string, optionally multiplying or dividing by another
    Dimension {
        /// Dimension string, e.g. kgm2/s3
        expr: String,

        #[arg(long, conflicts_with = "per")]
        times: Option<String>,

        #[arg(long)]
        per: Option<String>,
    },

    /// List the units of a dimension
    Units {
        dimension: String,

        /// Hide SI-prefixed units
        #[arg(long)]
        explicit_only: bool,
    },

    /// List the known dimensions
    Dimensions,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    logging::init_logging(&config.logging);

    let locale = match &cli.locale {
        Some(tag) => {
            Locale::parse(tag).with_context(|| format!("Invalid --locale '{tag}'"))?
        }
        None => config
            .locale()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?,
    };
    let json = cli.json || config.output.json;

    tracing::debug!(locale = %locale, json, command = ?cli.command, "Starting mensura");

    run(cli.command, mensura_units::registries(), &locale, json)
}

fn run(command: Command, registries: &Registries, locale: &Locale, json: bool) -> anyhow::Result<()> {
    match command {
        Command::Convert {
            quantity,
            dimension,
            to,
        } => {
            let from = parse_quantity(registries, &dimension, &quantity, locale)?;
            let converted = from
                .convert_to_abbreviation(&to, locale)
                .with_context(|| format!("Cannot convert '{quantity}' to '{to}'"))?;
            emit(
                &ConversionReport {
                    from: QuantityReport::new(&from, locale),
                    to: QuantityReport::new(&converted, locale),
                },
                json,
            )
        }
        Command::Parse {
            quantity,
            dimension,
        } => {
            let parsed = parse_quantity(registries, &dimension, &quantity, locale)?;
            emit(&QuantityReport::new(&parsed, locale), json)
        }
        Command::Dimension { expr, times, per } => {
            let mut dimension = parse_dimension(&expr)?;
            if let Some(other) = times {
                dimension = dimension.combine(&parse_dimension(&other)?, DimensionOp::Multiply);
            }
            if let Some(other) = per {
                dimension = dimension.combine(&parse_dimension(&other)?, DimensionOp::Divide);
            }
            let matches = registries
                .by_dimension(&dimension)
                .iter()
                .map(|r| r.name().to_string())
                .collect();
            emit(&DimensionReport::new(dimension, matches), json)
        }
        Command::Units {
            dimension,
            explicit_only,
        } => {
            let registry = registries
                .require(&dimension)
                .with_context(|| format!("Unknown dimension '{dimension}'"))?;
            let units = registry
                .units()
                .iter()
                .filter(|u| !(explicit_only && u.is_generated()))
                .map(|u| UnitRow::new(u, registry.display_abbreviation(u, locale)))
                .collect();
            emit(
                &UnitsReport {
                    dimension,
                    standard_unit: registry.standard_unit().map(|u| u.id().to_string()),
                    units,
                },
                json,
            )
        }
        Command::Dimensions => {
            let dimensions = registries
                .names()
                .into_iter()
                .filter_map(|name| registries.get(&name))
                .map(|r| DimensionSummary {
                    name: r.name().to_string(),
                    dimension: r.dimension().to_canonical_string(),
                    units: r.len(),
                })
                .collect();
            emit(&DimensionsReport { dimensions }, json)
        }
    }
}

fn parse_quantity(
    registries: &Registries,
    dimension: &str,
    text: &str,
    locale: &Locale,
) -> anyhow::Result<QuantityValue> {
    let registry = registries
        .require(dimension)
        .with_context(|| format!("Unknown dimension '{dimension}'"))?;
    let quantity = QuantityValue::parse(text, &registry, locale)
        .with_context(|| format!("Failed to parse '{text}' as {dimension}"))?;
    Ok(quantity)
}

fn parse_dimension(text: &str) -> anyhow::Result<DimensionVector> {
    DimensionVector::parse(text).with_context(|| format!("Invalid dimension string '{text}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mensura", "convert", "12,5 km/h", "-d", "speed", "--to", "m/s", "--locale", "de",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.locale.as_deref(), Some("de"));
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Convert { ref to, .. } if to == "m/s"));
    }

    #[test]
    fn times_and_per_conflict() {
        assert!(Cli::try_parse_from(["mensura", "dimension", "m", "--times", "m", "--per", "s"])
            .is_err());
    }

    #[test]
    fn run_reports_unknown_dimension() {
        let err = run(
            Command::Units {
                dimension: "luminosity".to_string(),
                explicit_only: false,
            },
            mensura_units::registries(),
            &Locale::invariant(),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("luminosity"));
    }
}
