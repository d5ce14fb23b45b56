//! Command-line front end for the zmanim formula engine.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use zmanim::{GeoLocation, TimeValue};

#[derive(Parser)]
#[command(name = "zmanim", version, about = "Parse, validate, and evaluate zmanim formulas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a formula for syntax, keyword, and reference problems.
    Validate {
        /// The formula source.
        formula: String,
        /// JSON file mapping reference keys to formulas.
        #[arg(long)]
        refs: Option<PathBuf>,
        /// Key the formula will be stored under, for cycle checks.
        #[arg(long)]
        key: Option<String>,
    },
    /// Evaluate a formula for a date and location.
    Eval {
        formula: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Observer elevation in meters.
        #[arg(long, default_value_t = 0.0)]
        elevation: f64,
        /// IANA timezone name, e.g. Asia/Jerusalem.
        #[arg(long)]
        timezone: Tz,
        #[arg(long)]
        refs: Option<PathBuf>,
    },
    /// Evaluate every formula in a reference file for one day.
    Batch {
        /// JSON file mapping keys to formulas.
        refs: PathBuf,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value_t = 0.0)]
        elevation: f64,
        #[arg(long)]
        timezone: Tz,
    },
    /// Report whether a formula is editable in a visual builder.
    Classify { formula: String },
    /// Print the language catalog as JSON.
    Reference,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Validate { formula, refs, key } => validate(&formula, refs, key),
        Command::Eval {
            formula,
            date,
            lat,
            lon,
            elevation,
            timezone,
            refs,
        } => eval(&formula, date, lat, lon, elevation, timezone, refs),
        Command::Batch {
            refs,
            date,
            lat,
            lon,
            elevation,
            timezone,
        } => batch(refs, date, lat, lon, elevation, timezone),
        Command::Classify { formula } => classify(&formula),
        Command::Reference => reference(),
    }
}

fn validate(formula: &str, refs: Option<PathBuf>, key: Option<String>) -> Result<()> {
    let outcome = match load_refs(refs)? {
        Some(references) => {
            let mut validator = zmanim::Validator::new().with_references(&references);
            if let Some(key) = key.as_deref() {
                validator = validator.with_current_key(key);
            }
            validator.validate(formula)
        }
        None => zmanim::validate(formula),
    };
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.valid {
        std::process::exit(1);
    }
    Ok(())
}

fn eval(
    formula: &str,
    date: NaiveDate,
    lat: f64,
    lon: f64,
    elevation: f64,
    timezone: Tz,
    refs: Option<PathBuf>,
) -> Result<()> {
    let location = GeoLocation::new(lat, lon, timezone).with_elevation(elevation);
    let references = load_refs(refs)?.unwrap_or_default();
    let time = zmanim::evaluate_one(formula, date, location, &references)
        .with_context(|| format!("failed to evaluate {formula:?}"))?;
    print_time(&time)?;
    Ok(())
}

fn batch(
    refs: PathBuf,
    date: NaiveDate,
    lat: f64,
    lon: f64,
    elevation: f64,
    timezone: Tz,
) -> Result<()> {
    let location = GeoLocation::new(lat, lon, timezone).with_elevation(elevation);
    let references = read_refs(&refs)?;
    let outcome = zmanim::batch::evaluate_reference_map(&references, date, location);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn classify(formula: &str) -> Result<()> {
    let expr = zmanim::parse(formula).map_err(|e| anyhow::anyhow!("{e}"))?;
    let complexity = zmanim::classify(&expr);
    println!("{}", serde_json::to_string_pretty(&complexity)?);
    Ok(())
}

fn reference() -> Result<()> {
    let catalog = serde_json::json!({
        "functions": zmanim::reference::FUNCTIONS,
        "primitives": zmanim::reference::PRIMITIVES,
        "bases": zmanim::reference::BASES,
        "condition_variables": zmanim::reference::CONDITION_VARS,
    });
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

fn load_refs(path: Option<PathBuf>) -> Result<Option<HashMap<String, String>>> {
    path.map(|p| read_refs(&p)).transpose()
}

fn read_refs(path: &PathBuf) -> Result<HashMap<String, String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a JSON map", path.display()))
}

fn print_time(time: &TimeValue) -> Result<()> {
    match time {
        Some(instant) => println!(
            "{}",
            serde_json::to_string(&instant.to_rfc3339())?
        ),
        None => println!("null"),
    }
    Ok(())
}
