use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use rust_decimal::Decimal;
use tds_core::TaxEngine;
use tds_core::models::{AnnualTaxRequest, Regime};
use tds_core::rules::RuleBook;
use tds_data::SlabScheduleLoader;
use tracing_subscriber::EnvFilter;

/// Validate a regime slab schedule and preview the tax it produces.
///
/// The CSV file should have the following columns:
/// - regime: `old` or `new`
/// - min_income: lower bound of the slab
/// - max_income: upper bound of the slab (empty for the top slab)
/// - rate: marginal rate in percent (e.g. 5)
#[derive(Parser, Debug)]
#[command(name = "tds-slab-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing the slab schedule
    #[arg(short, long)]
    file: PathBuf,

    /// Date selecting the rule vintage the schedule is applied to (YYYY-MM-DD)
    #[arg(short, long)]
    as_of: Option<NaiveDate>,

    /// Gross income to compute under both the built-in and the loaded slabs
    #[arg(short, long)]
    income: Option<Decimal>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let book = RuleBook::builtin();
    let rules = book
        .for_date(as_of)
        .with_context(|| format!("No rules in effect on {as_of}"))?;

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;
    let records = SlabScheduleLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} slab records from CSV", records.len());

    let loaded = SlabScheduleLoader::apply(rules, &records)
        .with_context(|| format!("Invalid slab schedule: {}", args.file.display()))?;

    for regime in [Regime::Old, Regime::New] {
        let definition = loaded.regime(regime);
        println!("{regime} regime ({} slabs):", definition.slabs.len());
        for slab in &definition.slabs {
            match slab.max {
                Some(max) => println!("  {:>12} - {:>12}  {}%", slab.min, max, slab.rate),
                None => println!("  {:>12} and above     {}%", slab.min, slab.rate),
            }
        }
    }

    if let Some(income) = args.income {
        for regime in [Regime::Old, Regime::New] {
            let request = AnnualTaxRequest {
                gross_income: income,
                deductions: vec![],
                regime,
            };
            let builtin = TaxEngine::new(rules)
                .compute_annual_tax(&request)
                .context("Failed to compute tax under built-in slabs")?;
            let preview = TaxEngine::new(&loaded)
                .compute_annual_tax(&request)
                .context("Failed to compute tax under loaded slabs")?;
            println!(
                "{regime} regime tax on {income}: built-in {} ({} vintage), loaded {}",
                builtin.total_tax, rules.version, preview.total_tax
            );
        }
    }

    Ok(())
}
