use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use tds_cli::commands;
use tds_cli::config::AppConfig;
use tds_cli::logging::init_logging;
use tds_cli::utils::{parse_amount, parse_deduction};
use tds_core::TaxEngine;
use tds_core::models::{
    AnnualTaxRequest, AssetClass, DeductionInput, FinancialYear, PayeeType, Regime,
    WithholdingRequest,
};
use tds_core::rules::RuleBook;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// TDS withholding and annual income-tax calculator.
///
/// Rules are picked by date: the vintage in force on `--as-of` (or the
/// config file's `[rules] as_of`, or today).
#[derive(Debug, Parser)]
#[command(name = "tds", version, about)]
struct Cli {
    /// Configuration file. A missing file means defaults.
    #[arg(long, default_value = "tds.toml")]
    config: PathBuf,

    /// Date selecting the rule vintage (YYYY-MM-DD).
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Log filter, e.g. `debug` or `tds_core=trace`. `RUST_LOG` wins when set.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the withholding sections in force.
    Sections,

    /// Show the limit that governs a payment.
    Threshold {
        /// Section code, e.g. 194J.
        section: String,

        #[arg(long, default_value = "individual")]
        payee: PayeeType,

        /// Required for rent (194I): plant-machinery or land-building.
        #[arg(long)]
        asset_class: Option<AssetClass>,
    },

    /// Compute withholding on one payment.
    Withhold {
        /// Section code, e.g. 194J.
        section: String,

        /// Payment amount; commas and a leading ₹ are accepted.
        #[arg(value_parser = parse_amount)]
        amount: Decimal,

        #[arg(long, default_value = "individual")]
        payee: PayeeType,

        /// Required for rent (194I): plant-machinery or land-building.
        #[arg(long)]
        asset_class: Option<AssetClass>,

        /// Rate from a lower-deduction certificate, in percent.
        #[arg(long, value_parser = parse_amount)]
        certificate_rate: Option<Decimal>,

        /// Payee's annual income; enables surcharge.
        #[arg(long, value_parser = parse_amount)]
        annual_income: Option<Decimal>,

        /// Already paid to this payee under the section this financial year.
        #[arg(long, value_parser = parse_amount)]
        paid_ytd: Option<Decimal>,
    },

    /// Compute annual income tax under one regime.
    Annual {
        /// Gross annual income.
        #[arg(value_parser = parse_amount)]
        income: Decimal,

        #[arg(long, default_value = "new")]
        regime: Regime,

        /// Investment deduction as CODE=AMOUNT or CODE=AMOUNT:CAP; repeatable.
        #[arg(long = "deduction", value_parser = parse_deduction)]
        deductions: Vec<DeductionInput>,
    },

    /// Compute both regimes and recommend the cheaper one.
    Compare {
        /// Gross annual income.
        #[arg(value_parser = parse_amount)]
        income: Decimal,

        /// Investment deduction as CODE=AMOUNT or CODE=AMOUNT:CAP; repeatable.
        #[arg(long = "deduction", value_parser = parse_deduction)]
        deductions: Vec<DeductionInput>,
    },

    /// Financial year, quarter and deposit due date of a payment date.
    Period {
        /// Payment date (YYYY-MM-DD); defaults to the rules date.
        date: Option<NaiveDate>,
    },

    /// Quarterly statement due dates of a financial year.
    DueDates {
        /// Financial year as YYYY-YYYY or YYYY-YY; defaults to the current one.
        financial_year: Option<FinancialYear>,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.as_of.is_some() {
        config.rules.as_of = cli.as_of;
    }
    init_logging(&config.logging)?;

    let as_of = config.rules_date(Local::now().date_naive());
    let book = RuleBook::builtin();
    let rules = book
        .for_date(as_of)
        .with_context(|| format!("No rules in effect on {as_of}"))?;
    debug!(version = %rules.version, %as_of, "selected rule vintage");
    let engine = TaxEngine::new(rules);

    let output = match cli.command {
        Command::Sections => commands::sections(&engine),
        Command::Threshold {
            section,
            payee,
            asset_class,
        } => commands::threshold(&engine, &section, payee, asset_class)?,
        Command::Withhold {
            section,
            amount,
            payee,
            asset_class,
            certificate_rate,
            annual_income,
            paid_ytd,
        } => {
            let request = WithholdingRequest {
                asset_class,
                certificate_rate,
                annual_income,
                paid_year_to_date: paid_ytd,
                ..WithholdingRequest::new(amount, section, payee)
            };
            commands::withhold(&engine, &request)?
        }
        Command::Annual {
            income,
            regime,
            deductions,
        } => {
            let request = AnnualTaxRequest {
                gross_income: income,
                deductions,
                regime,
            };
            let result = engine.compute_annual_tax(&request)?;
            commands::render_annual(&result)
        }
        Command::Compare { income, deductions } => {
            commands::compare(&engine, income, &deductions)?
        }
        Command::Period { date } => commands::period(&engine, date.unwrap_or(as_of))?,
        Command::DueDates { financial_year } => {
            let financial_year =
                financial_year.unwrap_or_else(|| engine.derive_period(as_of).year);
            commands::due_dates(&engine, &financial_year)?
        }
    };

    print!("{output}");
    Ok(())
}
