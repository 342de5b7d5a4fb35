use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tds_core::TaxError;
use tds_core::models::{Rebate, Regime, RegimeDefinition, SlabRate};
use tds_core::rules::RuleSet;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading a slab schedule.
#[derive(Debug, Error)]
pub enum SlabScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid regime '{0}'; expected 'old' or 'new'")]
    InvalidRegime(String),

    #[error("No slabs found for the {0} regime")]
    EmptySchedule(Regime),

    #[error("Schedule file contains no records")]
    NoRecords,

    #[error("Invalid schedule: {0}")]
    Tax(#[from] TaxError),
}

impl From<csv::Error> for SlabScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        SlabScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a slab schedule CSV file.
///
/// Columns:
/// - `regime`: `old` or `new`
/// - `min_income`: lower bound of the slab
/// - `max_income`: upper bound of the slab (empty for the open-ended top slab)
/// - `rate`: marginal rate in percent (e.g. `5` for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SlabScheduleRecord {
    pub regime: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for regime slab schedules from CSV files.
///
/// A schedule replaces the slabs of one or both regimes in an existing
/// [`RuleSet`]; rebate and standard deduction are kept from that rule set.
pub struct SlabScheduleLoader;

impl SlabScheduleLoader {
    /// Parse slab records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<SlabScheduleRecord>, SlabScheduleLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: SlabScheduleRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Builds a validated definition for `regime` from the matching records,
    /// in file order.
    ///
    /// # Errors
    ///
    /// Returns [`SlabScheduleLoaderError::InvalidRegime`] if any record names
    /// an unknown regime, [`SlabScheduleLoaderError::EmptySchedule`] if no
    /// record belongs to `regime`, and [`SlabScheduleLoaderError::Tax`] if
    /// the slabs leave a gap, overlap, or have a rate outside `0..=100`.
    pub fn definition(
        records: &[SlabScheduleRecord],
        regime: Regime,
        rebate: Rebate,
        standard_deduction: Decimal,
    ) -> Result<RegimeDefinition, SlabScheduleLoaderError> {
        let mut slabs = Vec::new();
        for record in records {
            if Self::regime_of(record)? == regime {
                slabs.push(SlabRate::new(record.min_income, record.max_income, record.rate));
            }
        }
        if slabs.is_empty() {
            return Err(SlabScheduleLoaderError::EmptySchedule(regime));
        }

        Ok(RegimeDefinition::new(regime, slabs, rebate, standard_deduction)?)
    }

    /// Returns a copy of `rules` with every regime named in `records`
    /// replaced by the loaded slabs.
    pub fn apply(
        rules: &RuleSet,
        records: &[SlabScheduleRecord],
    ) -> Result<RuleSet, SlabScheduleLoaderError> {
        if records.is_empty() {
            return Err(SlabScheduleLoaderError::NoRecords);
        }

        let mut present = Vec::new();
        for record in records {
            let regime = Self::regime_of(record)?;
            if !present.contains(&regime) {
                present.push(regime);
            }
        }

        let mut updated = rules.clone();
        for regime in present {
            let current = rules.regime(regime);
            let definition = Self::definition(
                records,
                regime,
                current.rebate,
                current.standard_deduction,
            )?;
            info!(
                %regime,
                slabs = definition.slabs.len(),
                version = %rules.version,
                "replacing regime slabs"
            );
            updated = updated.with_regime(definition)?;
        }

        Ok(updated)
    }

    fn regime_of(record: &SlabScheduleRecord) -> Result<Regime, SlabScheduleLoaderError> {
        record
            .regime
            .parse()
            .map_err(|_| SlabScheduleLoaderError::InvalidRegime(record.regime.clone()))
    }
}
