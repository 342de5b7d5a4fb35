//! Immutable rule snapshots.
//!
//! A [`RuleSet`] bundles every table the calculators read: withholding
//! sections, surcharge brackets and both regime definitions. Rule sets are
//! validated when built and never change afterwards. A [`RuleBook`] keeps the
//! vintages side by side and selects the one in force on a given date, so
//! results can be recomputed under the rules of an earlier year.

mod builtin;

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TaxError;
use crate::models::{PayeeType, Regime, RegimeDefinition, WithholdingSection};

/// Surcharge rate for annual income in `[min, max)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeBracket {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

impl SurchargeBracket {
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { min, max, rate }
    }

    /// Lower bound inclusive, upper bound exclusive.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.min && self.max.is_none_or(|max| income < max)
    }
}

/// Surcharge brackets for companies and for every other payee type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeTables {
    pub individual: Vec<SurchargeBracket>,
    pub company: Vec<SurchargeBracket>,
}

impl SurchargeTables {
    pub fn table_for(
        &self,
        payee: PayeeType,
    ) -> &[SurchargeBracket] {
        match payee {
            PayeeType::Company => &self.company,
            PayeeType::Individual
            | PayeeType::Huf
            | PayeeType::SeniorCitizen
            | PayeeType::Others => &self.individual,
        }
    }

    /// Checks that both tables start at zero and are contiguous.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidRuleTable`] on a gap, overlap, bad rate or
    /// bounded top bracket.
    pub fn validate(&self) -> Result<(), TaxError> {
        validate_brackets("individual", &self.individual)?;
        validate_brackets("company", &self.company)
    }
}

fn validate_brackets(
    name: &str,
    brackets: &[SurchargeBracket],
) -> Result<(), TaxError> {
    if brackets.is_empty() {
        return Err(TaxError::rule_table(format!(
            "{name} surcharge table is empty"
        )));
    }
    let mut expected_min = Decimal::ZERO;
    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.min != expected_min {
            return Err(TaxError::rule_table(format!(
                "{name} surcharge bracket {index} starts at {} instead of {expected_min}",
                bracket.min
            )));
        }
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE_HUNDRED {
            return Err(TaxError::rule_table(format!(
                "{name} surcharge bracket {index} has rate {} outside 0..=100",
                bracket.rate
            )));
        }
        let is_last = index + 1 == brackets.len();
        match bracket.max {
            Some(max) if !is_last && max > bracket.min => expected_min = max,
            None if is_last => {}
            _ => {
                return Err(TaxError::rule_table(format!(
                    "{name} surcharge bracket {index} has an invalid upper bound"
                )));
            }
        }
    }
    Ok(())
}

/// One vintage of the complete rule table.
///
/// Deserialization goes through [`RuleSet::new`], so a snapshot read from a
/// file is validated like one built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleSetFields")]
pub struct RuleSet {
    pub version: String,
    pub effective_from: NaiveDate,
    sections: Vec<WithholdingSection>,
    surcharge: SurchargeTables,
    old_regime: RegimeDefinition,
    new_regime: RegimeDefinition,
}

/// Unvalidated field layout of a [`RuleSet`].
#[derive(Deserialize)]
struct RuleSetFields {
    version: String,
    effective_from: NaiveDate,
    sections: Vec<WithholdingSection>,
    surcharge: SurchargeTables,
    old_regime: RegimeDefinition,
    new_regime: RegimeDefinition,
}

impl TryFrom<RuleSetFields> for RuleSet {
    type Error = TaxError;

    fn try_from(fields: RuleSetFields) -> Result<Self, Self::Error> {
        Self::new(
            fields.version,
            fields.effective_from,
            fields.sections,
            fields.surcharge,
            fields.old_regime,
            fields.new_regime,
        )
    }
}

impl RuleSet {
    /// Builds a rule set and validates every table in it.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidRuleTable`] if a section, surcharge table or
    /// regime is malformed, a section code appears twice, or a regime
    /// definition is tagged with the wrong regime.
    pub fn new(
        version: impl Into<String>,
        effective_from: NaiveDate,
        sections: Vec<WithholdingSection>,
        surcharge: SurchargeTables,
        old_regime: RegimeDefinition,
        new_regime: RegimeDefinition,
    ) -> Result<Self, TaxError> {
        let rules = Self {
            version: version.into(),
            effective_from,
            sections,
            surcharge,
            old_regime,
            new_regime,
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Returns a copy with one regime definition replaced, e.g. a schedule
    /// loaded from a file.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidRuleTable`] if the definition is malformed.
    pub fn with_regime(
        &self,
        definition: RegimeDefinition,
    ) -> Result<Self, TaxError> {
        definition.validate()?;
        let mut rules = self.clone();
        match definition.regime {
            Regime::Old => rules.old_regime = definition,
            Regime::New => rules.new_regime = definition,
        }
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), TaxError> {
        let mut seen = HashSet::new();
        for section in &self.sections {
            section.validate()?;
            if !seen.insert(section.code) {
                return Err(TaxError::rule_table(format!(
                    "section {} appears more than once in rules {}",
                    section.code, self.version
                )));
            }
        }
        self.surcharge.validate()?;
        for (expected, definition) in [
            (Regime::Old, &self.old_regime),
            (Regime::New, &self.new_regime),
        ] {
            if definition.regime != expected {
                return Err(TaxError::rule_table(format!(
                    "{expected} regime slot holds the {} regime",
                    definition.regime
                )));
            }
            definition.validate()?;
        }
        Ok(())
    }

    pub fn sections(&self) -> &[WithholdingSection] {
        &self.sections
    }

    pub fn surcharge(&self) -> &SurchargeTables {
        &self.surcharge
    }

    pub fn regime(
        &self,
        regime: Regime,
    ) -> &RegimeDefinition {
        match regime {
            Regime::Old => &self.old_regime,
            Regime::New => &self.new_regime,
        }
    }
}

/// All rule vintages, ordered by effective date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBook {
    vintages: Vec<RuleSet>,
}

impl RuleBook {
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidRuleTable`] if the list is empty, a rule set
    /// is invalid, or two vintages share an effective date.
    pub fn new(mut vintages: Vec<RuleSet>) -> Result<Self, TaxError> {
        if vintages.is_empty() {
            return Err(TaxError::rule_table("rule book has no vintages"));
        }
        for rules in &vintages {
            rules.validate()?;
        }
        vintages.sort_by_key(|rules| rules.effective_from);
        if let Some(pair) = vintages
            .windows(2)
            .find(|pair| pair[0].effective_from == pair[1].effective_from)
        {
            return Err(TaxError::rule_table(format!(
                "rules {} and {} share effective date {}",
                pair[0].version, pair[1].version, pair[0].effective_from
            )));
        }
        Ok(Self { vintages })
    }

    /// The rule vintages shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            vintages: vec![builtin::fy2024(), builtin::fy2025()],
        }
    }

    /// The vintage in force on `date`: the latest one effective on or before it.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::NoRulesInEffect`] if `date` precedes every vintage.
    pub fn for_date(
        &self,
        date: NaiveDate,
    ) -> Result<&RuleSet, TaxError> {
        self.vintages
            .iter()
            .rev()
            .find(|rules| rules.effective_from <= date)
            .ok_or(TaxError::NoRulesInEffect(date))
    }

    pub fn latest(&self) -> &RuleSet {
        // `new` and `builtin` never build an empty book.
        &self.vintages[self.vintages.len() - 1]
    }

    pub fn vintages(&self) -> &[RuleSet] {
        &self.vintages
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::builtin()
    }
}
