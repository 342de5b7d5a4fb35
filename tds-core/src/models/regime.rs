use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TaxError;

/// One of the two alternative annual income-tax frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Old,
    New,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }

    /// Whether investment deductions (80C, 80D, ...) may reduce taxable income.
    pub fn allows_investment_deductions(&self) -> bool {
        match self {
            Self::Old => true,
            Self::New => false,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Regime {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Ok(Self::Old),
            "new" => Ok(Self::New),
            _ => Err(TaxError::UnsupportedRegime(s.to_string())),
        }
    }
}

/// A progressive band: income in `[min, max)` is taxed at `rate` percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabRate {
    pub min: Decimal,
    /// `None` for the open-ended top slab.
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

impl SlabRate {
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { min, max, rate }
    }

    /// Portion of `income` that falls inside this slab.
    pub fn portion_of(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.min {
            return Decimal::ZERO;
        }
        let upper = match self.max {
            Some(max) if income > max => max,
            _ => income,
        };
        upper - self.min
    }
}

/// Tax credit available when taxable income does not exceed `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebate {
    pub ceiling: Decimal,
    pub amount: Decimal,
}

/// Slabs, rebate and standard deduction of one regime.
///
/// Deserialization runs [`RegimeDefinition::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegimeDefinitionFields")]
pub struct RegimeDefinition {
    pub regime: Regime,
    pub slabs: Vec<SlabRate>,
    pub rebate: Rebate,
    pub standard_deduction: Decimal,
}

#[derive(Deserialize)]
struct RegimeDefinitionFields {
    regime: Regime,
    slabs: Vec<SlabRate>,
    rebate: Rebate,
    standard_deduction: Decimal,
}

impl TryFrom<RegimeDefinitionFields> for RegimeDefinition {
    type Error = TaxError;

    fn try_from(fields: RegimeDefinitionFields) -> Result<Self, Self::Error> {
        Self::new(
            fields.regime,
            fields.slabs,
            fields.rebate,
            fields.standard_deduction,
        )
    }
}

impl RegimeDefinition {
    /// Builds a definition and checks its slab structure.
    ///
    /// # Errors
    ///
    /// See [`RegimeDefinition::validate`].
    pub fn new(
        regime: Regime,
        slabs: Vec<SlabRate>,
        rebate: Rebate,
        standard_deduction: Decimal,
    ) -> Result<Self, TaxError> {
        let definition = Self {
            regime,
            slabs,
            rebate,
            standard_deduction,
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Checks that the slabs are ordered, contiguous and cover `[0, ∞)`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidRuleTable`] if:
    /// - there are no slabs
    /// - the first slab does not start at zero
    /// - a slab is empty or inverted (`max <= min`)
    /// - a slab does not start where the previous one ended (gap or overlap)
    /// - a slab other than the last is open-ended, or the last one is bounded
    /// - a rate is outside `0..=100`
    /// - the rebate or standard deduction is negative
    pub fn validate(&self) -> Result<(), TaxError> {
        let regime = self.regime;
        let Some(first) = self.slabs.first() else {
            return Err(TaxError::rule_table(format!("{regime} regime has no slabs")));
        };
        if first.min != Decimal::ZERO {
            return Err(TaxError::rule_table(format!(
                "{regime} regime starts at {} instead of 0",
                first.min
            )));
        }

        let last_index = self.slabs.len() - 1;
        let mut expected_min = Decimal::ZERO;
        for (index, slab) in self.slabs.iter().enumerate() {
            if slab.rate < Decimal::ZERO || slab.rate > Decimal::ONE_HUNDRED {
                return Err(TaxError::rule_table(format!(
                    "{regime} regime slab {index} has rate {} outside 0..=100",
                    slab.rate
                )));
            }
            if slab.min != expected_min {
                return Err(TaxError::rule_table(format!(
                    "{regime} regime slab {index} starts at {} but previous slab ends at {expected_min}",
                    slab.min
                )));
            }
            match (slab.max, index == last_index) {
                (Some(max), false) if max > slab.min => expected_min = max,
                (Some(max), false) => {
                    return Err(TaxError::rule_table(format!(
                        "{regime} regime slab {index} is empty ({} to {max})",
                        slab.min
                    )));
                }
                (None, true) => {}
                (None, false) => {
                    return Err(TaxError::rule_table(format!(
                        "{regime} regime slab {index} is open-ended but not last"
                    )));
                }
                (Some(_), true) => {
                    return Err(TaxError::rule_table(format!(
                        "{regime} regime top slab must be open-ended"
                    )));
                }
            }
        }

        if self.rebate.ceiling < Decimal::ZERO || self.rebate.amount < Decimal::ZERO {
            return Err(TaxError::rule_table(format!(
                "{regime} regime rebate must be non-negative"
            )));
        }
        if self.standard_deduction < Decimal::ZERO {
            return Err(TaxError::rule_table(format!(
                "{regime} regime standard deduction must be non-negative"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn slabs() -> Vec<SlabRate> {
        vec![
            SlabRate::new(dec!(0), Some(dec!(250000)), dec!(0)),
            SlabRate::new(dec!(250000), Some(dec!(500000)), dec!(5)),
            SlabRate::new(dec!(500000), None, dec!(20)),
        ]
    }

    fn rebate() -> Rebate {
        Rebate {
            ceiling: dec!(500000),
            amount: dec!(12500),
        }
    }

    // =========================================================================
    // Regime tests
    // =========================================================================

    #[test]
    fn regime_parses_old_and_new() {
        assert_eq!("old".parse::<Regime>(), Ok(Regime::Old));
        assert_eq!(" NEW ".parse::<Regime>(), Ok(Regime::New));
    }

    #[test]
    fn regime_rejects_other_tags() {
        let result = "legacy".parse::<Regime>();

        assert_eq!(
            result,
            Err(TaxError::UnsupportedRegime("legacy".to_string()))
        );
    }

    // =========================================================================
    // SlabRate tests
    // =========================================================================

    #[test]
    fn portion_of_is_zero_below_slab() {
        let slab = SlabRate::new(dec!(250000), Some(dec!(500000)), dec!(5));

        assert_eq!(slab.portion_of(dec!(200000)), dec!(0));
        assert_eq!(slab.portion_of(dec!(250000)), dec!(0));
    }

    #[test]
    fn portion_of_is_partial_inside_slab() {
        let slab = SlabRate::new(dec!(250000), Some(dec!(500000)), dec!(5));

        assert_eq!(slab.portion_of(dec!(400000)), dec!(150000));
    }

    #[test]
    fn portion_of_is_full_width_above_slab() {
        let slab = SlabRate::new(dec!(250000), Some(dec!(500000)), dec!(5));

        assert_eq!(slab.portion_of(dec!(900000)), dec!(250000));
    }

    #[test]
    fn portion_of_open_slab_takes_remainder() {
        let slab = SlabRate::new(dec!(500000), None, dec!(20));

        assert_eq!(slab.portion_of(dec!(1200000)), dec!(700000));
    }

    // =========================================================================
    // RegimeDefinition::validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_contiguous_slabs() {
        let result = RegimeDefinition::new(Regime::Old, slabs(), rebate(), dec!(50000));

        assert!(result.is_ok());
    }

    #[test]
    fn validate_rejects_empty_slab_list() {
        let result = RegimeDefinition::new(Regime::Old, vec![], rebate(), dec!(50000));

        assert!(matches!(result, Err(TaxError::InvalidRuleTable(_))));
    }

    #[test]
    fn validate_rejects_gap_between_slabs() {
        let mut slabs = slabs();
        slabs[1].min = dec!(260000);

        let result = RegimeDefinition::new(Regime::Old, slabs, rebate(), dec!(50000));

        assert!(matches!(result, Err(TaxError::InvalidRuleTable(_))));
    }

    #[test]
    fn validate_rejects_overlapping_slabs() {
        let mut slabs = slabs();
        slabs[1].min = dec!(200000);

        let result = RegimeDefinition::new(Regime::Old, slabs, rebate(), dec!(50000));

        assert!(matches!(result, Err(TaxError::InvalidRuleTable(_))));
    }

    #[test]
    fn validate_rejects_nonzero_start() {
        let mut slabs = slabs();
        slabs[0].min = dec!(1);

        let result = RegimeDefinition::new(Regime::New, slabs, rebate(), dec!(50000));

        assert!(matches!(result, Err(TaxError::InvalidRuleTable(_))));
    }

    #[test]
    fn validate_rejects_bounded_top_slab() {
        let mut slabs = slabs();
        slabs[2].max = Some(dec!(1000000));

        let result = RegimeDefinition::new(Regime::Old, slabs, rebate(), dec!(50000));

        assert!(matches!(result, Err(TaxError::InvalidRuleTable(_))));
    }

    #[test]
    fn validate_rejects_open_slab_in_middle() {
        let mut slabs = slabs();
        slabs[1].max = None;

        let result = RegimeDefinition::new(Regime::Old, slabs, rebate(), dec!(50000));

        assert!(matches!(result, Err(TaxError::InvalidRuleTable(_))));
    }

    #[test]
    fn validate_rejects_negative_standard_deduction() {
        let result = RegimeDefinition::new(Regime::Old, slabs(), rebate(), dec!(-1));

        assert!(matches!(result, Err(TaxError::InvalidRuleTable(_))));
    }

    // =========================================================================
    // RegimeDefinition deserialization tests
    // =========================================================================

    const NEW_REGIME_TOML: &str = r#"
        regime = "new"
        standard_deduction = "75000"

        [rebate]
        ceiling = "700000"
        amount = "25000"

        [[slabs]]
        min = "0"
        max = "300000"
        rate = "0"

        [[slabs]]
        min = "300000"
        rate = "5"
    "#;

    #[test]
    fn deserialize_accepts_contiguous_slabs() {
        let definition: RegimeDefinition = toml::from_str(NEW_REGIME_TOML).unwrap();

        assert_eq!(definition.regime, Regime::New);
        assert_eq!(definition.slabs[1], SlabRate::new(dec!(300000), None, dec!(5)));
    }

    #[test]
    fn deserialize_validates_slabs() {
        let gapped = NEW_REGIME_TOML.replace("min = \"300000\"", "min = \"400000\"");

        let err = toml::from_str::<RegimeDefinition>(&gapped).unwrap_err().to_string();

        assert!(
            err.contains("slab 1 starts at 400000 but previous slab ends at 300000"),
            "{err}"
        );
    }
}
