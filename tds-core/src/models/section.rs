use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TaxError;
use crate::models::{AssetClass, PayeeType};

/// Withholding sections known to the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionCode {
    #[serde(rename = "193")]
    S193,
    #[serde(rename = "194")]
    S194,
    #[serde(rename = "194A")]
    S194A,
    #[serde(rename = "194C")]
    S194C,
    #[serde(rename = "194D")]
    S194D,
    #[serde(rename = "194H")]
    S194H,
    #[serde(rename = "194I")]
    S194I,
    #[serde(rename = "194J")]
    S194J,
    #[serde(rename = "194Q")]
    S194Q,
}

impl SectionCode {
    pub const ALL: [SectionCode; 9] = [
        Self::S193,
        Self::S194,
        Self::S194A,
        Self::S194C,
        Self::S194D,
        Self::S194H,
        Self::S194I,
        Self::S194J,
        Self::S194Q,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S193 => "193",
            Self::S194 => "194",
            Self::S194A => "194A",
            Self::S194C => "194C",
            Self::S194D => "194D",
            Self::S194H => "194H",
            Self::S194I => "194I",
            Self::S194J => "194J",
            Self::S194Q => "194Q",
        }
    }

    /// Rent is the only section whose rates and limits depend on the asset class.
    pub fn requires_asset_class(&self) -> bool {
        matches!(self, Self::S194I)
    }
}

impl fmt::Display for SectionCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionCode {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == normalized)
            .ok_or_else(|| TaxError::InvalidSection(s.to_string()))
    }
}

/// One withholding rate per payee type, read through an exhaustive match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeRates {
    pub individual: Decimal,
    pub huf: Decimal,
    pub company: Decimal,
    pub senior_citizen: Decimal,
    pub others: Decimal,
}

impl PayeeRates {
    /// Same rate for every payee type.
    pub fn flat(rate: Decimal) -> Self {
        Self {
            individual: rate,
            huf: rate,
            company: rate,
            senior_citizen: rate,
            others: rate,
        }
    }

    /// Individuals, HUFs and senior citizens at one rate; companies and others at another.
    pub fn split(
        non_corporate: Decimal,
        corporate: Decimal,
    ) -> Self {
        Self {
            individual: non_corporate,
            huf: non_corporate,
            company: corporate,
            senior_citizen: non_corporate,
            others: corporate,
        }
    }

    pub fn rate_for(
        &self,
        payee: PayeeType,
    ) -> Decimal {
        match payee {
            PayeeType::Individual => self.individual,
            PayeeType::Huf => self.huf,
            PayeeType::Company => self.company,
            PayeeType::SeniorCitizen => self.senior_citizen,
            PayeeType::Others => self.others,
        }
    }

    fn all(&self) -> [Decimal; 5] {
        [
            self.individual,
            self.huf,
            self.company,
            self.senior_citizen,
            self.others,
        ]
    }
}

/// Rate table of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateTable {
    Flat(PayeeRates),
    ByAssetClass {
        plant_machinery: PayeeRates,
        land_building: PayeeRates,
    },
}

impl RateTable {
    /// Resolves the table rate for a payee and optional asset class.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] when an asset-class table is read
    /// without an asset class.
    pub fn rate_for(
        &self,
        payee: PayeeType,
        asset_class: Option<AssetClass>,
    ) -> Result<Decimal, TaxError> {
        match (self, asset_class) {
            (Self::Flat(rates), _) => Ok(rates.rate_for(payee)),
            (
                Self::ByAssetClass {
                    plant_machinery, ..
                },
                Some(AssetClass::PlantMachinery),
            ) => Ok(plant_machinery.rate_for(payee)),
            (Self::ByAssetClass { land_building, .. }, Some(AssetClass::LandBuilding)) => {
                Ok(land_building.rate_for(payee))
            }
            (Self::ByAssetClass { .. }, None) => Err(TaxError::validation(
                "asset class is required to resolve a rent rate",
            )),
        }
    }

    fn all_rates(&self) -> Vec<Decimal> {
        match self {
            Self::Flat(rates) => rates.all().to_vec(),
            Self::ByAssetClass {
                plant_machinery,
                land_building,
            } => plant_machinery
                .all()
                .into_iter()
                .chain(land_building.all())
                .collect(),
        }
    }
}

/// Which limit of a [`ThresholdTable`] was compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    SinglePayment,
    AggregateAnnual,
    SeniorCitizen,
    AssetClass(AssetClass),
    /// The section withholds on every payment.
    NoThreshold,
}

impl ThresholdKind {
    pub fn describe(&self) -> String {
        match self {
            Self::SinglePayment => "single-payment threshold".to_string(),
            Self::AggregateAnnual => "aggregate annual threshold".to_string(),
            Self::SeniorCitizen => "senior-citizen threshold".to_string(),
            Self::AssetClass(class) => format!("{class} threshold"),
            Self::NoThreshold => "no threshold".to_string(),
        }
    }
}

/// Payment limits below which a section does not withhold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub single_payment: Option<Decimal>,
    pub aggregate_annual: Option<Decimal>,
    pub senior_citizen: Option<Decimal>,
    pub plant_machinery: Option<Decimal>,
    pub land_building: Option<Decimal>,
}

impl ThresholdTable {
    pub fn single(limit: Decimal) -> Self {
        Self {
            single_payment: Some(limit),
            ..Self::default()
        }
    }

    pub fn aggregate(limit: Decimal) -> Self {
        Self {
            aggregate_annual: Some(limit),
            ..Self::default()
        }
    }

    pub fn with_aggregate(
        mut self,
        limit: Decimal,
    ) -> Self {
        self.aggregate_annual = Some(limit);
        self
    }

    pub fn with_senior_citizen(
        mut self,
        limit: Decimal,
    ) -> Self {
        self.senior_citizen = Some(limit);
        self
    }

    pub fn with_asset_classes(
        mut self,
        plant_machinery: Decimal,
        land_building: Decimal,
    ) -> Self {
        self.plant_machinery = Some(plant_machinery);
        self.land_building = Some(land_building);
        self
    }

    pub fn for_asset_class(
        &self,
        asset_class: AssetClass,
    ) -> Option<Decimal> {
        match asset_class {
            AssetClass::PlantMachinery => self.plant_machinery,
            AssetClass::LandBuilding => self.land_building,
        }
    }

    fn all(&self) -> [Option<Decimal>; 5] {
        [
            self.single_payment,
            self.aggregate_annual,
            self.senior_citizen,
            self.plant_machinery,
            self.land_building,
        ]
    }
}

/// A withholding rule: rates, thresholds and applicability notes for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingSection {
    pub code: SectionCode,
    pub name: String,
    pub rates: RateTable,
    pub thresholds: ThresholdTable,
    pub notes: String,
}

impl WithholdingSection {
    /// Checks the structural rules of a section.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidRuleTable`] if:
    /// - a rate is outside `0..=100`
    /// - a threshold is negative
    /// - the rent section lacks an asset-class rate table, or another section has one
    pub fn validate(&self) -> Result<(), TaxError> {
        let hundred = Decimal::ONE_HUNDRED;
        if let Some(rate) = self
            .rates
            .all_rates()
            .into_iter()
            .find(|r| *r < Decimal::ZERO || *r > hundred)
        {
            return Err(TaxError::rule_table(format!(
                "section {} has rate {rate} outside 0..=100",
                self.code
            )));
        }
        if let Some(limit) = self
            .thresholds
            .all()
            .into_iter()
            .flatten()
            .find(|l| *l < Decimal::ZERO)
        {
            return Err(TaxError::rule_table(format!(
                "section {} has negative threshold {limit}",
                self.code
            )));
        }
        let by_asset_class = matches!(self.rates, RateTable::ByAssetClass { .. });
        if by_asset_class != self.code.requires_asset_class() {
            return Err(TaxError::rule_table(format!(
                "section {} has the wrong rate table shape",
                self.code
            )));
        }
        Ok(())
    }

    pub fn summary(&self) -> SectionSummary {
        SectionSummary {
            code: self.code,
            name: self.name.clone(),
            notes: self.notes.clone(),
            requires_asset_class: self.code.requires_asset_class(),
        }
    }
}

/// Section metadata without the rule tables, for populating choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub code: SectionCode,
    pub name: String,
    pub notes: String,
    pub requires_asset_class: bool,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn rent_section() -> WithholdingSection {
        WithholdingSection {
            code: SectionCode::S194I,
            name: "Rent".to_string(),
            rates: RateTable::ByAssetClass {
                plant_machinery: PayeeRates::flat(dec!(2)),
                land_building: PayeeRates::flat(dec!(10)),
            },
            thresholds: ThresholdTable::aggregate(dec!(240000)),
            notes: String::new(),
        }
    }

    // =========================================================================
    // SectionCode tests
    // =========================================================================

    #[test]
    fn section_code_parses_case_insensitively() {
        assert_eq!("194j".parse::<SectionCode>(), Ok(SectionCode::S194J));
        assert_eq!(" 194 C ".parse::<SectionCode>(), Ok(SectionCode::S194C));
        assert_eq!("194".parse::<SectionCode>(), Ok(SectionCode::S194));
    }

    #[test]
    fn section_code_rejects_unknown_code() {
        let result = "195Z".parse::<SectionCode>();

        assert_eq!(result, Err(TaxError::InvalidSection("195Z".to_string())));
    }

    #[test]
    fn section_code_round_trips_every_value() {
        for code in SectionCode::ALL {
            assert_eq!(code.as_str().parse::<SectionCode>(), Ok(code));
        }
    }

    // =========================================================================
    // RateTable tests
    // =========================================================================

    #[test]
    fn split_rates_separate_corporate_payees() {
        let rates = PayeeRates::split(dec!(1), dec!(2));

        assert_eq!(rates.rate_for(PayeeType::Individual), dec!(1));
        assert_eq!(rates.rate_for(PayeeType::Huf), dec!(1));
        assert_eq!(rates.rate_for(PayeeType::Company), dec!(2));
        assert_eq!(rates.rate_for(PayeeType::Others), dec!(2));
    }

    #[test]
    fn asset_class_table_resolves_by_class() {
        let section = rent_section();

        let machinery = section
            .rates
            .rate_for(PayeeType::Company, Some(AssetClass::PlantMachinery));
        let building = section
            .rates
            .rate_for(PayeeType::Company, Some(AssetClass::LandBuilding));

        assert_eq!(machinery, Ok(dec!(2)));
        assert_eq!(building, Ok(dec!(10)));
    }

    #[test]
    fn asset_class_table_requires_asset_class() {
        let section = rent_section();

        let result = section.rates.rate_for(PayeeType::Individual, None);

        assert!(matches!(result, Err(TaxError::Validation(_))));
    }

    // =========================================================================
    // WithholdingSection::validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_rent_section() {
        assert_eq!(rent_section().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_rate_above_hundred() {
        let mut section = rent_section();
        section.rates = RateTable::ByAssetClass {
            plant_machinery: PayeeRates::flat(dec!(120)),
            land_building: PayeeRates::flat(dec!(10)),
        };

        assert!(matches!(
            section.validate(),
            Err(TaxError::InvalidRuleTable(_))
        ));
    }

    #[test]
    fn validate_rejects_negative_threshold() {
        let mut section = rent_section();
        section.thresholds = ThresholdTable::single(dec!(-1));

        assert!(matches!(
            section.validate(),
            Err(TaxError::InvalidRuleTable(_))
        ));
    }

    #[test]
    fn validate_rejects_flat_table_for_rent() {
        let mut section = rent_section();
        section.rates = RateTable::Flat(PayeeRates::flat(dec!(10)));

        assert!(matches!(
            section.validate(),
            Err(TaxError::InvalidRuleTable(_))
        ));
    }
}
