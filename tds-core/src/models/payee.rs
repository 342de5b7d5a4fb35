use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TaxError;

/// Category of the payment recipient. Drives rate, threshold and surcharge lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayeeType {
    Individual,
    Huf,
    Company,
    SeniorCitizen,
    Others,
}

impl PayeeType {
    pub const ALL: [PayeeType; 5] = [
        Self::Individual,
        Self::Huf,
        Self::Company,
        Self::SeniorCitizen,
        Self::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Huf => "huf",
            Self::Company => "company",
            Self::SeniorCitizen => "senior_citizen",
            Self::Others => "others",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Huf => "Hindu Undivided Family",
            Self::Company => "Company",
            Self::SeniorCitizen => "Senior Citizen",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for PayeeType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayeeType {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "individual" => Ok(Self::Individual),
            "huf" => Ok(Self::Huf),
            "company" => Ok(Self::Company),
            "senior_citizen" | "senior" => Ok(Self::SeniorCitizen),
            "others" | "other" => Ok(Self::Others),
            _ => Err(TaxError::validation(format!("unknown payee type '{s}'"))),
        }
    }
}

/// Asset class of a rent payment (section 194I only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    PlantMachinery,
    LandBuilding,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlantMachinery => "plant_machinery",
            Self::LandBuilding => "land_building",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "plant_machinery" | "machinery" => Ok(Self::PlantMachinery),
            "land_building" | "building" | "land" => Ok(Self::LandBuilding),
            _ => Err(TaxError::validation(format!("unknown asset class '{s}'"))),
        }
    }
}
