//! Canonical facility record shared by every layer.
//!
//! Upstream feeds arrive in several loosely-typed shapes; the ingestion
//! layer maps each of them into [`FacilityRecord`] before anything else
//! sees the data. Status and ranking only ever operate on this one shape.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::{Coord, Located};
use crate::hours::OperatingHours;
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityCategory {
    Emergency,
    Pharmacy,
    AnimalHospital,
    Aed,
}

impl FacilityCategory {
    /// The wire/database form of the category (`"EMERGENCY"`, `"PHARMACY"`,
    /// `"ANIMAL_HOSPITAL"`, `"AED"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FacilityCategory::Emergency => "EMERGENCY",
            FacilityCategory::Pharmacy => "PHARMACY",
            FacilityCategory::AnimalHospital => "ANIMAL_HOSPITAL",
            FacilityCategory::Aed => "AED",
        }
    }

    #[must_use]
    pub fn all() -> [FacilityCategory; 4] {
        [
            FacilityCategory::Emergency,
            FacilityCategory::Pharmacy,
            FacilityCategory::AnimalHospital,
            FacilityCategory::Aed,
        ]
    }
}

impl std::fmt::Display for FacilityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacilityCategory {
    type Err = CoreError;

    /// Accepts the wire form case-insensitively, with `-` and `_`
    /// interchangeable (`"animal-hospital"` parses).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "EMERGENCY" => Ok(FacilityCategory::Emergency),
            "PHARMACY" => Ok(FacilityCategory::Pharmacy),
            "ANIMAL_HOSPITAL" => Ok(FacilityCategory::AnimalHospital),
            "AED" => Ok(FacilityCategory::Aed),
            _ => Err(CoreError::InvalidCategory(s.to_owned())),
        }
    }
}

/// One normalized facility: a hospital, pharmacy, animal hospital, or AED.
///
/// Records without coordinates are dropped during normalization, so `lat`
/// and `lng` are always present here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub category: FacilityCategory,
    /// Upstream identifier (`hpid` for NEMC feeds, `serialSeq` for AEDs).
    #[serde(default)]
    pub external_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Direct emergency-room line (`dutyTel3`), hospitals only.
    #[serde(default)]
    pub emergency_phone: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub is_24h: bool,
    #[serde(default)]
    pub hours: Option<OperatingHours>,
    /// Available emergency beds from the realtime feed, hospitals only.
    #[serde(default)]
    pub beds_available: Option<i32>,
    /// Free-text situation message from the realtime feed (`hv1`).
    #[serde(default)]
    pub note: Option<String>,
}

impl Located for FacilityRecord {
    fn coord(&self) -> Coord {
        Coord {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_form_round_trips() {
        for category in FacilityCategory::all() {
            let parsed: FacilityCategory = category.as_str().parse().expect("parse");
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn category_parse_is_lenient_about_case_and_hyphens() {
        assert_eq!(
            "animal-hospital".parse::<FacilityCategory>().expect("parse"),
            FacilityCategory::AnimalHospital
        );
        assert_eq!(
            "pharmacy".parse::<FacilityCategory>().expect("parse"),
            FacilityCategory::Pharmacy
        );
    }

    #[test]
    fn category_parse_rejects_unknown() {
        assert!("CLINIC".parse::<FacilityCategory>().is_err());
    }

    #[test]
    fn category_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&FacilityCategory::AnimalHospital).expect("serialize");
        assert_eq!(json, "\"ANIMAL_HOSPITAL\"");
    }
}
