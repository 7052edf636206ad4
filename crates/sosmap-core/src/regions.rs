//! Sync-region configuration.
//!
//! The public-data feeds are queried per administrative region (city plus
//! optional district). The region list lives in a YAML file so deployments
//! can scope how much of the country they sync.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One region to sync: a city (`Q0`/`STAGE1` in the feeds) and an optional
/// district (`Q1`/`STAGE2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub city: String,
    #[serde(default)]
    pub district: Option<String>,
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.district {
            Some(district) => write!(f, "{} {district}", self.city),
            None => write!(f, "{}", self.city),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegionsFile {
    pub regions: Vec<Region>,
}

/// Load and validate the region list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_regions(path: &Path) -> Result<RegionsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let regions_file: RegionsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RegionsFileParse)?;

    validate_regions(&regions_file)?;

    Ok(regions_file)
}

fn validate_regions(regions_file: &RegionsFile) -> Result<(), ConfigError> {
    if regions_file.regions.is_empty() {
        return Err(ConfigError::Validation(
            "regions file must list at least one region".to_owned(),
        ));
    }

    let mut seen = HashSet::new();
    for region in &regions_file.regions {
        if region.city.trim().is_empty() {
            return Err(ConfigError::Validation(
                "region city must be non-empty".to_owned(),
            ));
        }
        if let Some(district) = &region.district {
            if district.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "region '{}' has an empty district; omit the field instead",
                    region.city
                )));
            }
        }

        let key = (region.city.clone(), region.district.clone());
        if !seen.insert(key) {
            return Err(ConfigError::Validation(format!(
                "duplicate region: '{region}'"
            )));
        }
    }

    Ok(())
}
