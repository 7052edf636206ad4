//! Per-category fetch-and-normalize orchestration shared by the server
//! and the CLI.

use sosmap_core::{FacilityCategory, FacilityRecord, Region};

use crate::client::NemcClient;
use crate::error::NemcError;
use crate::normalize;

/// Fetches and normalizes one category across the given regions.
///
/// `None` in `regions` means a nationwide fetch. The emergency category
/// fetches the base list and the realtime bed feed concurrently and joins
/// them; the animal feed ignores regions entirely (it has no filter).
///
/// # Errors
///
/// Returns the first [`NemcError`] encountered; partial results are
/// discarded so a sync never stores a half-fetched snapshot.
pub async fn fetch_category(
    client: &NemcClient,
    category: FacilityCategory,
    regions: &[Option<Region>],
) -> Result<Vec<FacilityRecord>, NemcError> {
    let mut records = Vec::new();
    match category {
        FacilityCategory::Emergency => {
            for region in regions {
                let (base, beds) = tokio::try_join!(
                    client.hospital_list(region.as_ref()),
                    client.realtime_beds(region.as_ref()),
                )?;
                records.extend(normalize::normalize_hospitals(&base, &beds));
            }
        }
        FacilityCategory::Pharmacy => {
            for region in regions {
                let items = client.pharmacy_list(region.as_ref()).await?;
                records.extend(normalize::normalize_pharmacies(&items));
            }
        }
        FacilityCategory::Aed => {
            for region in regions {
                let items = client.aed_list(region.as_ref()).await?;
                records.extend(normalize::normalize_aeds(&items));
            }
        }
        FacilityCategory::AnimalHospital => {
            let items = client.animal_hospital_list().await?;
            records.extend(normalize::normalize_animal_hospitals(&items));
        }
    }
    Ok(records)
}
