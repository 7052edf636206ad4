//! Read and write operations for the `facilities` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sosmap_core::{FacilityCategory, FacilityRecord, OperatingHours};

/// Input record for inserting a facility during a category sync.
#[derive(Debug, Clone)]
pub struct NewFacility {
    pub category: FacilityCategory,
    pub external_id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub emergency_phone: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub is_24h: bool,
    pub business_hours: Option<serde_json::Value>,
    pub beds_available: Option<i32>,
    pub note: Option<String>,
}

impl From<FacilityRecord> for NewFacility {
    fn from(record: FacilityRecord) -> Self {
        // Serializing the hours union cannot fail: it is plain strings and
        // arrays. A `None` here only means there were no hours.
        let business_hours = record
            .hours
            .as_ref()
            .and_then(|hours| serde_json::to_value(hours).ok());

        Self {
            category: record.category,
            external_id: record.external_id,
            name: record.name,
            address: record.address,
            phone: record.phone,
            emergency_phone: record.emergency_phone,
            lat: record.lat,
            lng: record.lng,
            is_24h: record.is_24h,
            business_hours,
            beds_available: record.beds_available,
            note: record.note,
        }
    }
}

/// A row from the `facilities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacilityRow {
    pub id: i64,
    pub public_id: Uuid,
    pub category: String,
    pub external_id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub emergency_phone: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub is_24h: bool,
    pub business_hours: Option<serde_json::Value>,
    pub beds_available: Option<i32>,
    pub note: Option<String>,
    pub last_verified: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl FacilityRow {
    /// Rebuilds the canonical record for status and ranking.
    ///
    /// Returns `None` only when the stored category string is not one of
    /// the known values. Malformed `business_hours` JSON degrades to no
    /// hours rather than an error: downstream status must always answer.
    #[must_use]
    pub fn into_record(self) -> Option<FacilityRecord> {
        let category: FacilityCategory = self.category.parse().ok()?;
        let hours = self
            .business_hours
            .and_then(|value| serde_json::from_value::<OperatingHours>(value).ok());

        Some(FacilityRecord {
            category,
            external_id: self.external_id,
            name: self.name,
            address: self.address,
            phone: self.phone,
            emergency_phone: self.emergency_phone,
            lat: self.lat,
            lng: self.lng,
            is_24h: self.is_24h,
            hours,
            beds_available: self.beds_available,
            note: self.note,
        })
    }
}

/// Per-category row count for stats output.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryCountRow {
    pub category: String,
    pub count: i64,
}

/// Replace every row of one category with a fresh feed snapshot.
///
/// Runs a transactional `DELETE` + single `INSERT … SELECT FROM UNNEST(…)`
/// so the swap is atomic and one round-trip regardless of batch size.
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the transaction fails; nothing is changed in
/// that case.
pub async fn replace_category(
    pool: &PgPool,
    category: FacilityCategory,
    facilities: &[NewFacility],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM facilities WHERE category = $1")
        .bind(category.as_str())
        .execute(&mut *tx)
        .await?;

    if facilities.is_empty() {
        tx.commit().await?;
        return Ok(0);
    }

    // Collect each column into a parallel Vec for UNNEST binding.
    let mut external_ids: Vec<Option<String>> = Vec::with_capacity(facilities.len());
    let mut names: Vec<String> = Vec::with_capacity(facilities.len());
    let mut addresses: Vec<Option<String>> = Vec::with_capacity(facilities.len());
    let mut phones: Vec<Option<String>> = Vec::with_capacity(facilities.len());
    let mut emergency_phones: Vec<Option<String>> = Vec::with_capacity(facilities.len());
    let mut lats: Vec<f64> = Vec::with_capacity(facilities.len());
    let mut lngs: Vec<f64> = Vec::with_capacity(facilities.len());
    let mut is_24hs: Vec<bool> = Vec::with_capacity(facilities.len());
    let mut business_hours: Vec<Option<serde_json::Value>> = Vec::with_capacity(facilities.len());
    let mut beds: Vec<Option<i32>> = Vec::with_capacity(facilities.len());
    let mut notes: Vec<Option<String>> = Vec::with_capacity(facilities.len());

    for facility in facilities {
        external_ids.push(facility.external_id.clone());
        names.push(facility.name.clone());
        addresses.push(facility.address.clone());
        phones.push(facility.phone.clone());
        emergency_phones.push(facility.emergency_phone.clone());
        lats.push(facility.lat);
        lngs.push(facility.lng);
        is_24hs.push(facility.is_24h);
        business_hours.push(facility.business_hours.clone());
        beds.push(facility.beds_available);
        notes.push(facility.note.clone());
    }

    let result = sqlx::query(
        "INSERT INTO facilities \
             (category, external_id, name, address, phone, emergency_phone, \
              lat, lng, is_24h, business_hours, beds_available, note) \
         SELECT $1, * FROM UNNEST(\
              $2::text[], $3::text[], $4::text[], $5::text[], $6::text[], \
              $7::float8[], $8::float8[], $9::bool[], $10::jsonb[], \
              $11::int4[], $12::text[])",
    )
    .bind(category.as_str())
    .bind(&external_ids)
    .bind(&names)
    .bind(&addresses)
    .bind(&phones)
    .bind(&emergency_phones)
    .bind(&lats)
    .bind(&lngs)
    .bind(&is_24hs)
    .bind(&business_hours)
    .bind(&beds)
    .bind(&notes)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(result.rows_affected())
}

/// List facilities, optionally filtered to one category, newest-verified
/// first.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_by_category(
    pool: &PgPool,
    category: Option<FacilityCategory>,
    limit: i64,
) -> Result<Vec<FacilityRow>, sqlx::Error> {
    if let Some(category) = category {
        sqlx::query_as::<_, FacilityRow>(
            "SELECT id, public_id, category, external_id, name, address, phone, \
                    emergency_phone, lat, lng, is_24h, business_hours, \
                    beds_available, note, last_verified, created_at \
             FROM facilities \
             WHERE category = $1 \
             ORDER BY last_verified DESC, id \
             LIMIT $2",
        )
        .bind(category.as_str())
        .bind(limit)
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as::<_, FacilityRow>(
            "SELECT id, public_id, category, external_id, name, address, phone, \
                    emergency_phone, lat, lng, is_24h, business_hours, \
                    beds_available, note, last_verified, created_at \
             FROM facilities \
             ORDER BY last_verified DESC, id \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

/// Fetch every facility of a category (or all) for map/ranking use.
///
/// Coordinates are NOT NULL by schema, so every returned row is mappable.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_facility_pins(
    pool: &PgPool,
    category: Option<FacilityCategory>,
) -> Result<Vec<FacilityRow>, sqlx::Error> {
    if let Some(category) = category {
        sqlx::query_as::<_, FacilityRow>(
            "SELECT id, public_id, category, external_id, name, address, phone, \
                    emergency_phone, lat, lng, is_24h, business_hours, \
                    beds_available, note, last_verified, created_at \
             FROM facilities \
             WHERE category = $1 \
             ORDER BY id",
        )
        .bind(category.as_str())
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as::<_, FacilityRow>(
            "SELECT id, public_id, category, external_id, name, address, phone, \
                    emergency_phone, lat, lng, is_24h, business_hours, \
                    beds_available, note, last_verified, created_at \
             FROM facilities \
             ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }
}

/// Per-category facility counts, descending.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_by_category(pool: &PgPool) -> Result<Vec<CategoryCountRow>, sqlx::Error> {
    sqlx::query_as::<_, CategoryCountRow>(
        "SELECT category, COUNT(*) AS count \
         FROM facilities \
         GROUP BY category \
         ORDER BY count DESC",
    )
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sosmap_core::WeeklyHours;

    fn record() -> FacilityRecord {
        FacilityRecord {
            category: FacilityCategory::Pharmacy,
            external_id: Some("C1100001".to_owned()),
            name: "Central Pharmacy".to_owned(),
            address: Some("1 Sejong-daero".to_owned()),
            phone: Some("02-120".to_owned()),
            emergency_phone: None,
            lat: 37.5665,
            lng: 126.9780,
            is_24h: false,
            hours: Some(OperatingHours::Weekly(WeeklyHours {
                mon: Some("0900-1800".to_owned()),
                ..WeeklyHours::default()
            })),
            beds_available: None,
            note: None,
        }
    }

    #[test]
    fn new_facility_serializes_hours_to_json() {
        let new = NewFacility::from(record());
        let value = new.business_hours.expect("hours json");
        assert_eq!(value["form"], "weekly");
        assert_eq!(value["mon"], "0900-1800");
    }

    #[test]
    fn row_round_trips_to_record() {
        let new = NewFacility::from(record());
        let row = FacilityRow {
            id: 1,
            public_id: Uuid::new_v4(),
            category: new.category.to_string(),
            external_id: new.external_id,
            name: new.name,
            address: new.address,
            phone: new.phone,
            emergency_phone: new.emergency_phone,
            lat: new.lat,
            lng: new.lng,
            is_24h: new.is_24h,
            business_hours: new.business_hours,
            beds_available: new.beds_available,
            note: new.note,
            last_verified: Utc::now(),
            created_at: Utc::now(),
        };

        let record = row.into_record().expect("record");
        assert_eq!(record.category, FacilityCategory::Pharmacy);
        let Some(OperatingHours::Weekly(weekly)) = record.hours else {
            panic!("expected weekly hours");
        };
        assert_eq!(weekly.mon.as_deref(), Some("0900-1800"));
    }

    #[test]
    fn malformed_stored_hours_degrade_to_none() {
        let row = FacilityRow {
            id: 1,
            public_id: Uuid::new_v4(),
            category: "PHARMACY".to_owned(),
            external_id: None,
            name: "Odd Pharmacy".to_owned(),
            address: None,
            phone: None,
            emergency_phone: None,
            lat: 37.0,
            lng: 127.0,
            is_24h: false,
            business_hours: Some(serde_json::json!({"form": "lunar", "phase": 3})),
            beds_available: None,
            note: None,
            last_verified: Utc::now(),
            created_at: Utc::now(),
        };

        let record = row.into_record().expect("record");
        assert!(record.hours.is_none());
    }

    #[test]
    fn unknown_category_yields_no_record() {
        let row = FacilityRow {
            id: 1,
            public_id: Uuid::new_v4(),
            category: "CLINIC".to_owned(),
            external_id: None,
            name: "Mystery".to_owned(),
            address: None,
            phone: None,
            emergency_phone: None,
            lat: 37.0,
            lng: 127.0,
            is_24h: false,
            business_hours: None,
            beds_available: None,
            note: None,
            last_verified: Utc::now(),
            created_at: Utc::now(),
        };
        assert!(row.into_record().is_none());
    }
}
