use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sosmap_core::{
    facility_status, filter_by_radius, filter_open_now, format_distance, sort_by_distance,
    BusinessStatus, Coord, FacilityCategory, FacilityRecord,
};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_RADIUS_KM: f64 = 3.0;
const MAX_RADIUS_KM: f64 = 50.0;

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    category: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct FacilityItem {
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
    pub beds_available: Option<i32>,
    pub note: Option<String>,
    pub last_verified: DateTime<Utc>,
    pub status: BusinessStatus,
}

pub(super) async fn list_facilities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<FacilityItem>>>, ApiError> {
    let category = parse_category(&req_id, query.category.as_deref())?;
    let limit = normalize_limit(query.limit);

    let rows = sosmap_db::list_by_category(&state.pool, category, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &sosmap_db::DbError::from(e)))?;

    let now = chrono::Local::now().naive_local();
    let data = rows
        .into_iter()
        .filter_map(|row| {
            let public_id = row.public_id;
            let last_verified = row.last_verified;
            let record = row.into_record()?;
            let status = facility_status(&record, now);
            Some(FacilityItem {
                public_id,
                category: record.category.to_string(),
                external_id: record.external_id,
                name: record.name,
                address: record.address,
                phone: record.phone,
                emergency_phone: record.emergency_phone,
                lat: record.lat,
                lng: record.lng,
                is_24h: record.is_24h,
                beds_available: record.beds_available,
                note: record.note,
                last_verified,
                status,
            })
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct NearbyQuery {
    lat: Option<f64>,
    lng: Option<f64>,
    radius_km: Option<f64>,
    category: Option<String>,
    open_now: Option<bool>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct NearbyFacilityItem {
    pub category: String,
    pub external_id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub emergency_phone: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub beds_available: Option<i32>,
    pub note: Option<String>,
    pub distance_km: f64,
    /// Human-readable distance (`"350m"`, `"1.2km"`).
    pub distance: String,
    pub status: BusinessStatus,
}

pub(super) async fn list_nearby_facilities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<NearbyFacilityItem>>>, ApiError> {
    let origin = parse_origin(&req_id, query.lat, query.lng)?;
    let radius_km = parse_radius(&req_id, query.radius_km)?;
    let category = parse_category(&req_id, query.category.as_deref())?;
    let limit = usize::try_from(normalize_limit(query.limit)).unwrap_or(50);

    let rows = sosmap_db::list_facility_pins(&state.pool, category)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &sosmap_db::DbError::from(e)))?;

    let mut records: Vec<FacilityRecord> = rows
        .into_iter()
        .filter_map(sosmap_db::FacilityRow::into_record)
        .collect();

    let now = chrono::Local::now().naive_local();
    if query.open_now.unwrap_or(false) {
        records = filter_open_now(records, now);
    }

    let within = filter_by_radius(records, origin, radius_km);
    let data = sort_by_distance(within, origin)
        .into_iter()
        .take(limit)
        .map(|ranked| {
            let status = facility_status(&ranked.item, now);
            let record = ranked.item;
            NearbyFacilityItem {
                category: record.category.to_string(),
                external_id: record.external_id,
                name: record.name,
                address: record.address,
                phone: record.phone,
                emergency_phone: record.emergency_phone,
                lat: record.lat,
                lng: record.lng,
                beds_available: record.beds_available,
                note: record.note,
                distance_km: ranked.distance_km,
                distance: format_distance(ranked.distance_km),
                status,
            }
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn parse_category(
    req_id: &RequestId,
    raw: Option<&str>,
) -> Result<Option<FacilityCategory>, ApiError> {
    match raw {
        None => Ok(None),
        Some(raw) => raw.parse::<FacilityCategory>().map(Some).map_err(|_| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                format!("unknown category '{raw}'"),
            )
        }),
    }
}

fn parse_origin(req_id: &RequestId, lat: Option<f64>, lng: Option<f64>) -> Result<Coord, ApiError> {
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "lat and lng query parameters are required",
        ));
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "lat/lng out of range",
        ));
    }
    Ok(Coord { lat, lng })
}

fn parse_radius(req_id: &RequestId, radius_km: Option<f64>) -> Result<f64, ApiError> {
    let radius = radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    if !radius.is_finite() || radius <= 0.0 || radius > MAX_RADIUS_KM {
        return Err(ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("radius_km must be within (0, {MAX_RADIUS_KM}]"),
        ));
    }
    Ok(radius)
}
