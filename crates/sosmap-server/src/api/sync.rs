//! Sync endpoints: fetch a feed, normalize, and swap the stored category.

use axum::{Extension, Json};
use axum::extract::State;
use serde::Serialize;

use sosmap_core::{FacilityCategory, Region};
use sosmap_nemc::NemcClient;

use crate::middleware::RequestId;

use super::{map_db_error, map_feed_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SyncResult {
    pub category: String,
    pub fetched: usize,
    pub stored: u64,
}

pub(super) async fn sync_hospitals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SyncResult>>, ApiError> {
    let result = run_sync(&state, &req_id, FacilityCategory::Emergency).await?;
    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn sync_pharmacies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SyncResult>>, ApiError> {
    let result = run_sync(&state, &req_id, FacilityCategory::Pharmacy).await?;
    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn sync_aeds(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SyncResult>>, ApiError> {
    let result = run_sync(&state, &req_id, FacilityCategory::Aed).await?;
    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn sync_animal_hospitals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SyncResult>>, ApiError> {
    let result = run_sync(&state, &req_id, FacilityCategory::AnimalHospital).await?;
    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Sync every category in sequence, reporting per-category results. One
/// category failing fails the request; earlier categories stay synced
/// since each swap is its own transaction.
pub(super) async fn sync_all(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<SyncResult>>>, ApiError> {
    let mut results = Vec::with_capacity(4);
    for category in FacilityCategory::all() {
        results.push(run_sync(&state, &req_id, category).await?);
    }
    Ok(Json(ApiResponse {
        data: results,
        meta: ResponseMeta::new(req_id.0),
    }))
}

async fn run_sync(
    state: &AppState,
    req_id: &RequestId,
    category: FacilityCategory,
) -> Result<SyncResult, ApiError> {
    let client = NemcClient::from_app_config(&state.config)
        .map_err(|e| map_feed_error(req_id.0.clone(), &e))?;
    let regions = sync_regions(&state.config);

    let records = sosmap_nemc::fetch_category(&client, category, &regions)
        .await
        .map_err(|e| map_feed_error(req_id.0.clone(), &e))?;
    let fetched = records.len();

    let new_facilities: Vec<sosmap_db::NewFacility> =
        records.into_iter().map(Into::into).collect();
    let stored = sosmap_db::replace_category(&state.pool, category, &new_facilities)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &sosmap_db::DbError::from(e)))?;

    tracing::info!(category = %category, fetched, stored, "category synced");

    Ok(SyncResult {
        category: category.to_string(),
        fetched,
        stored,
    })
}

/// Resolves the configured sync regions. A missing or invalid regions file
/// degrades to one nationwide fetch rather than blocking the sync.
fn sync_regions(config: &sosmap_core::AppConfig) -> Vec<Option<Region>> {
    match sosmap_core::load_regions(&config.regions_path) {
        Ok(file) => file.regions.into_iter().map(Some).collect(),
        Err(e) => {
            tracing::warn!(
                path = %config.regions_path.display(),
                error = %e,
                "regions file unavailable, syncing nationwide"
            );
            vec![None]
        }
    }
}
