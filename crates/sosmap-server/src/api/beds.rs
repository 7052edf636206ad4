//! Live emergency-bed availability, fetched per request and never stored.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use sosmap_core::Region;
use sosmap_nemc::{normalize_bed_statuses, NemcClient};

use crate::middleware::RequestId;

use super::{map_feed_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct BedsQuery {
    city: Option<String>,
    district: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct BedStatusItem {
    pub hpid: Option<String>,
    pub name: String,
    pub available_beds: Option<i32>,
    pub note: Option<String>,
    pub reported_at: Option<NaiveDateTime>,
}

pub(super) async fn list_realtime_beds(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BedsQuery>,
) -> Result<Json<ApiResponse<Vec<BedStatusItem>>>, ApiError> {
    let client = NemcClient::from_app_config(&state.config)
        .map_err(|e| map_feed_error(req_id.0.clone(), &e))?;

    let region = query.city.map(|city| Region {
        city,
        district: query.district,
    });

    let items = client
        .realtime_beds(region.as_ref())
        .await
        .map_err(|e| map_feed_error(req_id.0.clone(), &e))?;

    let data = normalize_bed_statuses(&items)
        .into_iter()
        .map(|status| BedStatusItem {
            hpid: status.hpid,
            name: status.name,
            available_beds: status.available_beds,
            note: status.note,
            reported_at: status.reported_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
