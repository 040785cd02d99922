use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::map_store_error;
use crate::state::AppState;
use crate::store::{SampleRecord, StatusRecord, Store};

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub(crate) struct HourQuery {
    /// Sensor-reported hour field to match exactly.
    hour: Option<String>,
}

#[utoipa::path(
    get,
    path = "/alldata",
    tag = "query",
    responses((status = 200, description = "Full sample history", body = Vec<SampleRecord>))
)]
pub(crate) async fn all_data(
    State(store): State<Store>,
) -> Result<Json<Vec<SampleRecord>>, (StatusCode, String)> {
    let rows = store.all_samples().await.map_err(map_store_error)?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/allstatus",
    tag = "query",
    responses((status = 200, description = "Full status history", body = Vec<StatusRecord>))
)]
pub(crate) async fn all_status(
    State(store): State<Store>,
) -> Result<Json<Vec<StatusRecord>>, (StatusCode, String)> {
    let rows = store.all_status().await.map_err(map_store_error)?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/data",
    tag = "query",
    params(HourQuery),
    responses(
        (status = 200, description = "Samples for the given hour", body = Vec<SampleRecord>),
        (status = 400, description = "Missing or invalid hour")
    )
)]
pub(crate) async fn data_by_hour(
    State(store): State<Store>,
    Query(query): Query<HourQuery>,
) -> Result<Json<Vec<SampleRecord>>, (StatusCode, String)> {
    let raw = query
        .hour
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Missing hour parameter".to_string()))?;
    let hour = raw
        .parse::<i64>()
        .map_err(|_| (StatusCode::BAD_REQUEST, "hour must be an integer".to_string()))?;

    let rows = store.samples_by_hour(hour).await.map_err(map_store_error)?;
    Ok(Json(rows))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/alldata", get(all_data))
        .route("/allstatus", get(all_status))
        .route("/data", get(data_by_hour))
}
