use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::error::map_store_error;
use crate::state::AppState;
use crate::store::{SamplePayload, StatusPayload};

pub(crate) const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub(crate) struct SaveDataRequest {
    pub(crate) status: StatusPayload,
    pub(crate) data: SamplePayload,
}

fn authorize(headers: &HeaderMap, expected: &str) -> Result<(), (StatusCode, String)> {
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
    }
}

#[utoipa::path(
    post,
    path = "/savedata",
    tag = "ingest",
    request_body = SaveDataRequest,
    params(("x-api-key" = String, Header, description = "Static sensor API key")),
    responses(
        (status = 200, description = "Report persisted"),
        (status = 400, description = "Malformed report"),
        (status = 401, description = "Unauthorized")
    )
)]
pub(crate) async fn save_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<&'static str, (StatusCode, String)> {
    authorize(&headers, &state.config.api_key)?;

    // Decoded in two steps so a missing or mistyped field maps to a 400
    // with a reason instead of the extractor's default rejection.
    let report: SaveDataRequest = serde_json::from_value(body)
        .map_err(|err| (StatusCode::BAD_REQUEST, format!("Invalid report: {err}")))?;

    let server_timestamp = crate::time::server_timestamp_now();
    state
        .store
        .insert_report(report.data, report.status, server_timestamp)
        .await
        .map_err(map_store_error)?;

    tracing::debug!("sensor report persisted");
    Ok("Data saved successfully")
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/savedata", post(save_data))
}
