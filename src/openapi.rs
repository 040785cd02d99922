use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::routes;
use crate::state::AppState;
use crate::store::{SamplePayload, SampleRecord, StatusPayload, StatusRecord};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "geiger-server-rs",
        description = "Geiger counter telemetry ingest/query API"
    ),
    paths(
        routes::health::healthz_handler,
        routes::ingest::save_data,
        routes::query::all_data,
        routes::query::all_status,
        routes::query::data_by_hour,
        routes::metrics::get_metrics,
        routes::ota::ota_switch_state,
        routes::ota::change_ota_switch,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::ingest::SaveDataRequest,
        SamplePayload,
        StatusPayload,
        SampleRecord,
        StatusRecord,
    ))
)]
struct ApiDoc;

pub fn openapi_json() -> serde_json::Value {
    serde_json::to_value(ApiDoc::openapi()).unwrap_or_default()
}

pub(crate) async fn openapi_handler() -> Json<serde_json::Value> {
    Json(openapi_json())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_handler))
}
