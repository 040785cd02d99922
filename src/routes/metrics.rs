use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use crate::error::map_store_error;
use crate::state::AppState;
use crate::store::Store;

/// Fixed gauge label. A multi-sensor identity model was never built; the
/// scraper contract depends on this exact text.
const SENSOR_LABEL: &str = "GeigerCounter1";

pub(crate) async fn root_redirect() -> Redirect {
    Redirect::to("/metrics")
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "metrics",
    responses(
        (status = 200, description = "Latest-value gauge lines, one per field", body = String, content_type = "text/plain"),
        (status = 404, description = "No data ingested yet")
    )
)]
pub(crate) async fn get_metrics(
    State(store): State<Store>,
) -> Result<String, (StatusCode, String)> {
    let sample = store.latest_sample().await.map_err(map_store_error)?;
    let status = store.latest_status().await.map_err(map_store_error)?;
    let (Some(sample), Some(status)) = (sample, status) else {
        return Err((StatusCode::NOT_FOUND, "No data available".to_string()));
    };

    // Line order is a compatibility contract: the six time components,
    // Duration before Tick, then the three voltages.
    let lines = [
        ("Year", sample.year.to_string()),
        ("Month", sample.month.to_string()),
        ("Day", sample.day.to_string()),
        ("Hour", sample.hour.to_string()),
        ("Minute", sample.minute.to_string()),
        ("Second", sample.second.to_string()),
        ("Duration", sample.duration.to_string()),
        ("Tick", sample.tick.to_string()),
        ("Solar_Panel_Voltage", gauge_value(status.solar_panel_voltage)),
        (
            "Solar_Panel_Boosted_Voltage",
            gauge_value(status.solar_panel_boosted_voltage),
        ),
        ("Battery_Voltage", gauge_value(status.battery_voltage)),
    ];

    let mut body = String::new();
    for (name, value) in lines {
        body.push_str(&format!("{name}{{id=\"{SENSOR_LABEL}\"}} {value}\n"));
    }
    Ok(body)
}

// Debug formatting keeps the trailing `.0` on whole volts (`4.0`, not `4`).
fn gauge_value(value: f64) -> String {
    format!("{value:?}")
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root_redirect))
        .route("/metrics", get(get_metrics))
}
