use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::ota::OtaSwitch;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub(crate) struct ChangeStateQuery {
    state: Option<String>,
}

pub(crate) async fn ota_switch_page(State(ota): State<OtaSwitch>) -> Html<String> {
    let status = ota.status();
    let state_label = if status.enabled { "ON" } else { "OFF" };
    let last_toggled = status
        .last_toggled
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| "Never".to_string());
    Html(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
             <title>OTA Toggle</title>\n\
         </head>\n\
         <body>\n\
             <h1>OTA Switch: {state_label}</h1>\n\
             <p>Last OTA time: {last_toggled}</p>\n\
             <form action=\"/toggleotaswitch\" method=\"post\">\n\
                 <button type=\"submit\">Toggle OTA</button>\n\
             </form>\n\
         </body>\n\
         </html>\n"
    ))
}

#[utoipa::path(
    get,
    path = "/otaswitchstate",
    tag = "ota",
    responses((status = 200, description = "`True` or `False`", body = String, content_type = "text/plain"))
)]
pub(crate) async fn ota_switch_state(State(ota): State<OtaSwitch>) -> &'static str {
    // The device firmware string-matches this body; casing is load-bearing.
    if ota.status().enabled {
        "True"
    } else {
        "False"
    }
}

pub(crate) async fn toggle_ota_switch(State(ota): State<OtaSwitch>) -> Redirect {
    let status = ota.toggle();
    tracing::info!(enabled = status.enabled, "OTA switch toggled");
    Redirect::to("/otaswitch")
}

#[utoipa::path(
    get,
    path = "/changeotaswitch",
    tag = "ota",
    params(ChangeStateQuery),
    responses(
        (status = 200, description = "State updated", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing state parameter")
    )
)]
pub(crate) async fn change_ota_switch(
    State(ota): State<OtaSwitch>,
    Query(query): Query<ChangeStateQuery>,
) -> Result<String, (StatusCode, String)> {
    let raw = query
        .state
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Missing state parameter".to_string()))?;
    let enabled = matches!(raw, "True" | "true" | "1");
    let status = ota.set(enabled);
    tracing::info!(enabled = status.enabled, "OTA switch set");
    Ok(format!("OTA State Changed to {}", status.enabled))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/otaswitch", get(ota_switch_page))
        .route("/otaswitchstate", get(ota_switch_state))
        .route("/toggleotaswitch", post(toggle_ota_switch))
        .route("/changeotaswitch", get(change_ota_switch))
}
