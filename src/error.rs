use axum::http::StatusCode;

pub fn map_store_error(err: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(error = %err, "storage error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database error".to_string(),
    )
}
