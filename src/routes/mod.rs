pub mod health;
pub mod ingest;
pub mod metrics;
pub mod ota;
pub mod query;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(ingest::router())
        .merge(query::router())
        .merge(metrics::router())
        .merge(ota::router())
        .merge(crate::openapi::router())
        .with_state(state)
}
