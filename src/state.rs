use crate::config::AppConfig;
use crate::ota::OtaSwitch;
use crate::store::Store;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Store,
    pub ota: OtaSwitch,
}

impl FromRef<AppState> for Store {
    fn from_ref(state: &AppState) -> Store {
        state.store.clone()
    }
}

impl FromRef<AppState> for OtaSwitch {
    fn from_ref(state: &AppState) -> OtaSwitch {
        state.ota.clone()
    }
}
