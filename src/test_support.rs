use crate::config::AppConfig;
use crate::ota::OtaSwitch;
use crate::state::AppState;
use crate::store::Store;

pub const TEST_API_KEY: &str = "test-api-key";

pub fn test_state() -> AppState {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let data_root = tempdir.keep();

    let store = Store::new(data_root.join("data_geiger_counter.db"));
    store.init_schema().expect("init schema");

    AppState {
        config: AppConfig {
            api_key: TEST_API_KEY.to_string(),
            database_path: store.path().to_path_buf(),
        },
        store,
        ota: OtaSwitch::default(),
    }
}
