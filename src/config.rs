use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_DATABASE_PATH: &str = "data/data_geiger_counter.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub database_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env_optional_string("GEIGER_API_KEY")
            .context("GEIGER_API_KEY must be set to the shared key the sensor sends")?;
        let database_path = env_optional_string("GEIGER_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));
        if database_path.as_os_str().is_empty() {
            anyhow::bail!("GEIGER_DATABASE_PATH resolved to an empty path");
        }
        Ok(Self {
            api_key,
            database_path,
        })
    }
}

fn env_optional_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
