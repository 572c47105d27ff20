use std::path::PathBuf;

use shires_shared::RegionConfig;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_DIST_DIR: &str = "client/dist";
/// URL prefix the data directory is mounted under.
pub const DATA_URL_PREFIX: &str = "/data/";

pub fn server_port() -> u16 {
    std::env::var("SHIRES_PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn data_dir() -> PathBuf {
    dir_from_env("SHIRES_DATA_DIR", DEFAULT_DATA_DIR)
}

pub fn dist_dir() -> PathBuf {
    dir_from_env("SHIRES_DIST_DIR", DEFAULT_DIST_DIR)
}

fn dir_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Optional JSON file overriding the built-in region (England's counties).
pub fn region_config_path() -> Option<PathBuf> {
    std::env::var("SHIRES_REGION_CONFIG")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub async fn load_region_config() -> RegionConfig {
    let Some(path) = region_config_path() else {
        return RegionConfig::default();
    };
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "failed to read region config, using defaults");
            return RegionConfig::default();
        }
    };
    match RegionConfig::from_json(&text) {
        Ok(config) => {
            tracing::info!(title = %config.title, path = %path.display(), "loaded region config");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "invalid region config, using defaults");
            RegionConfig::default()
        }
    }
}
