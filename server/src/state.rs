use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use shires_shared::{Dataset, RegionConfig, UnitRegistry, validate_bindings};

use crate::config::DATA_URL_PREFIX;

/// What the server learned about the region's data files at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub units: usize,
    pub features: usize,
    pub unbound: usize,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub region: Arc<RegionConfig>,
    pub catalog: Arc<CatalogSummary>,
}

impl AppState {
    pub fn new(region: RegionConfig, catalog: CatalogSummary) -> Self {
        Self {
            region: Arc::new(region),
            catalog: Arc::new(catalog),
        }
    }
}

/// Map a data URL from the region config (e.g. `/data/names.json`) onto a
/// file inside `data_dir`. Anything that would escape the directory is rejected.
pub fn asset_path(data_dir: &Path, url: &str) -> Option<PathBuf> {
    let relative = url
        .strip_prefix(DATA_URL_PREFIX)
        .or_else(|| url.strip_prefix('/'))
        .unwrap_or(url);
    let relative = Path::new(relative);
    if relative.as_os_str().is_empty()
        || !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(data_dir.join(relative))
}

async fn read_asset(data_dir: &Path, url: &str) -> Result<String, String> {
    let path = asset_path(data_dir, url).ok_or_else(|| format!("unsafe data path `{url}`"))?;
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("failed to read {}: {e}", path.display()))
}

/// Load the unit names and boundary dataset and check that they agree.
/// Missing or broken files are logged and leave the counts at zero.
pub async fn load_catalog(data_dir: &Path, region: &RegionConfig) -> CatalogSummary {
    let registry = match read_asset(data_dir, &region.unit_names_path)
        .await
        .and_then(|text| UnitRegistry::from_json(&text))
    {
        Ok(registry) => registry,
        Err(e) => {
            tracing::warn!(error = %e, "unit registry unavailable");
            return CatalogSummary::default();
        }
    };

    let dataset = match read_asset(data_dir, &region.geo_url)
        .await
        .and_then(|text| Dataset::from_json(&text))
    {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::warn!(
                error = %e,
                geo_url = %region.geo_url,
                "boundary dataset unavailable; see data/README.md for where to get it"
            );
            return CatalogSummary {
                units: registry.len(),
                ..CatalogSummary::default()
            };
        }
    };

    let report = validate_bindings(&dataset, &region.unit_type, &registry);
    let warnings = report.warnings(&region.unit_type);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    for (unit, count) in &report.repeated_units {
        tracing::debug!(%unit, count, "unit drawn by several features");
    }

    CatalogSummary {
        units: registry.len(),
        features: dataset.len(),
        unbound: report.unbound_features.len(),
        warnings,
    }
}
