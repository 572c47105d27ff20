use std::sync::Arc;

use shires_shared::{
    Dataset, MapLayout, RegionConfig, RenderedFeature, UnitRegistry, render_dataset,
    validate_bindings,
};

/// Everything loaded once at startup for the configured region. Read-only after.
#[derive(Debug)]
pub struct RegionData {
    pub config: RegionConfig,
    pub registry: UnitRegistry,
    pub dataset: Dataset,
}

impl RegionData {
    /// Project the boundary dataset for one map layout.
    pub fn features(&self, layout: MapLayout) -> Arc<Vec<RenderedFeature>> {
        let projection = self.config.projection(layout);
        Arc::new(render_dataset(
            &self.dataset,
            &projection,
            &self.config.unit_type,
        ))
    }
}

/// Fetch the region config, unit names and boundary dataset, and report
/// any feature/registry mismatches to the console.
pub async fn load_region_data() -> Result<RegionData, String> {
    let config = match fetch_region().await {
        Ok(config) => config,
        Err(e) => {
            web_sys::console::warn_1(
                &format!("Region config unavailable ({e}); using built-in defaults").into(),
            );
            RegionConfig::default()
        }
    };

    let names = fetch_text(&config.unit_names_path).await?;
    let registry = UnitRegistry::from_json(&names)?;
    let geo = fetch_text(&config.geo_url).await?;
    let dataset = Dataset::from_json(&geo)?;

    let report = validate_bindings(&dataset, &config.unit_type, &registry);
    for warning in report.warnings(&config.unit_type) {
        web_sys::console::warn_1(&warning.into());
    }
    web_sys::console::info_1(
        &format!(
            "region_loaded units={} features={} unbound={}",
            registry.len(),
            dataset.len(),
            report.unbound_features.len()
        )
        .into(),
    );

    Ok(RegionData {
        config,
        registry,
        dataset,
    })
}

async fn fetch_region() -> Result<RegionConfig, String> {
    let resp = gloo_net::http::Request::get("/api/region")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<RegionConfig>()
        .await
        .map(RegionConfig::sanitized)
        .map_err(|e| format!("parse error: {e}"))
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error for {url}: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }

    resp.text()
        .await
        .map_err(|e| format!("read error for {url}: {e}"))
}
