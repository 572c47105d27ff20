use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState, dist_dir: &Path, data_dir: &Path) -> Router {
    let static_assets = Router::new()
        .nest_service("/data", ServeDir::new(data_dir).precompressed_gzip())
        .fallback_service(
            ServeDir::new(dist_dir)
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(set_static_cache_control));

    let app = Router::new()
        .route("/api/health", axum::routing::get(routes::api::health))
        .route("/api/region", axum::routing::get(routes::api::get_region));

    app.layer(CompressionLayer::new())
        .fallback_service(static_assets)
        .with_state(state)
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if is_hashed_bundle_asset(path) {
        return Some("public, max-age=31536000, immutable");
    }

    // Boundary and name files only change with a deploy.
    if path.starts_with("/data/") {
        return Some("public, max-age=86400");
    }

    None
}

fn is_hashed_bundle_asset(path: &str) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    if !matches!(ext, "wasm" | "js" | "css") {
        return false;
    }

    let Some(filename) = Path::new(path).file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    filename
        .split(['-', '_', '.'])
        .any(|segment| segment.len() >= 8 && segment.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use shires_shared::RegionConfig;
    use tower::ServiceExt;

    use super::*;
    use crate::state::CatalogSummary;

    fn test_app() -> Router {
        let state = AppState::new(
            RegionConfig::default(),
            CatalogSummary {
                units: 48,
                features: 48,
                unbound: 0,
                warnings: Vec::new(),
            },
        );
        let missing = PathBuf::from("/nonexistent");
        build_app(state, &missing, &missing)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1 << 20).await.expect("body");
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[test]
    fn immutable_cache_for_hashed_bundle_assets() {
        assert_eq!(
            cache_control_for_path("/shires-client-71578f6b278221f3_bg.wasm"),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(
            cache_control_for_path("/input-a93762ff3bf6d63a.css"),
            Some("public, max-age=31536000, immutable")
        );
    }

    #[test]
    fn day_cache_for_region_data() {
        assert_eq!(
            cache_control_for_path("/data/englishCeremonialCounties.json"),
            Some("public, max-age=86400")
        );
    }

    #[test]
    fn no_cache_header_override_for_html() {
        assert_eq!(cache_control_for_path("/"), None);
        assert_eq!(cache_control_for_path("/index.html"), None);
        assert_eq!(cache_control_for_path("/app.js"), None);
    }

    #[tokio::test]
    async fn health_reports_catalog_counts() {
        let (status, json) = get_json(test_app(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["units"], 48);
        assert_eq!(json["region"], "Counties of England");
    }

    #[tokio::test]
    async fn region_endpoint_round_trips_config() {
        let (status, json) = get_json(test_app(), "/api/region").await;
        assert_eq!(status, StatusCode::OK);
        let config: RegionConfig = serde_json::from_value(json).expect("region config");
        assert_eq!(config, RegionConfig::default());
    }

    #[tokio::test]
    async fn missing_static_file_is_not_found() {
        let response = test_app()
            .oneshot(
                Request::get("/data/nope.json")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }
}
