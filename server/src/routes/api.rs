use axum::Json;
use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let catalog = &state.catalog;
    Json(serde_json::json!({
        "status": "ok",
        "region": state.region.title,
        "units": catalog.units,
        "features": catalog.features,
        "unbound": catalog.unbound,
        "warnings": catalog.warnings.len(),
    }))
}

/// The active region config; the client builds its maps from this.
pub async fn get_region(State(state): State<AppState>) -> Response {
    let mut response = Json(state.region.as_ref().clone()).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=300"),
    );
    response
}
