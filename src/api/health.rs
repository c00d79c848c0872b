//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub templates: TemplateHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct TemplateHealthResponse {
    pub loaded: usize,
    pub embedded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let loaded = state.template_engine.count();
    let status = if loaded > 0 { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        templates: TemplateHealthResponse {
            loaded,
            embedded: state.settings.templates.embedded,
            directory: state.settings.templates.directory.clone(),
        },
    })
}
