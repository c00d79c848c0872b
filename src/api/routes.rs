use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::health;
use super::metrics::prometheus_metrics;
use super::template::{
    get_template, list_templates, load_template, reload_templates, render_template,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Template endpoints
        .nest(
            "/api/v1",
            Router::new()
                .route("/templates", get(list_templates))
                .route("/templates/reload", post(reload_templates))
                .route(
                    "/templates/{category}",
                    get(get_template).put(load_template),
                )
                .route("/templates/{category}/render", post(render_template)),
        )
}
