//! API layer - HTTP endpoint handlers.

mod health;
mod metrics;
mod routes;
mod template;

pub use health::health;
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
pub use template::{
    get_template, list_templates, load_template, reload_templates, render_template,
};
