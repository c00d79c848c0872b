use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::template::{create_template_engine, TemplateEngine};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub template_engine: Arc<TemplateEngine>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let template_engine = create_template_engine(&settings.templates);
        Self::with_engine(settings, template_engine)
    }

    /// Build state around an existing engine
    pub fn with_engine(settings: Settings, template_engine: Arc<TemplateEngine>) -> Self {
        Self {
            settings: Arc::new(settings),
            template_engine,
            start_time: Instant::now(),
        }
    }
}
