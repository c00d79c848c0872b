//! Template registry and rendering entry point

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::config::TemplatesConfig;
use crate::metrics::{RegistryMetrics, RenderMetrics};

use super::source::{DirectorySource, EmbeddedSource, TemplateSource};
use super::substitution::render_text;
use super::types::{
    validate_category, ReloadReport, Template, TemplateError, TemplateOrigin, TemplateResult,
    TemplateSummary,
};
use super::variables::VariableBag;

/// Owns a template registry and renders templates by category.
///
/// The registry is replaced in a single write on [`reload`](Self::reload),
/// so readers see either the old or the new set, never a partial one.
pub struct TemplateEngine {
    sources: Vec<Box<dyn TemplateSource>>,
    templates: RwLock<HashMap<String, Template>>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Create an engine with no sources and an empty registry
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// Create an engine and populate it from `sources`.
    ///
    /// Later sources override earlier ones for the same category.
    pub fn with_sources(sources: Vec<Box<dyn TemplateSource>>) -> Self {
        let engine = Self {
            sources,
            templates: RwLock::new(HashMap::new()),
        };
        engine.reload();
        engine
    }

    /// Register or overwrite a template. The text is not validated.
    pub fn load(&self, category: &str, text: impl Into<String>) -> TemplateResult<()> {
        validate_category(category)?;

        let template = Template::new(category, text, TemplateOrigin::Runtime);
        let count = {
            let mut templates = self.templates.write();
            templates.insert(category.to_string(), template);
            templates.len()
        };

        RegistryMetrics::set_loaded(count);
        tracing::info!(
            category = %category,
            origin = TemplateOrigin::Runtime.as_str(),
            "Template loaded"
        );

        Ok(())
    }

    /// Render the template registered under `category`
    pub fn render(&self, category: &str, variables: &VariableBag) -> TemplateResult<String> {
        let start = Instant::now();

        let rendered = {
            let templates = self.templates.read();
            match templates.get(category) {
                Some(template) => render_text(&template.text, variables),
                None => {
                    RenderMetrics::record_not_found();
                    return Err(TemplateError::NotFound(category.to_string()));
                }
            }
        };

        let elapsed = start.elapsed();
        RenderMetrics::record_rendered(category, elapsed.as_secs_f64());
        tracing::debug!(
            category = %category,
            variables = variables.len(),
            output_len = rendered.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "Template rendered"
        );

        Ok(rendered)
    }

    /// Get a template by category
    pub fn get(&self, category: &str) -> TemplateResult<Template> {
        self.templates
            .read()
            .get(category)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(category.to_string()))
    }

    /// Registered categories, sorted
    pub fn list_available(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.templates.read().keys().cloned().collect();
        categories.sort();
        categories
    }

    /// Summaries of all registered templates, sorted by category
    pub fn summaries(&self) -> Vec<TemplateSummary> {
        let mut summaries: Vec<TemplateSummary> =
            self.templates.read().values().map(Template::summary).collect();
        summaries.sort_by(|a, b| a.category.cmp(&b.category));
        summaries
    }

    /// Check if a category is registered
    pub fn exists(&self, category: &str) -> bool {
        self.templates.read().contains_key(category)
    }

    /// Get the number of registered templates
    pub fn count(&self) -> usize {
        self.templates.read().len()
    }

    /// Drop every registered template and reload from the sources.
    ///
    /// Failed sources and invalid categories are logged and skipped.
    pub fn reload(&self) -> ReloadReport {
        let mut fresh = HashMap::new();
        let mut failed_sources = 0;

        for source in &self.sources {
            match source.load_templates() {
                Ok(templates) => {
                    let origin = source.origin();
                    tracing::debug!(
                        source = %source.name(),
                        origin = origin.as_str(),
                        count = templates.len(),
                        "Template source loaded"
                    );
                    for sourced in templates {
                        if let Err(e) = validate_category(&sourced.category) {
                            tracing::warn!(
                                source = %source.name(),
                                category = %sourced.category,
                                error = %e,
                                "Skipping template with invalid category"
                            );
                            continue;
                        }
                        let template = Template::new(sourced.category, sourced.text, origin);
                        fresh.insert(template.category.clone(), template);
                    }
                }
                Err(e) => {
                    failed_sources += 1;
                    RegistryMetrics::record_source_error();
                    tracing::error!(source = %source.name(), error = %e, "Template source failed to load");
                }
            }
        }

        let loaded = fresh.len();
        *self.templates.write() = fresh;

        RegistryMetrics::set_loaded(loaded);
        RegistryMetrics::record_reload(failed_sources);
        tracing::info!(loaded, failed_sources, "Template registry reloaded");

        ReloadReport {
            loaded,
            failed_sources,
        }
    }
}

/// Build the sources described by `config`
pub fn sources_from_config(config: &TemplatesConfig) -> Vec<Box<dyn TemplateSource>> {
    let mut sources: Vec<Box<dyn TemplateSource>> = Vec::new();

    if config.embedded {
        sources.push(Box::new(EmbeddedSource::new()));
    }

    if let Some(directory) = &config.directory {
        sources.push(Box::new(DirectorySource::with_extensions(
            directory,
            config.extensions.clone(),
        )));
    }

    sources
}

/// Create an Arc-wrapped engine loaded from the configured sources
pub fn create_template_engine(config: &TemplatesConfig) -> Arc<TemplateEngine> {
    Arc::new(TemplateEngine::with_sources(sources_from_config(config)))
}
