//! Template types and error definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a category name
const MAX_CATEGORY_LEN: usize = 64;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid template category: {0}")]
    InvalidCategory(String),

    #[error("Invalid variables: {0}")]
    InvalidVariables(String),

    #[error("Template source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Where a registered template came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateOrigin {
    /// Compiled into the binary
    Embedded,
    /// Read from the configured template directory
    Directory,
    /// Registered at runtime through `load`
    Runtime,
}

impl TemplateOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateOrigin::Embedded => "embedded",
            TemplateOrigin::Directory => "directory",
            TemplateOrigin::Runtime => "runtime",
        }
    }
}

/// A registered prompt template
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    /// Category the template is registered under
    pub category: String,

    /// Raw template text with directives
    pub text: String,

    /// Source the template was loaded from
    pub origin: TemplateOrigin,

    /// Load timestamp
    pub loaded_at: DateTime<Utc>,
}

impl Template {
    pub fn new(category: impl Into<String>, text: impl Into<String>, origin: TemplateOrigin) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
            origin,
            loaded_at: Utc::now(),
        }
    }

    /// Summary without the template body
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            category: self.category.clone(),
            origin: self.origin,
            length: self.text.len(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Validate a category name (alphanumeric, dash, underscore)
pub fn validate_category(category: &str) -> TemplateResult<()> {
    if category.is_empty() || category.len() > MAX_CATEGORY_LEN {
        return Err(TemplateError::InvalidCategory(format!(
            "Category must be 1-{} characters",
            MAX_CATEGORY_LEN
        )));
    }

    if !category
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(TemplateError::InvalidCategory(
            "Category must contain only alphanumeric, dash, or underscore".to_string(),
        ));
    }

    Ok(())
}

/// A template produced by a source, before registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedTemplate {
    pub category: String,
    pub text: String,
}

impl SourcedTemplate {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }
}

/// Template listing entry
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub category: String,
    pub origin: TemplateOrigin,
    /// Template length in bytes
    pub length: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Outcome of a full registry reload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReloadReport {
    /// Templates registered after the reload
    pub loaded: usize,
    /// Sources that failed and were skipped
    pub failed_sources: usize,
}

/// Request to register or replace a template
#[derive(Debug, Deserialize)]
pub struct LoadTemplateRequest {
    /// Template text with directives
    pub text: String,
}

/// Request to render a template
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    /// Variable bag, must be a JSON object
    #[serde(default = "empty_object")]
    pub variables: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// A rendered prompt
#[derive(Debug, Clone, Serialize)]
pub struct RenderResponse {
    pub category: String,
    pub prompt: String,
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    /// Template summaries
    pub templates: Vec<TemplateSummary>,

    /// Total count
    pub total: usize,
}
