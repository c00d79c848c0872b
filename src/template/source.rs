//! Template sources consulted at startup and on every reload

use std::fs;
use std::path::{Path, PathBuf};

use super::types::{SourcedTemplate, TemplateError, TemplateOrigin, TemplateResult};

/// File extensions read by [`DirectorySource`] unless configured otherwise
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "tmpl", "hbs"];

/// Built-in travel prompts: (category, text)
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("conversation", include_str!("../../prompts/conversation.txt")),
    ("flight_search", include_str!("../../prompts/flight_search.txt")),
    ("hotel_search", include_str!("../../prompts/hotel_search.txt")),
    ("itinerary", include_str!("../../prompts/itinerary.txt")),
    ("trip_summary", include_str!("../../prompts/trip_summary.txt")),
];

/// A provider of templates
pub trait TemplateSource: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Origin recorded on templates from this source
    fn origin(&self) -> TemplateOrigin;

    /// Produce the full template set of this source
    fn load_templates(&self) -> TemplateResult<Vec<SourcedTemplate>>;
}

/// Templates compiled into the binary
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedSource;

impl EmbeddedSource {
    pub fn new() -> Self {
        Self
    }

    /// Categories shipped with the binary
    pub fn categories() -> impl Iterator<Item = &'static str> {
        EMBEDDED_TEMPLATES.iter().map(|(category, _)| *category)
    }
}

impl TemplateSource for EmbeddedSource {
    fn name(&self) -> &str {
        "embedded"
    }

    fn origin(&self) -> TemplateOrigin {
        TemplateOrigin::Embedded
    }

    fn load_templates(&self) -> TemplateResult<Vec<SourcedTemplate>> {
        Ok(EMBEDDED_TEMPLATES
            .iter()
            .map(|(category, text)| SourcedTemplate::new(*category, *text))
            .collect())
    }
}

/// Template files in a directory; the category is the file stem
#[derive(Debug, Clone)]
pub struct DirectorySource {
    name: String,
    path: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_extensions(path, DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }

    pub fn with_extensions(path: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        let path = path.into();
        Self {
            name: format!("directory:{}", path.display()),
            path,
            extensions,
        }
    }

    fn category_for(&self, file: &Path) -> Option<String> {
        let extension = file.extension()?.to_str()?;
        if !self.extensions.iter().any(|e| e.eq_ignore_ascii_case(extension)) {
            return None;
        }
        file.file_stem()?.to_str().map(str::to_string)
    }
}

impl TemplateSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn origin(&self) -> TemplateOrigin {
        TemplateOrigin::Directory
    }

    fn load_templates(&self) -> TemplateResult<Vec<SourcedTemplate>> {
        let entries = fs::read_dir(&self.path).map_err(|e| TemplateError::Source {
            source_name: self.name.clone(),
            message: e.to_string(),
        })?;

        let mut templates = Vec::new();

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(source = %self.name, error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };

            if !path.is_file() {
                continue;
            }

            let Some(category) = self.category_for(&path) else {
                continue;
            };

            match fs::read_to_string(&path) {
                Ok(text) => templates.push(SourcedTemplate::new(category, text)),
                Err(e) => {
                    tracing::warn!(
                        source = %self.name,
                        file = %path.display(),
                        error = %e,
                        "Skipping unreadable template file"
                    );
                }
            }
        }

        // Directory iteration order is platform dependent
        templates.sort_by(|a, b| a.category.cmp(&b.category));

        Ok(templates)
    }
}

/// Fixed in-memory template set
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    name: String,
    templates: Vec<SourcedTemplate>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, templates: Vec<SourcedTemplate>) -> Self {
        Self {
            name: name.into(),
            templates,
        }
    }
}

impl TemplateSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn origin(&self) -> TemplateOrigin {
        TemplateOrigin::Runtime
    }

    fn load_templates(&self) -> TemplateResult<Vec<SourcedTemplate>> {
        Ok(self.templates.clone())
    }
}
