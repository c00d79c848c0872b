//! Prompt template system.
//!
//! This module provides:
//! - A template registry keyed by category, populated from template sources
//! - A variable bag built from JSON
//! - A four-pass rendering pipeline: `{{name}}`, `{{#if name}}...{{/if}}`,
//!   `{{#each name}}...{{/each}}` and `{{name.property}}`
//!
//! # Example
//!
//! ```ignore
//! let engine = TemplateEngine::new();
//!
//! engine.load(
//!     "greeting",
//!     "Hi {{name}}! {{#if vip}}Welcome back.{{/if}} Items: {{#each list}}{{this}} {{/each}}",
//! )?;
//!
//! let variables = VariableBag::try_from(json!({
//!     "name": "Ann",
//!     "vip": true,
//!     "list": ["x", "y"]
//! }))?;
//!
//! let prompt = engine.render("greeting", &variables)?;
//! assert_eq!(prompt, "Hi Ann! Welcome back. Items: x y ");
//! ```
//!
//! Unknown `{{name}}` and `{{name.property}}` tokens are left in the output
//! as written; unknown `#if`/`#each` names count as false/empty.

mod engine;
mod source;
mod substitution;
mod types;
mod variables;

pub use engine::{create_template_engine, sources_from_config, TemplateEngine};
pub use source::{DirectorySource, EmbeddedSource, StaticSource, TemplateSource, DEFAULT_EXTENSIONS};
pub use substitution::{
    expand_iterations, interpolate, render_text, resolve_conditionals, resolve_dotted, Pass,
    PASSES,
};
pub use types::{
    validate_category, LoadTemplateRequest, ReloadReport, RenderRequest, RenderResponse,
    SourcedTemplate, Template, TemplateError, TemplateListResponse, TemplateOrigin,
    TemplateResult, TemplateSummary,
};
pub use variables::{is_truthy, stringify, Lookup, VariableBag};
