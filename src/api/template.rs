//! Template registry and rendering endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::tasks::reload_in_background;
use crate::template::{
    LoadTemplateRequest, ReloadReport, RenderRequest, RenderResponse, Template,
    TemplateListResponse, TemplateSummary, VariableBag,
};

/// GET /api/v1/templates - List registered templates
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let templates = state.template_engine.summaries();
    let total = templates.len();

    Json(TemplateListResponse { templates, total })
}

/// GET /api/v1/templates/{category} - Get a template with its text
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Template>> {
    Ok(Json(state.template_engine.get(&category)?))
}

/// PUT /api/v1/templates/{category} - Register or replace a template
#[tracing::instrument(
    name = "http.load_template",
    skip(state, request),
    fields(text_len = request.text.len())
)]
pub async fn load_template(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(request): Json<LoadTemplateRequest>,
) -> Result<Json<TemplateSummary>> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation(
            "Template text must not be empty".to_string(),
        ));
    }

    state.template_engine.load(&category, request.text)?;
    let template = state.template_engine.get(&category)?;

    Ok(Json(template.summary()))
}

/// POST /api/v1/templates/{category}/render - Render a template
#[tracing::instrument(name = "http.render_template", skip(state, request))]
pub async fn render_template(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResponse>> {
    let variables = VariableBag::try_from(request.variables)?;
    let prompt = state.template_engine.render(&category, &variables)?;

    Ok(Json(RenderResponse { category, prompt }))
}

/// POST /api/v1/templates/reload - Reload all templates from their sources
#[tracing::instrument(name = "http.reload_templates", skip(state))]
pub async fn reload_templates(State(state): State<AppState>) -> Result<Json<ReloadReport>> {
    let report = reload_in_background(state.template_engine.clone())
        .await
        .map_err(|e| AppError::Internal(format!("Template reload failed: {}", e)))?;

    Ok(Json(report))
}
