use std::time::Instant;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::mutation::Mutation;
use crate::document::path::FieldPath;
use crate::editor::{Activation, Key};
use crate::errors::AppError;
use crate::flow::service;
use crate::flow::session::{FlowSession, LayoutView, SessionSnapshot};
use crate::layout::engine::Step;
use crate::layout::fit::fit_with;
use crate::layout::measure::EstimatedMeasurer;
use crate::layout::tokens::LayoutTokens;
use crate::models::document::Document;
use crate::render::html::to_html;
use crate::render::{Page, TemplateMeta};
use crate::state::AppState;
use crate::upload;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub template_id: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTextRequest {
    pub text: String,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectTemplateRequest {
    pub template_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MeasureRequest {
    /// `null` when the page element is not mounted.
    pub height: Option<f32>,
}

#[derive(Serialize)]
pub struct MeasureResponse {
    pub step: Step,
    pub layout: LayoutView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub template_id: &'static str,
    pub activation: Activation,
    pub tokens: LayoutTokens,
    pub layout: LayoutView,
    pub tree: Page,
}

#[derive(Debug, Deserialize)]
pub struct OpenFieldRequest {
    pub path: FieldPath,
    pub gesture: Activation,
}

#[derive(Serialize)]
pub struct OpenFieldResponse {
    pub opened: bool,
    pub session: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: Key,
}

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<Vec<TemplateMeta>> {
    Json(state.templates.list())
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let session = FlowSession::new(
        req.template_id
            .unwrap_or_else(|| crate::render::DEFAULT_TEMPLATE_ID.to_string()),
        req.language
            .unwrap_or_else(|| state.config.default_language.clone()),
        state.config.layout,
    );
    let snapshot = session.snapshot(Instant::now());
    let id = state.sessions.insert(session).await;
    info!(session = %id, "session created");
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    snapshot(&state, id).await
}

/// POST /api/v1/sessions/:id/text
pub async fn handle_submit_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitTextRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    service::submit_text(&state.sessions, state.documents.as_ref(), id, &req.text, req.language).await?;
    snapshot(&state, id).await
}

/// POST /api/v1/sessions/:id/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut file: Option<(Option<String>, Option<String>, Bytes)> = None;
    let mut language = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;
                file = Some((file_name, content_type, data));
            }
            Some("language") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid language field: {e}")))?;
                language = Some(value).filter(|v| !v.trim().is_empty());
            }
            other => debug!("ignoring multipart field {:?}", other),
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    // Fail fast on unknown sessions before parsing the file.
    state.sessions.read(id, |_| ()).await?;

    let text = upload::extract_text(file_name.as_deref(), content_type.as_deref(), data).await?;
    service::submit_text(&state.sessions, state.documents.as_ref(), id, &text, language).await?;
    snapshot(&state, id).await
}

/// POST /api/v1/sessions/:id/document
pub async fn handle_submit_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(doc): Json<Document>,
) -> Result<Json<SessionSnapshot>, AppError> {
    service::submit_document(&state.sessions, id, doc).await?;
    snapshot(&state, id).await
}

/// PUT /api/v1/sessions/:id/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectTemplateRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    if !state.templates.contains(&req.template_id) {
        info!(
            session = %id,
            "template '{}' is not registered; renders will use the default",
            req.template_id
        );
    }
    state
        .sessions
        .update(id, |s| s.select_template(&req.template_id))
        .await?;
    snapshot(&state, id).await
}

/// POST /api/v1/sessions/:id/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    service::optimize(&state.sessions, state.documents.as_ref(), id).await?;
    snapshot(&state, id).await
}

/// POST /api/v1/sessions/:id/back
pub async fn handle_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .update(id, |s| {
            s.back();
            Ok(())
        })
        .await?;
    snapshot(&state, id).await
}

/// POST /api/v1/sessions/:id/mutations
pub async fn handle_apply_mutation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mutation): Json<Mutation>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .update(id, |s| s.apply(&mutation).map(|_| ()))
        .await?;
    snapshot(&state, id).await
}

/// POST /api/v1/sessions/:id/measure
pub async fn handle_measure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MeasureRequest>,
) -> Result<Json<MeasureResponse>, AppError> {
    let response = state
        .sessions
        .update(id, |s| {
            let now = Instant::now();
            let step = s.measure(req.height, now);
            Ok(MeasureResponse {
                step,
                layout: s.layout_view(now),
            })
        })
        .await?;
    Ok(Json(response))
}

/// GET /api/v1/sessions/:id/render
///
/// Releases a measurement held by an expired settle guard before rendering.
pub async fn handle_render(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderResponse>, AppError> {
    let templates = state.templates.clone();
    let response = state
        .sessions
        .update(id, |s| {
            let now = Instant::now();
            s.poll_layout(now);
            let template = templates.resolve(&s.template_id);
            let tokens = s.tokens();
            let tree = template.render(s.document()?, &tokens);
            Ok(RenderResponse {
                template_id: template.id(),
                activation: template.activation(),
                tokens,
                layout: s.layout_view(now),
                tree,
            })
        })
        .await?;
    Ok(Json(response))
}

/// GET /api/v1/sessions/:id/export
///
/// Fits the page server-side from the session's current layout state and returns
/// standalone HTML. The session's own engine is not advanced.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let (doc, template_id, mut engine) = state
        .sessions
        .read(id, |s| {
            s.document()
                .map(|doc| (doc.clone(), s.template_id.clone(), s.engine.clone()))
        })
        .await??;

    let template = state.templates.resolve(&template_id);
    let outcome = fit_with(&mut engine, template.as_ref(), &doc, &EstimatedMeasurer::default());
    info!(
        session = %id,
        template = template.id(),
        transitions = outcome.transitions.len(),
        "export fitted to {:?}",
        outcome.state
    );
    if outcome.last == Step::Terminal {
        warn!(session = %id, "export still overflows A4 at the floor scale");
    }

    let title = match doc.personal_info.full_name.trim() {
        "" => "CV".to_string(),
        name => format!("CV - {name}"),
    };
    Ok(Html(to_html(&outcome.page, &title)))
}

/// POST /api/v1/sessions/:id/edit/open
pub async fn handle_open_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<OpenFieldRequest>,
) -> Result<Json<OpenFieldResponse>, AppError> {
    let templates = state.templates.clone();
    let response = state
        .sessions
        .update(id, |s| {
            let activation = templates.resolve(&s.template_id).activation();
            let opened = s.open_field(req.path, req.gesture, activation)?;
            Ok(OpenFieldResponse {
                opened,
                session: s.snapshot(Instant::now()),
            })
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/sessions/:id/edit/input
pub async fn handle_field_input(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InputRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state.sessions.update(id, |s| s.input_field(req.text)).await?;
    snapshot(&state, id).await
}

/// POST /api/v1/sessions/:id/edit/key
pub async fn handle_field_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<KeyRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state.sessions.update(id, |s| s.key_field(req.key)).await?;
    snapshot(&state, id).await
}

/// POST /api/v1/sessions/:id/edit/commit
pub async fn handle_field_commit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state.sessions.update(id, |s| s.commit_field()).await?;
    snapshot(&state, id).await
}

async fn snapshot(state: &AppState, id: Uuid) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state.sessions.read(id, |s| s.snapshot(Instant::now())).await?;
    Ok(Json(snapshot))
}
