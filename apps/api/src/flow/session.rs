//! Per-user flow state: upload → template → edit.
//!
//! A session owns the current document, the selected template, the auto-fit engine
//! and at most one open field editor. All methods are synchronous; the async AI calls
//! happen outside the store lock (see `flow::service`).

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::mutation::{self, FieldValue, Mutation};
use crate::document::path::FieldPath;
use crate::editor::{Activation, FieldEditor, Key};
use crate::errors::AppError;
use crate::layout::engine::{AutoFit, AutoFitConfig, LayoutState, Step};
use crate::layout::tokens::LayoutTokens;
use crate::models::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    Upload,
    Template,
    Edit,
}

/// The field currently being edited.
#[derive(Debug, Clone)]
pub struct OpenField {
    pub path: FieldPath,
    pub editor: FieldEditor,
}

#[derive(Debug, Clone)]
pub struct FlowSession {
    pub id: Uuid,
    pub step: FlowStep,
    pub document: Option<Document>,
    /// Identity of the current document. Changes on upload and on AI optimization,
    /// never on edits.
    pub document_id: Option<Uuid>,
    /// Number of mutations applied to the current document.
    pub revision: u64,
    pub template_id: String,
    pub language: String,
    pub engine: AutoFit,
    pub open_field: Option<OpenField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlowSession {
    pub fn new(template_id: impl Into<String>, language: impl Into<String>, layout: AutoFitConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            step: FlowStep::Upload,
            document: None,
            document_id: None,
            revision: 0,
            template_id: template_id.into(),
            language: language.into(),
            engine: AutoFit::new(layout),
            open_field: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn document(&self) -> Result<&Document, AppError> {
        self.document
            .as_ref()
            .ok_or_else(|| AppError::Conflict("no document has been uploaded yet".to_string()))
    }

    /// Installs a freshly extracted or uploaded document and advances to template selection.
    pub fn accept_document(&mut self, doc: Document) {
        self.replace_document(doc);
        self.step = FlowStep::Template;
        info!(session = %self.id, "document accepted");
    }

    /// Swaps in a new document identity. Layout state never carries over.
    fn replace_document(&mut self, doc: Document) {
        self.document = Some(doc);
        self.document_id = Some(Uuid::new_v4());
        self.revision = 0;
        self.open_field = None;
        self.engine.reset();
        self.touch();
    }

    /// Stores the template id as given; unknown ids are resolved at render time.
    pub fn select_template(&mut self, template_id: &str) -> Result<(), AppError> {
        self.document()?;
        if self.template_id != template_id {
            debug!(session = %self.id, from = %self.template_id, to = template_id, "template changed");
            self.template_id = template_id.to_string();
            self.engine.reset();
        }
        self.touch();
        Ok(())
    }

    /// Completes the optimize step. `None` means the AI call failed: the prior document
    /// is kept and the flow still advances.
    pub fn finish_optimization(&mut self, optimized: Option<Document>) -> Result<(), AppError> {
        self.document()?;
        if let Some(doc) = optimized {
            self.replace_document(doc);
        }
        self.step = FlowStep::Edit;
        self.touch();
        Ok(())
    }

    /// edit → template; template → upload, discarding the document.
    pub fn back(&mut self) {
        match self.step {
            FlowStep::Edit => self.step = FlowStep::Template,
            FlowStep::Template => {
                self.step = FlowStep::Upload;
                self.document = None;
                self.document_id = None;
                self.revision = 0;
                self.open_field = None;
                self.engine.reset();
            }
            FlowStep::Upload => {}
        }
        self.touch();
    }

    /// Applies a mutation to the current document. Layout state is kept, but rungs
    /// that overflowed with the old content become eligible again.
    ///
    /// An open field is committed first: its path holds list indices that the
    /// mutation may shift.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<&Document, AppError> {
        self.document()?;
        self.commit_field()?;
        let next = mutation::apply(self.document()?, mutation)?;
        self.document = Some(next);
        self.revision += 1;
        self.engine.content_changed();
        self.touch();
        self.document()
    }

    /// Feeds a height measurement to the auto-fit engine.
    pub fn measure(&mut self, height: Option<f32>, now: Instant) -> Step {
        let step = self.engine.on_measure(height, now);
        if let Step::Applied { transition } = step {
            debug!(session = %self.id, "layout transition {:?}", transition);
        }
        step
    }

    /// Evaluates a measurement held back by the settle guard once it has expired.
    pub fn poll_layout(&mut self, now: Instant) -> Option<Step> {
        self.engine.poll(now)
    }

    pub fn tokens(&self) -> LayoutTokens {
        self.engine.tokens()
    }

    // ── field editing ───────────────────────────────────────────────────────

    /// Opens `path` for editing. Any other open field is committed first, as a
    /// blur would.
    pub fn open_field(
        &mut self,
        path: FieldPath,
        gesture: Activation,
        activation: Activation,
    ) -> Result<bool, AppError> {
        let value = mutation::read_text(self.document()?, &path)?;
        if self.open_field.as_ref().is_some_and(|open| open.path == path) {
            return Ok(true);
        }
        self.commit_field()?;

        let mut editor = FieldEditor::new(value, path.is_multiline(), activation);
        if !editor.activate(gesture) {
            return Ok(false);
        }
        self.open_field = Some(OpenField { path, editor });
        Ok(true)
    }

    pub fn input_field(&mut self, text: String) -> Result<(), AppError> {
        let open = self.open_field_mut()?;
        open.editor.input(text);
        Ok(())
    }

    /// Routes a key press to the open editor, applying the save if it commits.
    pub fn key_field(&mut self, key: Key) -> Result<(), AppError> {
        let open = self.open_field_mut()?;
        let mut saved = None;
        open.editor.key(key, |value| saved = Some(value));
        let closed = !open.editor.is_editing();
        let path = open.path.clone();
        if closed {
            self.open_field = None;
        }
        if let Some(value) = saved {
            self.save_field(path, value)?;
        }
        Ok(())
    }

    /// Commits the open field (blur). No-op when nothing is open.
    pub fn commit_field(&mut self) -> Result<(), AppError> {
        let Some(mut open) = self.open_field.take() else {
            return Ok(());
        };
        let mut saved = None;
        open.editor.blur(|value| saved = Some(value));
        if let Some(value) = saved {
            self.save_field(open.path, value)?;
        }
        Ok(())
    }

    fn save_field(&mut self, path: FieldPath, value: String) -> Result<(), AppError> {
        self.apply(&Mutation::Update {
            path,
            value: FieldValue::Text(value),
        })?;
        Ok(())
    }

    fn open_field_mut(&mut self) -> Result<&mut OpenField, AppError> {
        self.open_field
            .as_mut()
            .ok_or_else(|| AppError::Conflict("no field is being edited".to_string()))
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            step: self.step,
            template_id: self.template_id.clone(),
            language: self.language.clone(),
            document_id: self.document_id,
            revision: self.revision,
            document: self.document.clone(),
            layout: self.layout_view(now),
            editing: self.open_field.as_ref().map(|open| EditingView {
                path: open.path.clone(),
                draft: match open.editor.view() {
                    crate::editor::FieldView::Input { draft, .. } => draft.to_string(),
                    _ => open.editor.value().to_string(),
                },
                multiline: open.path.is_multiline(),
            }),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn layout_view(&self, now: Instant) -> LayoutView {
        LayoutView {
            state: *self.engine.state(),
            tokens: self.engine.tokens(),
            settling: self.engine.is_settling(now),
            expanded: self.engine.state().is_expanded(),
            terminal: self.engine.is_terminal(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutView {
    pub state: LayoutState,
    pub tokens: LayoutTokens,
    pub settling: bool,
    /// Nothing left to grow back.
    pub expanded: bool,
    pub terminal: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditingView {
    pub path: FieldPath,
    pub draft: String,
    pub multiline: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub step: FlowStep,
    pub template_id: String,
    pub language: String,
    pub document_id: Option<Uuid>,
    pub revision: u64,
    pub document: Option<Document>,
    pub layout: LayoutView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing: Option<EditingView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
