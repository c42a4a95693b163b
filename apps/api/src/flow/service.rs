//! Flow steps that call the document service.
//!
//! Each step reads what it needs under the store lock, releases it for the AI call,
//! then re-acquires it to apply the result. A result is only applied if the session
//! still holds the document it was computed from.

use tracing::{info, warn};
use uuid::Uuid;

use crate::ai_client::DocumentService;
use crate::errors::AppError;
use crate::flow::session::FlowSession;
use crate::flow::store::SessionStore;
use crate::models::document::Document;

/// Extracts a document from raw résumé text and advances to template selection.
/// On extraction failure the session is left untouched.
pub async fn submit_text(
    store: &SessionStore,
    documents: &dyn DocumentService,
    id: Uuid,
    text: &str,
    language: Option<String>,
) -> Result<(), AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("resume text is empty".to_string()));
    }

    let (language, document_id) = store
        .read(id, |s| {
            (
                language.clone().unwrap_or_else(|| s.language.clone()),
                s.document_id,
            )
        })
        .await?;

    info!(session = %id, chars = text.len(), %language, "extracting document");
    let doc = documents
        .extract(text, &language)
        .await
        .map_err(AppError::Extraction)?;

    store
        .update(id, |s| {
            ensure_same_document(s, document_id)?;
            s.language = language;
            s.accept_document(doc);
            Ok(())
        })
        .await
}

/// Accepts an already-structured document.
pub async fn submit_document(store: &SessionStore, id: Uuid, doc: Document) -> Result<(), AppError> {
    store
        .update(id, |s| {
            s.accept_document(doc);
            Ok(())
        })
        .await
}

/// Rewrites the current document and advances to editing. A failed rewrite keeps the
/// prior document and still advances.
pub async fn optimize(
    store: &SessionStore,
    documents: &dyn DocumentService,
    id: Uuid,
) -> Result<(), AppError> {
    let (current, document_id, language) = store
        .read(id, |s| {
            s.document()
                .map(|doc| (doc.clone(), s.document_id, s.language.clone()))
        })
        .await??;

    let optimized = match documents.optimize(&current, &language).await {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!(session = %id, "optimization failed, keeping current document: {e}");
            None
        }
    };

    store
        .update(id, |s| {
            ensure_same_document(s, document_id)?;
            s.finish_optimization(optimized)
        })
        .await
}

fn ensure_same_document(session: &FlowSession, expected: Option<Uuid>) -> Result<(), AppError> {
    if session.document_id != expected {
        return Err(AppError::Conflict(
            "the document changed while the request was in flight".to_string(),
        ));
    }
    Ok(())
}
