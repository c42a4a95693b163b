use async_trait::async_trait;
use tracing::info;

use super::{prompts, AiClient, AiError};
use crate::models::document::Document;

/// External document intelligence: turns raw résumé text into a [`Document`] and
/// rewrites an existing one.
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn extract(&self, resume_text: &str, language: &str) -> Result<Document, AiError>;

    /// Returns a full replacement document.
    async fn optimize(&self, current: &Document, language: &str) -> Result<Document, AiError>;
}

/// [`DocumentService`] backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiDocumentService {
    client: AiClient,
}

impl OpenAiDocumentService {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentService for OpenAiDocumentService {
    async fn extract(&self, resume_text: &str, language: &str) -> Result<Document, AiError> {
        let doc: Document = self
            .client
            .call_json(
                &prompts::extraction_user(resume_text),
                &prompts::extraction_system(language),
            )
            .await?;
        if doc.is_blank() {
            return Err(AiError::BlankDocument);
        }
        info!(
            experiences = doc.experiences.len(),
            education = doc.education.len(),
            skills = doc.skills.len(),
            "document extracted"
        );
        Ok(doc)
    }

    async fn optimize(&self, current: &Document, language: &str) -> Result<Document, AiError> {
        // Photos are opaque and often large data URIs; they never go to the model.
        let mut outgoing = current.clone();
        outgoing.personal_info.photo = None;
        let payload = serde_json::to_string(&outgoing)?;
        let mut doc: Document = self
            .client
            .call_json(
                &prompts::optimization_user(&payload),
                &prompts::optimization_system(language),
            )
            .await?;
        if doc.is_blank() {
            return Err(AiError::BlankDocument);
        }
        doc.personal_info.photo = current.personal_info.photo.clone();
        if doc.custom_blocks.is_empty() {
            doc.custom_blocks = current.custom_blocks.clone();
        }
        Ok(doc)
    }
}
