use std::sync::Arc;

use crate::ai_client::DocumentService;
use crate::config::Config;
use crate::flow::SessionStore;
use crate::render::TemplateRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Extraction and optimization backend. OpenAI-compatible in production.
    pub documents: Arc<dyn DocumentService>,
    pub sessions: SessionStore,
    pub templates: Arc<TemplateRegistry>,
}
