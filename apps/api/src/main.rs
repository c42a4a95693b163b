mod ai_client;
mod config;
mod document;
mod editor;
mod errors;
mod flow;
mod layout;
mod models;
mod render;
mod routes;
mod state;
mod upload;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai_client::{AiClient, OpenAiDocumentService};
use crate::config::Config;
use crate::flow::SessionStore;
use crate::render::TemplateRegistry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CoverFlow API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize AI client
    let client = AiClient::new(
        config.openai_api_key.clone(),
        config.ai_base_url.clone(),
        config.ai_model.clone(),
    )?;
    info!("AI client initialized (model: {})", client.model());

    let templates = TemplateRegistry::builtin();
    info!("{} templates registered", templates.list().len());
    info!(
        "Auto-fit target {}px, scale floor {}, typography ladder {}",
        config.layout.target_height_px, config.layout.scale_floor, config.layout.typography_ladder
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        documents: Arc::new(OpenAiDocumentService::new(client)),
        sessions: SessionStore::new(),
        templates: Arc::new(templates),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
