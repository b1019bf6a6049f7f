mod analysis;
mod config;
mod errors;
mod extract;
mod ids;
mod interview;
mod jobs;
mod llm_client;
mod routes;
mod schema;
mod speech;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ids::UuidGenerator;
use crate::jobs::JSearchClient;
use crate::llm_client::{GeminiClient, StructuredClient};
use crate::routes::build_router;
use crate::speech::ElevenLabsClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast when ELEVENLABS_API_KEY is missing
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gateway v{}", env!("CARGO_PKG_VERSION"));
    config.warn_on_missing_keys();

    let llm = StructuredClient::new(Arc::new(GeminiClient::new(config.gemini_api_key.clone())?));
    info!("Completion client initialized (model: {})", llm_client::MODEL);

    let jobs = Arc::new(JSearchClient::new(config.rapidapi_key.clone())?);
    let speech = Arc::new(ElevenLabsClient::new(config.elevenlabs_api_key.clone())?);
    info!("Job search and speech clients initialized");

    let state = AppState {
        llm,
        jobs,
        speech,
        ids: Arc::new(UuidGenerator),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
