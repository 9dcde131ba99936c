//! Mirror, Mirror - affirmation dialogue backend
//!
//! Serves a four-step conversation that greets the user, asks a follow-up,
//! generates an affirmation and offers a selfie, plus the selfie upload.

mod api;
mod config;
mod llm;
mod runtime;
mod selfie;
mod state_machine;
mod system_prompt;

use api::{cors_layer, create_router, AppState};
use config::Config;
use llm::ModelGateway;
use runtime::SessionManager;
use selfie::SelfieStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound on how often idle sessions are swept
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Pick up a local .env before anything reads the environment
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mirror_mirror=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Config::from_env()?;

    tracing::info!(path = %config.selfie_dir.display(), "Opening selfie storage");
    let selfies = SelfieStore::open(&config.selfie_dir).await?;

    // Model gateway
    let gateway = ModelGateway::from_config(&config.azure);
    if gateway.is_configured() {
        tracing::info!(
            model = gateway.model_id().unwrap_or_default(),
            "Model gateway initialized"
        );
    } else {
        tracing::warn!(
            "Model gateway not configured. Set AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_API_KEY."
        );
    }

    // Sessions
    let sessions = Arc::new(SessionManager::new(Arc::new(gateway), config.dialogue));
    sessions.spawn_sweeper(config.dialogue.session_ttl.min(MAX_SWEEP_INTERVAL));

    // Create router
    let state = AppState::new(sessions, selfies, config.max_upload_bytes);
    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(config.allowed_origin.clone())),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Mirror, Mirror server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
