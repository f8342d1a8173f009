use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrumpoker::{
    api,
    config::ServerConfig,
    jira::{self, JiraConfig},
    service::RoomService,
    state::Store,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrumpoker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Scrum Poker...");

    let server_config = ServerConfig::from_env();

    // Jira sync falls back to simulation mode without credentials
    let tracker = jira::build_tracker(JiraConfig::from_env());
    tracing::info!("Jira sync mode: {:?}", tracker.mode());

    let store = Arc::new(Store::new());
    let service = RoomService::new(store, tracker);

    let app = api::router(service)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = server_config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
