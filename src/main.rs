use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handcricket::websockets::{websocket_handler, InMemoryConnectionManager};
use handcricket::{AppState, GameConfig};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handcricket=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let connection_manager = Arc::new(InMemoryConnectionManager::new());
    let app_state = AppState::new(GameConfig::from_env(), connection_manager);
    let config = &app_state.config;
    info!(
        grace_secs = config.grace_period.as_secs(),
        overs = config.default_overs,
        wickets = config.default_wickets,
        "Starting hand-cricket game server"
    );

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "Failed to bind listener");
            return;
        }
    };
    info!("Server running on ws://{}/ws", config.bind_addr);

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server terminated");
    }
}
