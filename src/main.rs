use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songfest::{api, config::ServerConfig, state::AppState, ws};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "songfest=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Songfest...");

    let config = ServerConfig::from_env();
    tracing::info!("Scoring policy: {:?}", config.scoring);

    // The one session this process hosts
    let state = Arc::new(AppState::with_policy(config.scoring));

    let cors = match config
        .cors_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
    {
        Ok(Some(origin)) => CorsLayer::new().allow_origin(origin),
        Ok(None) => CorsLayer::permissive(),
        Err(e) => {
            tracing::error!("Invalid CORS origin, refusing all cross-origin requests: {}", e);
            CorsLayer::new()
        }
    };

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(api::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
