use anyhow::Result;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use story_gateway::{
    config::AppConfig,
    gateway::{self, AppState},
    inference::OllamaClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // -----------------------------
    // Config / upstream client
    // -----------------------------
    let config = AppConfig::load()?;
    let model = OllamaClient::new(&config);
    info!(upstream = %config.ollama_url, model = %config.model, "model service configured");

    let state = AppState::new(model);

    // -----------------------------
    // Routers
    // -----------------------------
    let app = gateway::router()
        // CORS for frontend
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state);

    let addr = config.bind_addr.as_str();

    println!("🌐 HTTP listening on http://{addr}");
    println!("📝 Endpoints: /generate_outline /generate_storyline /generate_story");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
