use openchat::config::AppConfig;
use openchat::routes::configure_routes;
use openchat::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    if config.upstream.api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not set; streaming and model listing will fail");
    }

    let addr = config.listen_addr;
    let state = AppState::from_config(config)?;
    let routes = configure_routes(state);

    info!(%addr, "Starting server");
    tokio::select! {
        _ = warp::serve(routes).run(addr) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
