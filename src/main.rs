use std::env;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glean::config::Config;
use glean::handlers;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glean=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting Glean extraction relay");
    tracing::info!("Model: {}", config.gemini_model);
    tracing::info!("Max request body: {}MB", config.max_image_size_mb);

    // PORT wins over SERVER_PORT for platform deploys.
    let port = env::var("PORT")
        .unwrap_or_else(|_| config.server_port.to_string())
        .parse::<u16>()
        .unwrap_or(config.server_port);

    let addr = format!("{}:{}", config.server_host, port);
    let app = handlers::app(config);

    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
