use std::net::SocketAddr;

use anyhow::Context;
use cellar_console::config::AppConfig;
use cellar_console::repository::Repositories;
use cellar_console::{routes, AppState};
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cellar_console=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("API_BASE_URL must be set")?;

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("Failed to build HTTP client")?;
    let repositories = Repositories::http(http, &config.api_base_url);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("BACKEND_HOST/BACKEND_PORT do not form a socket address")?;
    tracing::info!(host = %addr, upstream = %config.api_base_url, "Starting cellar console gateway");

    let app = routes::router(AppState::new(config, repositories));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
