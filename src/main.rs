// policyscrape HTTP server
//
// Serves `POST /api/scrape` and `GET /health`. With a URL argument it runs a
// single scrape instead and prints the result as JSON.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policyscrape::server::build_router;
use policyscrape::{ScrapeConfig, ScraperRuntime};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

async fn scrape_once(runtime: &ScraperRuntime, url: &str) -> Result<()> {
    let report = runtime
        .scraper()
        .discover_and_extract(url)
        .await
        .with_context(|| format!("Failed to scrape {url}"))?;
    let json = serde_json::to_string_pretty(&report.into_result())
        .context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,policyscrape=debug,chromiumoxide=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ScrapeConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(?config, "Configuration loaded");

    let runtime = ScraperRuntime::initialize(&config)
        .await
        .context("Failed to initialize browser runtime")?;

    if let Some(url) = std::env::args().nth(1) {
        let result = scrape_once(&runtime, &url).await;
        runtime.shutdown().await;
        return result;
    }

    let app = build_router(runtime.scraper());

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;
    tracing::info!("Listening on {}", config.bind_addr());
    tracing::info!("Health check: http://{}/health", config.bind_addr());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    runtime.shutdown().await;
    served
}

