//! HTTP endpoint in front of the pipeline.
//!
//! - `POST /api/scrape` with `{"url": "..."}` returns the three documents
//! - `GET /health` returns `ok`

mod handlers;

pub use handlers::{ErrorBody, ScrapeRequest, health_handler, scrape_handler};

use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::discovery::DocumentKind;
use crate::extraction::ChatClient;
use crate::navigator::BrowserSession;
use crate::pipeline::{ComplianceScraper, ScrapeError, ScrapeReport};

/// Anything that can turn a URL into a [`ScrapeReport`].
#[async_trait]
pub trait ComplianceService: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapeReport, ScrapeError>;
}

#[async_trait]
impl<S, C> ComplianceService for ComplianceScraper<S, C>
where
    S: BrowserSession,
    C: ChatClient,
{
    async fn scrape(&self, url: &str) -> Result<ScrapeReport, ScrapeError> {
        self.discover_and_extract(url).await
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<dyn ComplianceService>,
}

/// Build the router with CORS and request tracing.
pub fn build_router(scraper: Arc<dyn ComplianceService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/scrape", post(scrape_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { scraper })
}

/// Documents a report actually found, for log lines.
#[must_use]
pub fn found_kinds(report: &ScrapeReport) -> Vec<DocumentKind> {
    DocumentKind::ALL
        .into_iter()
        .filter(|kind| report.get(*kind).is_some_and(|o| o.is_found()))
        .collect()
}
