//! Route handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{AppState, found_kinds};
use crate::pipeline::ScrapeError;
use crate::utils::is_valid_url;

/// Body of `POST /api/scrape`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn error_response(
    status: StatusCode,
    error: &str,
    url: Option<String>,
    details: Option<String>,
) -> Response {
    let body = ErrorBody {
        error: error.to_string(),
        url,
        details,
    };
    (status, Json(body)).into_response()
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn scrape_handler(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected scrape request body");
            return error_response(
                StatusCode::BAD_REQUEST,
                "Request body must be JSON with a \"url\" field",
                None,
                Some(rejection.body_text()),
            );
        }
    };

    let url = request.url.trim().to_string();
    if !is_valid_url(&url) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid URL", Some(url), None);
    }

    info!(%url, "Scrape requested");
    match state.scraper.scrape(&url).await {
        Ok(report) => {
            info!(%url, found = ?found_kinds(&report), "Scrape complete");
            (StatusCode::OK, Json(report.into_result())).into_response()
        }
        Err(ScrapeError::InvalidUrl(_)) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid URL", Some(url), None)
        }
        Err(e) => {
            error!(%url, error = %e, "Scrape failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to scrape compliance documents",
                Some(url),
                Some(e.to_string()),
            )
        }
    }
}
