//! HTTP endpoint behaviour with a stubbed pipeline.

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use policyscrape::discovery::{CascadeStage, ComplianceLinkSet};
use policyscrape::extraction::ExtractionOutcome;
use policyscrape::navigator::{NavigationError, NavigationPolicy};
use policyscrape::server::{ComplianceService, build_router};
use policyscrape::{ScrapeError, ScrapeReport};

/// Succeeds with a privacy document for every URL.
struct PrivacyOnly;

#[async_trait]
impl ComplianceService for PrivacyOnly {
    async fn scrape(&self, url: &str) -> Result<ScrapeReport, ScrapeError> {
        Ok(ScrapeReport {
            url: url.to_string(),
            terms: None,
            privacy: Some(ExtractionOutcome::Found("Privacy document".into())),
            cookie: Some(ExtractionOutcome::Failed("Rate limited".into())),
            links: ComplianceLinkSet::default(),
            passes: vec![CascadeStage::MainPage, CascadeStage::FooterPass],
            combined: false,
            cookie_derived: false,
        })
    }
}

/// Root page never loads.
struct Unreachable;

#[async_trait]
impl ComplianceService for Unreachable {
    async fn scrape(&self, url: &str) -> Result<ScrapeReport, ScrapeError> {
        Err(NavigationError::timeout(url, NavigationPolicy::Patient, 60).into())
    }
}

async fn call(service: Arc<dyn ComplianceService>, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = build_router(service)
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (status, body.to_vec())
}

fn scrape_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/scrape")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("valid request");
    let (status, body) = call(Arc::new(PrivacyOnly), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_scrape_success_returns_camel_case_result() {
    let (status, body) = call(
        Arc::new(PrivacyOnly),
        scrape_request(json!({ "url": "https://example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(
        json,
        json!({
            "termsOfService": null,
            "privacyPolicy": "Privacy document",
            "cookiePolicy": "Failed to extract cookie policy: Rate limited"
        })
    );
}

#[tokio::test]
async fn test_malformed_url_is_bad_request() {
    let (status, body) = call(
        Arc::new(PrivacyOnly),
        scrape_request(json!({ "url": "not-a-url" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["error"], "Invalid URL");
    assert_eq!(json["url"], "not-a-url");
}

#[tokio::test]
async fn test_missing_url_field_is_bad_request() {
    let (status, body) = call(Arc::new(PrivacyOnly), scrape_request(json!({ "link": "x" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["url"], Value::Null);
}

#[tokio::test]
async fn test_pipeline_failure_is_internal_error() {
    let (status, body) = call(
        Arc::new(Unreachable),
        scrape_request(json!({ "url": "https://down.example" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["error"], "Failed to scrape compliance documents");
    assert_eq!(json["url"], "https://down.example");
    assert!(
        json["details"]
            .as_str()
            .is_some_and(|d| d.contains("timeout after 60 seconds"))
    );
}
