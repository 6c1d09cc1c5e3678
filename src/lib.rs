//! Compliance document discovery and extraction.
//!
//! Given a website URL, `policyscrape` finds the links to its terms of
//! service, privacy policy and cookie policy with a three-pass cascade, loads
//! each page in Chrome, isolates the policy text, and asks an OpenAI-compatible
//! service to return the document itself.

pub mod browser;
pub mod config;
pub mod content;
pub mod discovery;
pub mod extraction;
pub mod navigator;
pub mod pipeline;
pub mod server;
pub mod utils;

pub use browser::{BrowserManager, ChromiumSession};
pub use config::{ModelStrategy, ScrapeConfig};
pub use discovery::{ComplianceLinkSet, DocumentKind, Link};
pub use extraction::{ChatClient, ExtractionOutcome, OpenAiChatClient, PolicyExtractor};
pub use navigator::{BrowserSession, LoadedPage, NavigationError, NavigationPolicy};
pub use pipeline::{ComplianceScraper, ScrapeError, ScrapeReport, ScraperRuntime, ScrapingResult};
