//! Pipeline orchestration: validate URL, load root page, discover links,
//! extract each document.

pub mod error;
pub mod report;
pub mod runtime;
pub mod scraper;

pub use error::ScrapeError;
pub use report::{ScrapeReport, ScrapingResult};
pub use runtime::{ProductionScraper, ScraperRuntime};
pub use scraper::ComplianceScraper;
