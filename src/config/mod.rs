//! Configuration module for compliance scraping
//!
//! This module provides the `ScrapeConfig` struct and its type-safe builder
//! with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod types;

// Re-exports for public API
pub use builder::{ScrapeConfigBuilder, WithApiKey};
pub use types::{ModelStrategy, ScrapeConfig};
