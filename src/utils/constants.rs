//! Shared configuration constants for policyscrape
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Navigation timeout for the fast policy (DOM parsed).
pub const DEFAULT_FAST_TIMEOUT_SECS: u64 = 15;

/// Navigation timeout for the patient policy (network quiet).
///
/// Used for pages known to render their content client-side after load.
pub const DEFAULT_PATIENT_TIMEOUT_SECS: u64 = 60;

/// Upper bound on consent-banner dismissal so a missing banner never stalls a page.
pub const DEFAULT_CONSENT_TIMEOUT_MS: u64 = 1500;

/// Maximum number of secondary "about/legal/help" pages visited by the menu pass.
pub const MAX_SECONDARY_PAGES: usize = 3;

/// Character cap on cleaned page text sent to the extraction service.
///
/// Bounds cost and latency of the downstream call.
pub const MAX_CONTENT_CHARS: usize = 80_000;

/// Marker appended to cleaned text that hit [`MAX_CONTENT_CHARS`].
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated due to length...]";

/// Minimum text length for a candidate policy container to be accepted.
pub const MIN_CONTAINER_TEXT_CHARS: usize = 200;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for the first extraction attempt.
pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-4o";

/// Model used once the primary model timed out.
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-4o-mini";

/// Completion token budget for a single document.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Request timeout for the primary model.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

/// Request timeout once the fallback model is in use.
pub const DEFAULT_LLM_FALLBACK_TIMEOUT_SECS: u64 = 120;

/// Attempts for a single-document extraction.
pub const SINGLE_EXTRACTION_ATTEMPTS: u32 = 3;

/// Attempts for a combined privacy + cookie extraction.
pub const COMBINED_EXTRACTION_ATTEMPTS: u32 = 4;

/// Attempts for deriving a cookie section from privacy text.
pub const COOKIE_DERIVATION_ATTEMPTS: u32 = 2;

/// First backoff step in milliseconds.
pub const BACKOFF_BASE_MS: u64 = 1000;

/// Backoff ceiling in milliseconds.
pub const BACKOFF_CAP_MS: u64 = 4000;

/// Default bind address for the HTTP endpoint.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Chrome user agent string for stealth mode
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
