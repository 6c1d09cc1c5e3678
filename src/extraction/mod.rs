//! Text extraction through an OpenAI-compatible chat-completion service.
//!
//! - [`client`]: the [`ChatClient`] contract and its reqwest implementation
//! - [`retry`]: attempt budgets and capped exponential backoff
//! - [`prompts`]: prompt text, sentinels and section markers
//! - [`splitter`]: combined privacy + cookie response splitting
//! - [`extractor`]: [`PolicyExtractor`], which ties them together

pub mod client;
pub mod error;
pub mod extractor;
pub mod prompts;
pub mod retry;
pub mod splitter;
pub mod types;

pub use client::{ChatClient, OpenAiChatClient};
pub use error::ExtractionServiceError;
pub use extractor::{
    CombinedOutcome, ExtractionKind, ExtractionOutcome, ExtractionRequest, ExtractorSettings,
    PolicyExtractor,
};
pub use prompts::{
    COOKIE_MARKER, NO_COOKIE_POLICY_SENTINEL, NO_INFORMATION_SENTINEL, NOT_FOUND_SENTINEL,
    PRIVACY_MARKER,
};
pub use retry::{RetryPolicy, backoff_delay};
pub use splitter::{CombinedSplit, split_combined};
pub use types::{ChatRequest, Message};
