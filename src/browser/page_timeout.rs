//! Timeout utilities for page operations
//!
//! Every browser call the pipeline makes goes through one of these so a hung
//! page cannot stall a run.

use std::future::Future;
use std::time::Duration;

/// Outcome of a bounded page operation.
#[derive(Debug)]
pub enum Bounded<T> {
    Done(T),
    TimedOut,
}

/// Run `operation` for at most `timeout`.
pub async fn with_page_timeout<F, T>(operation: F, timeout: Duration) -> Bounded<T>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(value) => Bounded::Done(value),
        Err(_) => Bounded::TimedOut,
    }
}
