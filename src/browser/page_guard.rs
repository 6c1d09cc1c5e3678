//! Scoped ownership of a chromiumoxide page.

use chromiumoxide::page::Page;
use std::ops::Deref;
use tracing::{debug, warn};

/// Closes its page when dropped.
///
/// Call [`PageGuard::close`] on the normal path to await the close. On every
/// other exit path (early `?` return, a dropped future) `Drop` spawns the
/// close on the current runtime so the tab is never leaked.
pub struct PageGuard {
    page: Page,
    label: String,
    closed: bool,
}

impl PageGuard {
    pub fn new(page: Page, label: impl Into<String>) -> Self {
        Self {
            page,
            label: label.into(),
            closed: false,
        }
    }

    /// Close the page and wait for the browser to acknowledge.
    pub async fn close(mut self) {
        self.closed = true;
        match self.page.clone().close().await {
            Ok(()) => debug!(label = %self.label, "Page closed"),
            Err(e) => warn!(label = %self.label, "Failed to close page: {}", e),
        }
    }
}

impl Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        let page = self.page.clone();
        let label = std::mem::take(&mut self.label);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        warn!(label = %label, "Failed to close page from drop: {}", e);
                    }
                });
            }
            Err(_) => warn!(label = %label, "No runtime available to close page from drop"),
        }
    }
}
