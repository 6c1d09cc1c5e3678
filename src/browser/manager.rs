//! Browser lifecycle manager
//!
//! Owns the single chromiumoxide browser shared by every page load of every
//! pipeline run in the process. The browser is launched on first use,
//! health-checked on reuse and relaunched after a crash.

use anyhow::{Context, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::setup::launch_browser;

/// Browser plus its CDP handler task and profile directory.
///
/// The handler MUST be aborted once the browser is gone, otherwise it keeps
/// polling a dead websocket.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    pub(crate) fn browser_mut(&mut self) -> &mut Browser {
        &mut self.browser
    }

    /// Remove the profile directory.
    ///
    /// Must run after `browser.wait()` so Chrome has released its file handles.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        debug!("Dropping BrowserWrapper - aborting handler task");
        self.handler.abort();

        if self.user_data_dir.is_some() {
            warn!("BrowserWrapper dropped without explicit shutdown - removing temp dir in Drop");
            self.cleanup_temp_dir();
        }
    }
}

/// Shared, lazily launched browser.
///
/// Cloning is cheap; every clone talks to the same browser.
#[derive(Clone)]
pub struct BrowserManager {
    browser: Arc<Mutex<Option<BrowserWrapper>>>,
    executable: PathBuf,
    headless: bool,
}

impl BrowserManager {
    /// Create a manager. The browser is NOT launched until the first page is requested.
    #[must_use]
    pub fn new(executable: PathBuf, headless: bool) -> Self {
        Self {
            browser: Arc::new(Mutex::new(None)),
            executable,
            headless,
        }
    }

    /// Open a blank page on the shared browser, launching or relaunching it as needed.
    ///
    /// The lock is held only while the page is created, so pages for
    /// concurrent steps are independent once returned.
    pub async fn new_page(&self) -> Result<Page> {
        let mut guard = self.browser.lock().await;

        if let Some(wrapper) = guard.as_ref() {
            match wrapper.browser().version().await {
                Ok(_) => {
                    debug!("Browser health check passed, reusing existing browser");
                }
                Err(e) => {
                    warn!("Browser health check failed: {}. Triggering recovery...", e);
                    if let Some(mut crashed) = guard.take() {
                        // Best-effort: the process may already be gone
                        let _ = crashed.browser_mut().close().await;
                        let _ = crashed.browser_mut().wait().await;
                        crashed.cleanup_temp_dir();
                    }
                }
            }
        }

        if guard.is_none() {
            info!("Launching browser (first use or after recovery)");
            let (browser, handler, user_data_dir) =
                launch_browser(&self.executable, self.headless).await?;
            *guard = Some(BrowserWrapper::new(browser, handler, user_data_dir));
        }

        let wrapper = guard
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Browser unavailable after launch"))?;

        wrapper
            .browser()
            .new_page("about:blank")
            .await
            .context("Failed to create blank page")
    }

    /// Close the browser if running. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        let mut guard = self.browser.lock().await;

        if let Some(mut wrapper) = guard.take() {
            info!("Shutting down browser");

            if let Err(e) = wrapper.browser_mut().close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }
            if let Err(e) = wrapper.browser_mut().wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }

            wrapper.cleanup_temp_dir();
        }

        Ok(())
    }
}
