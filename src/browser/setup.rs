//! Browser discovery and launch.
//!
//! Finds a local Chrome/Chromium (or downloads a managed build) and launches it
//! with the stealth flags policy pages tend to need: many sites serve a bare
//! consent wall to anything that looks automated.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::utils::constants::CHROME_USER_AGENT;

#[cfg(target_os = "windows")]
const INSTALL_LOCATIONS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Chromium\Application\chrome.exe",
];

#[cfg(target_os = "macos")]
const INSTALL_LOCATIONS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/opt/homebrew/bin/chromium",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const INSTALL_LOCATIONS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/usr/local/bin/chromium",
];

/// Binary names looked up on `PATH` when no install location matched.
const PATH_BINARIES: &[&str] = &["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Flags that make the headless browser look like a desktop Chrome and keep
/// background chatter out of page loads.
const LAUNCH_ARGS: &[&str] = &[
    "--lang=en-US,fr-FR",
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--disable-setuid-sandbox",
    "--no-first-run",
    "--no-default-browser-check",
    "--no-sandbox",
    "--ignore-certificate-errors",
    "--password-store=basic",
    "--use-mock-keychain",
    "--hide-scrollbars",
    "--mute-audio",
];

/// CDP frames chromiumoxide cannot decode yet; harmless and very chatty.
const BENIGN_HANDLER_ERRORS: &[&str] = &[
    "data did not match any variant of untagged enum Message",
    "Failed to deserialize WS response",
];

fn expand_home(location: &str) -> Option<PathBuf> {
    match location.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(location)),
    }
}

/// First `name` found in the directories of `path_var`.
fn search_path(path_var: &std::ffi::OsStr, names: &[&str]) -> Option<PathBuf> {
    std::env::split_paths(path_var).find_map(|dir| {
        names
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Find a Chrome/Chromium executable installed on this machine.
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Some(path) = INSTALL_LOCATIONS
        .iter()
        .filter_map(|location| expand_home(location))
        .find(|path| path.exists())
    {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if let Some(path) = std::env::var_os("PATH").and_then(|p| search_path(&p, PATH_BINARIES)) {
        info!("Found browser on PATH: {}", path.display());
        return Ok(path);
    }

    warn!("No Chrome/Chromium executable found locally");
    Err(anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium build into the user cache directory.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("policyscrape")
        .join("chromium");
    info!("Downloading managed Chromium into {}", cache_dir.display());

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .context("Failed to create browser cache directory")?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .context("Failed to build fetcher options")?;
    let installed = BrowserFetcher::new(options)
        .fetch()
        .await
        .context("Failed to fetch browser")?;

    info!("Managed Chromium ready at {}", installed.folder_path.display());
    Ok(installed.executable_path)
}

/// Resolve the executable once at startup.
///
/// An explicitly configured path wins, then a local install, then a managed
/// download.
pub async fn resolve_browser_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            info!("Using configured browser: {}", path.display());
            return Ok(path.to_path_buf());
        }
        warn!("Configured browser path {} does not exist", path.display());
    }

    match find_browser_executable().await {
        Ok(path) => Ok(path),
        Err(_) => download_managed_browser().await,
    }
}

/// Create a fresh profile directory under `parent`.
///
/// `create_dir` fails if the directory already exists, so a relaunch never
/// inherits a crashed browser's profile.
fn create_unique_profile(parent: &Path) -> Result<PathBuf> {
    let path = parent.join(format!("policyscrape_chrome_{}", Uuid::new_v4()));
    debug!("Creating browser profile: {}", path.display());
    std::fs::create_dir(&path)
        .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;
    Ok(path)
}

/// Drive the CDP event stream until the browser goes away.
fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            let Err(e) = event else { continue };
            let message = e.to_string();
            if BENIGN_HANDLER_ERRORS.iter().any(|m| message.contains(m)) {
                trace!("Suppressed CDP decode error: {}", message);
            } else {
                error!("Browser handler error: {:?}", e);
            }
        }
        info!("Browser handler task completed");
    })
}

/// Launch Chrome with a throwaway profile.
///
/// Returns the browser, its CDP handler task and the profile directory. The
/// handler task must be aborted and the directory removed once the browser
/// has exited; [`super::manager::BrowserWrapper`] does both.
pub async fn launch_browser(
    chrome_path: &Path,
    headless: bool,
) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    let user_data_dir = create_unique_profile(&std::env::temp_dir())?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path)
        .arg(format!("--user-agent={CHROME_USER_AGENT}"));
    builder = if headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };
    for arg in LAUNCH_ARGS {
        builder = builder.arg(*arg);
    }

    let config = builder
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {e}"))?;

    info!(executable = %chrome_path.display(), headless, "Launching browser");
    let (browser, handler) = Browser::launch(config)
        .await
        .context("Failed to launch browser")?;

    Ok((browser, spawn_handler(handler), user_data_dir))
}
