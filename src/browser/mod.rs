//! chromiumoxide-backed browser automation.
//!
//! Launches and manages the shared Chrome instance and implements
//! [`crate::navigator::BrowserSession`] on top of it.

pub mod js_scripts;
pub mod manager;
pub mod page_guard;
pub mod page_timeout;
pub mod session;
pub mod setup;

pub use manager::BrowserManager;
pub use page_guard::PageGuard;
pub use session::{ChromiumPage, ChromiumSession};
pub use setup::{download_managed_browser, find_browser_executable, resolve_browser_executable};
