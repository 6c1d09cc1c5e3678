//! Test utilities shared by the policyscrape integration tests.
//!
//! `FakeSession` serves in-memory pages keyed by address and records every
//! load, footer query, consent click and close so tests can check page
//! ownership. `ScriptedChatClient` answers chat requests from a closure and
//! keeps every request it saw.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use policyscrape::extraction::{ChatClient, ChatRequest, ExtractionServiceError};
use policyscrape::navigator::{BrowserSession, LoadedPage, NavigationError, NavigationPolicy};
use policyscrape::Link;

pub const ROOT: &str = "https://example.com";

/// Absolute address on the test site.
#[allow(dead_code)]
pub fn addr(path: &str) -> String {
    format!("{ROOT}{path}")
}

#[allow(dead_code)]
pub fn link(text: &str, path: &str) -> Link {
    Link::new(text, addr(path))
}

#[allow(dead_code)]
pub fn footer_link(text: &str, path: &str) -> Link {
    Link::new(text, addr(path)).in_footer()
}

/// A policy page whose `<main>` holds `paragraph` repeated past the container threshold.
#[allow(dead_code)]
pub fn policy_html(title: &str, paragraph: &str) -> String {
    let body = std::iter::repeat_n(format!("<p>{paragraph}</p>"), 8).collect::<String>();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><title>{title}</title></head>
<body>
    <header><nav><a href="/">Home</a></nav></header>
    <main><h1>{title}</h1>{body}</main>
    <footer>Copyright</footer>
</body>
</html>"#
    )
}

/// One page of the fake site.
#[derive(Debug, Clone, Default)]
pub struct PageSpec {
    pub anchors: Vec<Link>,
    pub footer_anchors: Vec<Link>,
    pub html: String,
    /// Policies under which navigation to this page fails
    pub fail_under: Vec<NavigationPolicy>,
}

#[allow(dead_code)]
impl PageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchors(mut self, anchors: Vec<Link>) -> Self {
        self.anchors = anchors;
        self
    }

    /// Anchors returned by footer queries only.
    pub fn footer(mut self, anchors: Vec<Link>) -> Self {
        self.footer_anchors = anchors;
        self
    }

    /// Anchors that sit in the footer and therefore also in the full anchor list.
    pub fn footer_and_main(mut self, anchors: Vec<Link>) -> Self {
        self.anchors.extend(anchors.iter().cloned());
        self.footer_anchors = anchors;
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_under = vec![NavigationPolicy::Fast, NavigationPolicy::Patient];
        self
    }

    pub fn failing_under(mut self, policy: NavigationPolicy) -> Self {
        self.fail_under.push(policy);
        self
    }
}

/// What the fake browser observed.
#[derive(Debug, Default)]
pub struct SessionLog {
    pub loads: Vec<(String, NavigationPolicy)>,
    pub footer_queries: usize,
    pub consent_checks: usize,
    pub open_pages: usize,
    pub max_open_pages: usize,
    pub closed_pages: usize,
}

fn key(address: &str) -> String {
    address.split('#').next().unwrap_or(address).trim_end_matches('/').to_string()
}

#[derive(Clone, Default)]
pub struct FakeSession {
    pages: Arc<HashMap<String, PageSpec>>,
    log: Arc<Mutex<SessionLog>>,
}

#[allow(dead_code)]
impl FakeSession {
    pub fn new(pages: Vec<(String, PageSpec)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().map(|(a, p)| (key(&a), p)).collect()),
            log: Arc::new(Mutex::new(SessionLog::default())),
        }
    }

    pub fn with_log<T>(&self, f: impl FnOnce(&SessionLog) -> T) -> T {
        let log = self.log.lock().expect("session log poisoned");
        f(&log)
    }

    /// Addresses loaded, in order, without policies.
    pub fn loaded(&self) -> Vec<String> {
        self.with_log(|log| log.loads.iter().map(|(a, _)| a.clone()).collect())
    }

    pub fn load_count(&self, address: &str) -> usize {
        self.with_log(|log| log.loads.iter().filter(|(a, _)| key(a) == key(address)).count())
    }

    pub fn open_pages(&self) -> usize {
        self.with_log(|log| log.open_pages)
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn load(&self, url: &str, policy: NavigationPolicy) -> Result<FakePage, NavigationError> {
        let mut log = self.log.lock().expect("session log poisoned");
        log.loads.push((url.to_string(), policy));

        let spec = match self.pages.get(&key(url)) {
            Some(spec) if !spec.fail_under.contains(&policy) => spec.clone(),
            Some(_) => return Err(NavigationError::timeout(url, policy, 15)),
            None => return Err(NavigationError::failed(url, policy, "net::ERR_NAME_NOT_RESOLVED")),
        };

        log.open_pages += 1;
        log.max_open_pages = log.max_open_pages.max(log.open_pages);
        Ok(FakePage {
            url: url.to_string(),
            spec,
            log: Arc::clone(&self.log),
        })
    }
}

pub struct FakePage {
    url: String,
    spec: PageSpec,
    log: Arc<Mutex<SessionLog>>,
}

#[async_trait]
impl LoadedPage for FakePage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn list_anchors(&self) -> Result<Vec<Link>, NavigationError> {
        Ok(self.spec.anchors.clone())
    }

    async fn list_anchors_within(&self, _selectors: &[&str]) -> Result<Vec<Link>, NavigationError> {
        self.log.lock().expect("session log poisoned").footer_queries += 1;
        Ok(self.spec.footer_anchors.clone())
    }

    async fn document_html(&self) -> Result<String, NavigationError> {
        Ok(self.spec.html.clone())
    }

    async fn dismiss_consent_if_present(&self) -> bool {
        self.log.lock().expect("session log poisoned").consent_checks += 1;
        false
    }

    async fn close(self) {
        let mut log = self.log.lock().expect("session log poisoned");
        log.open_pages -= 1;
        log.closed_pages += 1;
    }
}

type Responder = dyn Fn(&ChatRequest) -> Result<String, ExtractionServiceError> + Send + Sync;

/// Chat client answering from a closure and recording requests.
#[derive(Clone)]
pub struct ScriptedChatClient {
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<ChatRequest>>>,
}

#[allow(dead_code)]
impl ScriptedChatClient {
    pub fn new(
        responder: impl Fn(&ChatRequest) -> Result<String, ExtractionServiceError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always fails as if the service host did not resolve.
    pub fn unreachable() -> Self {
        Self::new(|_| Err(ExtractionServiceError::Network("connection refused".into())))
    }

    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn system_prompts(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| c.system_prompt().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn chat_completion(&self, request: ChatRequest) -> Result<String, ExtractionServiceError> {
        let reply = (self.responder)(&request);
        self.calls.lock().expect("call log poisoned").push(request);
        reply
    }
}

/// Which prompt a request carries, judged from its system prompt.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Terms,
    Privacy,
    Cookie,
    Combined,
    CookieFromPrivacy,
}

#[allow(dead_code)]
pub fn prompt_kind(request: &ChatRequest) -> PromptKind {
    use policyscrape::extraction::{COOKIE_MARKER, NO_INFORMATION_SENTINEL};

    let system = request.system_prompt().unwrap_or_default();
    if system.contains(COOKIE_MARKER) {
        PromptKind::Combined
    } else if system.contains(NO_INFORMATION_SENTINEL) {
        PromptKind::CookieFromPrivacy
    } else if system.contains("terms of service") {
        PromptKind::Terms
    } else if system.contains("privacy policy") {
        PromptKind::Privacy
    } else {
        PromptKind::Cookie
    }
}
