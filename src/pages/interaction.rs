use regex::Regex;
use serde_json::{json, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::browser::{Browser, BrowserError, Locator};
use crate::config::Timeouts;
use crate::logger::{Annotations, Logger};

/// What went wrong with a single gesture or check
#[derive(Debug, Error)]
pub enum PageErrorKind {
    #[error("not visible within {}ms", .0.as_millis())]
    NotVisible(Duration),
    #[error("still visible after {}ms", .0.as_millis())]
    StillVisible(Duration),
    #[error("not enabled within {}ms", .0.as_millis())]
    NotEnabled(Duration),
    #[error("expected URL pattern: {expected}, actual URL: {actual}")]
    UrlMismatch { expected: String, actual: String },
    #[error("expected text {expected:?}, found {actual:?}")]
    TextMismatch {
        expected: String,
        actual: Option<String>,
    },
    #[error("no envelope named {0:?}")]
    EnvelopeNotFound(String),
    #[error("no new envelope row appeared within {}ms", .0.as_millis())]
    NoNewRow(Duration),
    #[error("page not ready within {}ms", .0.as_millis())]
    NotReady(Duration),
    #[error("invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("underlying error: {0}")]
    Browser(#[from] BrowserError),
}

/// A failed page-object step, naming the gesture and the element it targeted.
#[derive(Debug)]
pub struct PageError {
    pub operation: Option<String>,
    pub action: String,
    pub element: String,
    pub kind: PageErrorKind,
}

impl PageError {
    pub fn new(action: impl Into<String>, element: impl Into<String>, kind: PageErrorKind) -> Self {
        Self {
            operation: None,
            action: action.into(),
            element: element.into(),
            kind,
        }
    }

    /// Record the page operation this step belonged to, keeping the innermost one.
    pub fn during(mut self, operation: &str) -> Self {
        if self.operation.is_none() {
            self.operation = Some(operation.to_string());
        }
        self
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(operation) = &self.operation {
            write!(f, "{}: ", operation)?;
        }
        write!(f, "Failed to {} {}: {}", self.action, self.element, self.kind)
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

pub type PageResult<T> = Result<T, PageError>;

/// Everything a page object needs at construction: one browser session,
/// the wait budget, the site root and the report sink.
#[derive(Clone)]
pub struct PageContext {
    pub browser: Arc<dyn Browser>,
    pub timeouts: Timeouts,
    pub site_url: String,
    pub annotations: Option<Annotations>,
}

impl PageContext {
    pub fn new(browser: Arc<dyn Browser>, site_url: impl Into<String>) -> Self {
        Self {
            browser,
            timeouts: Timeouts::default(),
            site_url: site_url.into().trim_end_matches('/').to_string(),
            annotations: None,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    /// Logger for page `name`, wired to the shared report when one is set.
    pub fn page_logger(&self, name: &str) -> Logger {
        let logger = Logger::page(name);
        match &self.annotations {
            Some(annotations) => logger.with_annotations(annotations.clone()),
            None => logger,
        }
    }

    pub fn interaction(&self, page_name: &str) -> PageInteraction {
        PageInteraction {
            browser: Arc::clone(&self.browser),
            timeouts: self.timeouts,
            logger: self.page_logger(page_name),
        }
    }

    /// Host part of the site URL, used to build URL patterns.
    pub fn site_host(&self) -> String {
        url::Url::parse(&self.site_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_else(|| "goodbudget.com".to_string())
    }

    /// Pattern matching `<host>/<path>` anywhere in a URL.
    pub fn url_pattern(&self, path: &str) -> String {
        format!(".*{}/{}", regex::escape(&self.site_host()), regex::escape(path))
    }
}

/// Shared gesture and assertion helpers bound to one browser session and
/// one page logger.
#[derive(Clone)]
pub struct PageInteraction {
    browser: Arc<dyn Browser>,
    timeouts: Timeouts,
    logger: Logger,
}

impl PageInteraction {
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn browser(&self) -> &dyn Browser {
        self.browser.as_ref()
    }

    /// Run one named page operation, logging its start and outcome and
    /// tagging any failure with `operation`.
    pub async fn operation<T, Fut>(&self, operation: &str, details: Option<Value>, body: Fut) -> PageResult<T>
    where
        Fut: Future<Output = PageResult<T>>,
    {
        self.logger.action_start(operation, details.clone());
        match body.await {
            Ok(value) => {
                self.logger.action_success(operation, details);
                Ok(value)
            }
            Err(err) => {
                let err = err.during(operation);
                self.logger.action_failure(operation, &err, details);
                Err(err)
            }
        }
    }

    /// Re-run `probe` until it yields `Some` or `timeout` elapses.
    ///
    /// An element detached mid-probe counts as a miss; the next attempt
    /// resolves the locator afresh.
    pub(crate) async fn poll<T, F, Fut>(&self, timeout: Duration, mut probe: F) -> Result<Option<T>, BrowserError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, BrowserError>>,
    {
        let deadline = Instant::now() + timeout;
        loop {
            match probe().await {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => {}
                Err(BrowserError::Detached(element)) => {
                    self.logger
                        .debug(format!("{} detached while polling, retrying", element), None);
                }
                Err(err) => return Err(err),
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(self.timeouts.poll_interval).await;
        }
    }

    pub async fn goto(&self, url: &str, page_name: &str) -> PageResult<()> {
        self.logger.page_navigation(url, Some(page_name));
        self.browser
            .goto(url)
            .await
            .map_err(|e| PageError::new("navigate to", page_name, e.into()))
    }

    /// Wait until `document.readyState` is past `loading`.
    pub async fn wait_for_dom_ready(&self, timeout: Duration) -> PageResult<()> {
        let browser = &self.browser;
        let ready = self
            .poll(timeout, || async move {
                let state = browser.ready_state().await?;
                Ok::<_, BrowserError>((state == "interactive" || state == "complete").then_some(()))
            })
            .await
            .map_err(|e| PageError::new("load", "page", e.into()))?;

        ready.ok_or_else(|| PageError::new("load", "page", PageErrorKind::NotReady(timeout)))
    }

    /// Poll for visibility without failing; `false` after `timeout`.
    pub async fn appears_within(&self, locator: &Locator, timeout: Duration) -> Result<bool, BrowserError> {
        let browser = &self.browser;
        let seen = self
            .poll(timeout, || async move {
                Ok::<_, BrowserError>(browser.is_visible(locator).await?.then_some(()))
            })
            .await?;
        Ok(seen.is_some())
    }

    pub async fn expect_visible(&self, locator: &Locator, element: &str, timeout: Duration) -> PageResult<()> {
        let visible = self
            .appears_within(locator, timeout)
            .await
            .map_err(|e| PageError::new("find", element, e.into()))?;
        if visible {
            Ok(())
        } else {
            Err(PageError::new("find", element, PageErrorKind::NotVisible(timeout)))
        }
    }

    pub async fn expect_hidden(&self, locator: &Locator, element: &str, timeout: Duration) -> PageResult<()> {
        let browser = &self.browser;
        let gone = self
            .poll(timeout, || async move {
                Ok::<_, BrowserError>((!browser.is_visible(locator).await?).then_some(()))
            })
            .await
            .map_err(|e| PageError::new("hide", element, e.into()))?;

        gone.ok_or_else(|| PageError::new("hide", element, PageErrorKind::StillVisible(timeout)))
    }

    pub async fn expect_enabled(&self, locator: &Locator, element: &str, timeout: Duration) -> PageResult<()> {
        let browser = &self.browser;
        let enabled = self
            .poll(timeout, || async move {
                if !browser.is_visible(locator).await? {
                    return Ok(None);
                }
                Ok::<_, BrowserError>(browser.is_enabled(locator).await?.then_some(()))
            })
            .await
            .map_err(|e| PageError::new("enable", element, e.into()))?;

        enabled.ok_or_else(|| PageError::new("enable", element, PageErrorKind::NotEnabled(timeout)))
    }

    /// Wait for the element to be visible, then click it.
    pub async fn click_element(&self, locator: &Locator, element: &str) -> PageResult<()> {
        self.click_element_within(locator, element, self.timeouts.click).await
    }

    pub async fn click_element_within(
        &self,
        locator: &Locator,
        element: &str,
        timeout: Duration,
    ) -> PageResult<()> {
        let outcome: Result<(), PageErrorKind> = match self.appears_within(locator, timeout).await {
            Ok(true) => self.browser.click(locator).await.map_err(PageErrorKind::from),
            Ok(false) => Err(PageErrorKind::NotVisible(timeout)),
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(()) => {
                self.logger.debug(format!("{} button clicked successfully.", element), None);
                Ok(())
            }
            Err(kind) => {
                let err = PageError::new("click", element, kind);
                self.logger.error(format!("Error clicking {} button: {}", element, err), None);
                Err(err)
            }
        }
    }

    /// Wait until the current URL matches the regular expression `pattern`.
    pub async fn check_url(&self, pattern: &str, page_name: &str) -> PageResult<()> {
        self.check_url_within(pattern, page_name, self.timeouts.url).await
    }

    pub async fn check_url_within(
        &self,
        pattern: &str,
        page_name: &str,
        timeout: Duration,
    ) -> PageResult<()> {
        let pattern = Regex::new(pattern)
            .map_err(|e| PageError::new("verify URL for", page_name, e.into()))?;
        let pattern = &pattern;
        let browser = &self.browser;
        let matched = self
            .poll(timeout, || async move {
                let url = browser.current_url().await?;
                Ok::<_, BrowserError>(pattern.is_match(&url).then_some(url))
            })
            .await
            .map_err(|e| PageError::new("verify URL for", page_name, e.into()))?;

        match matched {
            Some(url) => {
                self.logger.info(
                    format!("Successfully navigated to {} page. URL matches: {}", page_name, pattern),
                    Some(json!({ "url": url })),
                );
                Ok(())
            }
            None => {
                let actual = self.browser.current_url().await.unwrap_or_default();
                let err = PageError::new(
                    "verify URL for",
                    format!("{} page", page_name).trim().to_string(),
                    PageErrorKind::UrlMismatch {
                        expected: pattern.to_string(),
                        actual,
                    },
                );
                self.logger.error(err.to_string(), None);
                Err(err)
            }
        }
    }

    /// Replace the input's contents with `value`.
    pub async fn fill_input(&self, locator: &Locator, value: &str, field: &str) -> PageResult<()> {
        match self.browser.fill(locator, value).await {
            Ok(()) => {
                self.logger.element_interaction("Fill", field, Some(value));
                Ok(())
            }
            Err(e) => {
                let err = PageError::new("enter", field, e.into());
                self.logger.error(format!("Error entering {}: {}", field, err), None);
                Err(err)
            }
        }
    }

    pub async fn press_enter(&self, locator: &Locator, field: &str) -> PageResult<()> {
        self.browser
            .press_enter(locator)
            .await
            .map_err(|e| PageError::new("press Enter in", field, e.into()))
    }

    pub async fn enter_email(&self, locator: &Locator, email: &str) -> PageResult<()> {
        self.fill_input(locator, email, "email").await
    }

    pub async fn enter_password(&self, locator: &Locator, password: &str) -> PageResult<()> {
        self.fill_input(locator, password, "password").await
    }

    /// Wait until the element's text contains `expected`.
    pub async fn expect_text_contains(&self, locator: &Locator, expected: &str, element: &str) -> PageResult<()> {
        self.expect_text(locator, expected, element, self.timeouts.assertion, |actual, expected| {
            actual.contains(expected)
        })
        .await
    }

    /// Wait until the element's trimmed text equals `expected`.
    pub async fn expect_text_equals(&self, locator: &Locator, expected: &str, element: &str) -> PageResult<()> {
        self.expect_text(locator, expected, element, self.timeouts.assertion, |actual, expected| {
            actual.trim() == expected
        })
        .await
    }

    async fn expect_text(
        &self,
        locator: &Locator,
        expected: &str,
        element: &str,
        timeout: Duration,
        matches: fn(&str, &str) -> bool,
    ) -> PageResult<()> {
        let browser = &self.browser;
        let found = self
            .poll(timeout, || async move {
                if !browser.is_visible(locator).await? {
                    return Ok(None);
                }
                let text = browser.text(locator).await?.unwrap_or_default();
                Ok::<_, BrowserError>(matches(&text, expected).then_some(()))
            })
            .await
            .map_err(|e| PageError::new("read text of", element, e.into()))?;

        if found.is_some() {
            return Ok(());
        }

        let actual = self
            .browser
            .text(locator)
            .await
            .ok()
            .flatten()
            .map(|t| t.trim().to_string());
        Err(PageError::new(
            "match text of",
            element,
            PageErrorKind::TextMismatch {
                expected: expected.to_string(),
                actual,
            },
        ))
    }

    pub async fn text_of(&self, locator: &Locator, element: &str) -> PageResult<Option<String>> {
        self.browser
            .text(locator)
            .await
            .map_err(|e| PageError::new("read text of", element, e.into()))
    }

    pub async fn pause(&self, prompt: &str) -> PageResult<()> {
        self.browser
            .pause(prompt)
            .await
            .map_err(|e| PageError::new("resume after", "manual pause", e.into()))
    }
}
