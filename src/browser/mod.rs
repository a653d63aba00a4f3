//! The page-interaction capability shared by every page object.
//!
//! [`Browser`] exposes single-shot probes and gestures; all waiting and
//! retry-until-timeout logic lives in [`crate::pages::PageInteraction`], so
//! an implementation never blocks except inside [`Browser::pause`].

pub mod webdriver;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub use webdriver::WebDriverBrowser;

/// Browser-level failures
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
    #[error("No element matches {0}")]
    NoSuchElement(String),
    #[error("Element {0} went stale or left the page")]
    Detached(String),
    #[error("Script evaluation failed: {0}")]
    Script(String),
    #[error("Manual pause interrupted: {0}")]
    Pause(#[from] std::io::Error),
}

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "css={}", css),
            Selector::XPath(xpath) => write!(f, "xpath={}", xpath),
        }
    }
}

/// Deferred reference to a DOM element, re-resolved on every use.
///
/// Each step after the first is searched for inside the element matched by
/// the step before it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    chain: Vec<Selector>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            chain: vec![Selector::Css(selector.into())],
        }
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self {
            chain: vec![Selector::XPath(selector.into())],
        }
    }

    /// Scope `child` to this locator's element.
    pub fn locator(&self, child: Locator) -> Self {
        let mut chain = self.chain.clone();
        chain.extend(child.chain);
        Self { chain }
    }

    pub fn chain(&self) -> &[Selector] {
        &self.chain
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.chain.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    /// `document.readyState` of the current page.
    async fn ready_state(&self) -> Result<String, BrowserError>;

    /// `false` when nothing matches.
    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError>;

    async fn is_enabled(&self, locator: &Locator) -> Result<bool, BrowserError>;

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError>;

    /// Replace the element's value with `value`.
    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), BrowserError>;

    async fn press_enter(&self, locator: &Locator) -> Result<(), BrowserError>;

    /// Rendered text, or `None` when nothing matches.
    async fn text(&self, locator: &Locator) -> Result<Option<String>, BrowserError>;

    /// Current value of an input, or `None` when nothing matches.
    async fn input_value(&self, locator: &Locator) -> Result<Option<String>, BrowserError>;

    /// `attribute` of every element the locator matches, skipping elements without it.
    async fn attributes(
        &self,
        locator: &Locator,
        attribute: &str,
    ) -> Result<Vec<String>, BrowserError>;

    /// Suspend until a human resumes the run.
    async fn pause(&self, prompt: &str) -> Result<(), BrowserError>;
}
