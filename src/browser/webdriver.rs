use async_trait::async_trait;
use thirtyfour::error::WebDriverErrorInner;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::{Browser, BrowserError, Locator, Selector};
use crate::config::E2eConfig;

/// [`Browser`] backed by a Chrome session on a WebDriver server
pub struct WebDriverBrowser {
    driver: WebDriver,
}

impl WebDriverBrowser {
    /// Open a new Chrome session on the configured WebDriver server.
    pub async fn connect(config: &E2eConfig) -> Result<Self, BrowserError> {
        let mut caps = DesiredCapabilities::chrome();
        if config.headless {
            caps.set_headless()?;
        }

        debug!(
            "Connecting to WebDriver at {} (headless: {})",
            config.webdriver_url, config.headless
        );
        let driver = WebDriver::new(config.webdriver_url.as_str(), caps).await?;
        info!("WebDriver session started");

        Ok(Self { driver })
    }

    /// End the session and close the browser window.
    pub async fn quit(&self) -> Result<(), BrowserError> {
        self.driver.clone().quit().await?;
        Ok(())
    }

    /// A resolved element that went stale or vanished before the follow-up
    /// call is reported as [`BrowserError::Detached`] so waits can retry.
    fn settle(locator: &Locator, err: WebDriverError) -> BrowserError {
        match err.as_inner() {
            WebDriverErrorInner::StaleElementReference(_) | WebDriverErrorInner::NoSuchElement(_) => {
                BrowserError::Detached(locator.to_string())
            }
            _ => BrowserError::WebDriver(err),
        }
    }

    fn by(selector: &Selector) -> By {
        match selector {
            Selector::Css(css) => By::Css(css.as_str()),
            Selector::XPath(xpath) => By::XPath(xpath.as_str()),
        }
    }

    /// Every element matched by the final step, searched under the first
    /// match of each earlier step.
    async fn resolve_all(&self, locator: &Locator) -> Result<Vec<WebElement>, BrowserError> {
        let Some((last, parents)) = locator.chain().split_last() else {
            return Ok(Vec::new());
        };

        let mut scope: Option<WebElement> = None;
        for step in parents {
            let found = match &scope {
                None => self.driver.find_all(Self::by(step)).await?,
                Some(parent) => parent
                    .find_all(Self::by(step))
                    .await
                    .map_err(|e| Self::settle(locator, e))?,
            };
            match found.into_iter().next() {
                Some(element) => scope = Some(element),
                None => return Ok(Vec::new()),
            }
        }

        let elements = match &scope {
            None => self.driver.find_all(Self::by(last)).await?,
            Some(parent) => parent
                .find_all(Self::by(last))
                .await
                .map_err(|e| Self::settle(locator, e))?,
        };
        Ok(elements)
    }

    async fn resolve(&self, locator: &Locator) -> Result<Option<WebElement>, BrowserError> {
        Ok(self.resolve_all(locator).await?.into_iter().next())
    }

    async fn require(&self, locator: &Locator) -> Result<WebElement, BrowserError> {
        self.resolve(locator)
            .await?
            .ok_or_else(|| BrowserError::NoSuchElement(locator.to_string()))
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn ready_state(&self) -> Result<String, BrowserError> {
        let ret = self
            .driver
            .execute("return document.readyState;", Vec::new())
            .await?;
        ret.json()
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Script(format!("unexpected readyState {}", ret.json())))
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError> {
        match self.resolve(locator).await? {
            Some(element) => element
                .is_displayed()
                .await
                .map_err(|e| Self::settle(locator, e)),
            None => Ok(false),
        }
    }

    async fn is_enabled(&self, locator: &Locator) -> Result<bool, BrowserError> {
        self.require(locator)
            .await?
            .is_enabled()
            .await
            .map_err(|e| Self::settle(locator, e))
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.require(locator).await?.click().await?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        let element = self.require(locator).await?;
        element.clear().await?;
        if !value.is_empty() {
            element.send_keys(value).await?;
        }
        Ok(())
    }

    async fn press_enter(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.require(locator).await?.send_keys(Key::Enter + "").await?;
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> Result<Option<String>, BrowserError> {
        match self.resolve(locator).await? {
            Some(element) => element
                .text()
                .await
                .map(Some)
                .map_err(|e| Self::settle(locator, e)),
            None => Ok(None),
        }
    }

    async fn input_value(&self, locator: &Locator) -> Result<Option<String>, BrowserError> {
        match self.resolve(locator).await? {
            Some(element) => element
                .value()
                .await
                .map(|value| Some(value.unwrap_or_default()))
                .map_err(|e| Self::settle(locator, e)),
            None => Ok(None),
        }
    }

    async fn attributes(
        &self,
        locator: &Locator,
        attribute: &str,
    ) -> Result<Vec<String>, BrowserError> {
        let mut values = Vec::new();
        for element in self.resolve_all(locator).await? {
            let value = element
                .attr(attribute)
                .await
                .map_err(|e| Self::settle(locator, e))?;
            if let Some(value) = value {
                values.push(value);
            }
        }
        Ok(values)
    }

    async fn pause(&self, prompt: &str) -> Result<(), BrowserError> {
        println!("{}", prompt);
        println!(">>> Press Enter here to resume. <<<");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(())
    }
}
