//! Scripted in-memory [`Browser`] for exercising page objects without a
//! WebDriver server.
//!
//! Elements are keyed by their locator. Gestures are recorded as
//! [`FakeEvent`]s, and hooks registered with [`FakeBrowser::on_click`],
//! [`FakeBrowser::on_enter`] and [`FakeBrowser::on_goto`] let a test make the
//! page react the way the live application would.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::browser::{Browser, BrowserError, Locator};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeElement {
    pub visible: bool,
    pub enabled: bool,
    pub text: String,
    pub value: String,
    pub attributes: HashMap<String, String>,
    /// The next probe finds the node gone from the DOM.
    pub detached: bool,
}

impl FakeElement {
    pub fn visible() -> Self {
        Self {
            visible: true,
            enabled: true,
            ..Self::default()
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: false,
            enabled: true,
            ..Self::default()
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeEvent {
    Goto(String),
    Click(String),
    Fill(String, String),
    Enter(String),
    Pause(String),
}

/// Mutable state of the simulated page
#[derive(Debug, Default)]
pub struct FakePage {
    pub url: String,
    pub ready_state: String,
    elements: HashMap<Locator, Vec<FakeElement>>,
    events: Vec<FakeEvent>,
}

impl FakePage {
    pub fn set(&mut self, locator: &Locator, element: FakeElement) {
        self.elements.insert(locator.clone(), vec![element]);
    }

    pub fn set_all(&mut self, locator: &Locator, elements: Vec<FakeElement>) {
        self.elements.insert(locator.clone(), elements);
    }

    pub fn push(&mut self, locator: &Locator, element: FakeElement) {
        self.elements.entry(locator.clone()).or_default().push(element);
    }

    pub fn remove(&mut self, locator: &Locator) {
        self.elements.remove(locator);
    }

    pub fn get(&self, locator: &Locator) -> Option<&FakeElement> {
        self.elements.get(locator).and_then(|all| all.first())
    }

    pub fn get_mut(&mut self, locator: &Locator) -> Option<&mut FakeElement> {
        self.elements.get_mut(locator).and_then(|all| all.first_mut())
    }

    pub fn all(&self, locator: &Locator) -> &[FakeElement] {
        self.elements.get(locator).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop every element of `locator` whose `attribute` equals `value`.
    pub fn retain_without(&mut self, locator: &Locator, attribute: &str, value: &str) {
        if let Some(all) = self.elements.get_mut(locator) {
            all.retain(|el| el.attributes.get(attribute).map(String::as_str) != Some(value));
        }
    }

    pub fn set_text(&mut self, locator: &Locator, text: impl Into<String>) {
        let text = text.into();
        match self.get_mut(locator) {
            Some(element) => element.text = text,
            None => self.set(locator, FakeElement::visible().with_text(text)),
        }
    }

    /// Mark the element as about to leave the page: the next probe of
    /// `locator` fails with [`BrowserError::Detached`] and removes it.
    pub fn detach(&mut self, locator: &Locator) {
        if let Some(element) = self.get_mut(locator) {
            element.detached = true;
        }
    }

    fn settle(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        if self.get(locator).is_some_and(|el| el.detached) {
            self.remove(locator);
            return Err(BrowserError::Detached(locator.to_string()));
        }
        Ok(())
    }

    pub fn set_visible(&mut self, locator: &Locator, visible: bool) {
        if let Some(element) = self.get_mut(locator) {
            element.visible = visible;
        }
    }

    pub fn value(&self, locator: &Locator) -> Option<&str> {
        self.get(locator).map(|el| el.value.as_str())
    }

    pub fn events(&self) -> &[FakeEvent] {
        &self.events
    }

    fn require_mut(&mut self, locator: &Locator) -> Result<&mut FakeElement, BrowserError> {
        self.get_mut(locator)
            .ok_or_else(|| BrowserError::NoSuchElement(locator.to_string()))
    }
}

type Hook = Box<dyn Fn(&mut FakePage) + Send + Sync>;

#[derive(Default)]
pub struct FakeBrowser {
    page: Mutex<FakePage>,
    click_hooks: Mutex<HashMap<Locator, Hook>>,
    enter_hooks: Mutex<HashMap<Locator, Hook>>,
    goto_hooks: Mutex<HashMap<String, Hook>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeBrowser {
    pub fn new(url: &str) -> Self {
        let browser = Self::default();
        {
            let mut page = lock(&browser.page);
            page.url = url.to_string();
            page.ready_state = "complete".to_string();
        }
        browser
    }

    /// Inspect or rearrange the simulated page.
    pub fn with_page<R>(&self, f: impl FnOnce(&mut FakePage) -> R) -> R {
        f(&mut *lock(&self.page))
    }

    pub fn set(&self, locator: &Locator, element: FakeElement) {
        self.with_page(|page| page.set(locator, element));
    }

    pub fn on_click(&self, locator: &Locator, hook: impl Fn(&mut FakePage) + Send + Sync + 'static) {
        lock(&self.click_hooks).insert(locator.clone(), Box::new(hook));
    }

    pub fn on_enter(&self, locator: &Locator, hook: impl Fn(&mut FakePage) + Send + Sync + 'static) {
        lock(&self.enter_hooks).insert(locator.clone(), Box::new(hook));
    }

    pub fn on_goto(&self, url: &str, hook: impl Fn(&mut FakePage) + Send + Sync + 'static) {
        lock(&self.goto_hooks).insert(url.to_string(), Box::new(hook));
    }

    pub fn events(&self) -> Vec<FakeEvent> {
        self.with_page(|page| page.events.clone())
    }

    pub fn clicked(&self, locator: &Locator) -> bool {
        let key = locator.to_string();
        self.events()
            .iter()
            .any(|event| matches!(event, FakeEvent::Click(l) if *l == key))
    }

    pub fn url(&self) -> String {
        self.with_page(|page| page.url.clone())
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let hooks = lock(&self.goto_hooks);
        let mut page = lock(&self.page);
        page.url = url.to_string();
        page.events.push(FakeEvent::Goto(url.to_string()));
        if let Some(hook) = hooks.get(url) {
            hook(&mut *page);
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.url())
    }

    async fn ready_state(&self) -> Result<String, BrowserError> {
        Ok(self.with_page(|page| page.ready_state.clone()))
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError> {
        self.with_page(|page| {
            page.settle(locator)?;
            Ok(page.get(locator).map(|el| el.visible).unwrap_or(false))
        })
    }

    async fn is_enabled(&self, locator: &Locator) -> Result<bool, BrowserError> {
        self.with_page(|page| {
            page.settle(locator)?;
            page.require_mut(locator).map(|el| el.enabled)
        })
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        let hooks = lock(&self.click_hooks);
        let mut page = lock(&self.page);
        let element = page.require_mut(locator)?;
        if !element.visible {
            return Err(BrowserError::NoSuchElement(format!(
                "{} is not interactable",
                locator
            )));
        }
        page.events.push(FakeEvent::Click(locator.to_string()));
        if let Some(hook) = hooks.get(locator) {
            hook(&mut *page);
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        self.with_page(|page| {
            page.require_mut(locator)?.value = value.to_string();
            page.events
                .push(FakeEvent::Fill(locator.to_string(), value.to_string()));
            Ok(())
        })
    }

    async fn press_enter(&self, locator: &Locator) -> Result<(), BrowserError> {
        let hooks = lock(&self.enter_hooks);
        let mut page = lock(&self.page);
        page.require_mut(locator)?;
        page.events.push(FakeEvent::Enter(locator.to_string()));
        if let Some(hook) = hooks.get(locator) {
            hook(&mut *page);
        }
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> Result<Option<String>, BrowserError> {
        self.with_page(|page| {
            page.settle(locator)?;
            Ok(page.get(locator).map(|el| el.text.clone()))
        })
    }

    async fn input_value(&self, locator: &Locator) -> Result<Option<String>, BrowserError> {
        self.with_page(|page| {
            page.settle(locator)?;
            Ok(page.get(locator).map(|el| el.value.clone()))
        })
    }

    async fn attributes(
        &self,
        locator: &Locator,
        attribute: &str,
    ) -> Result<Vec<String>, BrowserError> {
        Ok(self.with_page(|page| {
            page.all(locator)
                .iter()
                .filter_map(|el| el.attributes.get(attribute).cloned())
                .collect()
        }))
    }

    async fn pause(&self, prompt: &str) -> Result<(), BrowserError> {
        self.with_page(|page| page.events.push(FakeEvent::Pause(prompt.to_string())));
        Ok(())
    }
}
