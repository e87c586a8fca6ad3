//! In-memory [`PageStateClient`] implementation for tests.
//!
//! The page is a flat list of elements in document order. Each element
//! declares the exact selector strings it answers to (no CSS engine), an
//! optional parent, attributes, and text. Elements may belong to a *panel*:
//! they are only visible while that panel is shown, and clicking an element
//! can show or hide panels. That is enough to script date tabs that swap the
//! visible flight list.
//!
//! Nothing is visible until [`navigate`](PageStateClient::navigate) has been
//! called. Every interaction is recorded as a [`PageAction`] so tests can
//! assert on ordering.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use super::{ElementHandle, Key, PageError, PageStateClient};

/// One recorded interaction, keyed by element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Navigate(String),
    Click(String),
    Type(String, String),
    Press(String, Key),
    Clear(String),
}

/// Declarative description of a scripted element.
#[derive(Debug, Clone, Default)]
pub struct Element {
    id: String,
    parent: Option<String>,
    selectors: Vec<String>,
    attributes: HashMap<String, String>,
    text: String,
    panel: Option<String>,
    shows: Vec<String>,
    hides: Vec<String>,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn matches(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Only visible while `panel` is shown.
    pub fn in_panel(mut self, panel: impl Into<String>) -> Self {
        self.panel = Some(panel.into());
        self
    }

    /// Clicking this element shows `panel`.
    pub fn shows(mut self, panel: impl Into<String>) -> Self {
        self.shows.push(panel.into());
        self
    }

    /// Clicking this element hides `panel`.
    pub fn hides(mut self, panel: impl Into<String>) -> Self {
        self.hides.push(panel.into());
        self
    }
}

#[derive(Default)]
struct PageState {
    elements: Vec<Element>,
    navigated: bool,
    shown: HashSet<String>,
    actions: Vec<PageAction>,
}

impl PageState {
    fn get(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn is_visible(&self, element: &Element) -> bool {
        if !self.navigated {
            return false;
        }
        let mut current = Some(element);
        while let Some(e) = current {
            if let Some(panel) = &e.panel {
                if !self.shown.contains(panel) {
                    return false;
                }
            }
            current = e.parent.as_deref().and_then(|p| self.get(p));
        }
        true
    }

    fn is_descendant(&self, element: &Element, ancestor: &str) -> bool {
        let mut current = element.parent.as_deref();
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|e| e.parent.as_deref());
        }
        false
    }

    fn query(&self, parent: Option<&str>, selector: &str) -> Vec<ElementHandle> {
        self.elements
            .iter()
            .filter(|e| e.selectors.iter().any(|s| s == selector))
            .filter(|e| parent.map_or(true, |p| self.is_descendant(e, p)))
            .filter(|e| self.is_visible(e))
            .map(|e| ElementHandle::new(e.id.clone()))
            .collect()
    }

    fn live(&self, handle: &ElementHandle) -> Result<&Element, PageError> {
        self.get(handle.id())
            .filter(|e| self.is_visible(e))
            .ok_or_else(|| PageError::StaleElement {
                element: handle.id().to_string(),
            })
    }

    fn live_mut(&mut self, handle: &ElementHandle) -> Result<&mut Element, PageError> {
        self.live(handle)?;
        self.elements
            .iter_mut()
            .find(|e| e.id == handle.id())
            .ok_or_else(|| PageError::StaleElement {
                element: handle.id().to_string(),
            })
    }
}

/// Scripted page for exercising the search pipeline without a browser.
pub struct InMemoryPage {
    state: RwLock<PageState>,
}

impl InMemoryPage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(PageState::default()),
        }
    }

    /// Append an element in document order and return its handle.
    pub fn add(&self, element: Element) -> ElementHandle {
        let handle = ElementHandle::new(element.id.clone());
        self.state.write().unwrap().elements.push(element);
        handle
    }

    /// Show a panel without a click, e.g. the tab selected on first render.
    pub fn show(&self, panel: impl Into<String>) {
        self.state.write().unwrap().shown.insert(panel.into());
    }

    /// Every interaction performed so far, in order.
    pub fn actions(&self) -> Vec<PageAction> {
        self.state.read().unwrap().actions.clone()
    }

    /// Current value of an attribute, visible or not.
    pub fn attribute(&self, id: &str, name: &str) -> Option<String> {
        let state = self.state.read().unwrap();
        state.get(id).and_then(|e| e.attributes.get(name).cloned())
    }
}

impl Default for InMemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageStateClient for InMemoryPage {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        let mut state = self.state.write().unwrap();
        state.navigated = true;
        state.actions.push(PageAction::Navigate(url.to_string()));
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<ElementHandle, PageError> {
        // The scripted page never changes on its own, so one lookup decides.
        self.find(selector).await.map_err(|_| PageError::Timeout {
            what: selector.to_string(),
            duration: timeout,
        })
    }

    async fn find(&self, selector: &str) -> Result<ElementHandle, PageError> {
        let state = self.state.read().unwrap();
        state
            .query(None, selector)
            .into_iter()
            .next()
            .ok_or_else(|| PageError::NotFound {
                selector: selector.to_string(),
            })
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, PageError> {
        Ok(self.state.read().unwrap().query(None, selector))
    }

    async fn find_in(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<ElementHandle, PageError> {
        self.find_all_in(parent, selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PageError::NotFound {
                selector: selector.to_string(),
            })
    }

    async fn find_all_in(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, PageError> {
        let state = self.state.read().unwrap();
        state.live(parent)?;
        Ok(state.query(Some(parent.id()), selector))
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), PageError> {
        let mut state = self.state.write().unwrap();
        let (shows, hides) = {
            let e = state.live(element)?;
            (e.shows.clone(), e.hides.clone())
        };
        for panel in hides {
            state.shown.remove(&panel);
        }
        state.shown.extend(shows);
        state
            .actions
            .push(PageAction::Click(element.id().to_string()));
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), PageError> {
        let mut state = self.state.write().unwrap();
        state
            .live_mut(element)?
            .attributes
            .entry("value".to_string())
            .or_default()
            .push_str(text);
        state.actions.push(PageAction::Type(
            element.id().to_string(),
            text.to_string(),
        ));
        Ok(())
    }

    async fn press_key(&self, element: &ElementHandle, key: Key) -> Result<(), PageError> {
        let mut state = self.state.write().unwrap();
        state.live(element)?;
        state
            .actions
            .push(PageAction::Press(element.id().to_string(), key));
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), PageError> {
        let mut state = self.state.write().unwrap();
        state
            .live_mut(element)?
            .attributes
            .insert("value".to_string(), String::new());
        state
            .actions
            .push(PageAction::Clear(element.id().to_string()));
        Ok(())
    }

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        let state = self.state.read().unwrap();
        Ok(state.live(element)?.attributes.get(name).cloned())
    }

    async fn read_text(&self, element: &ElementHandle) -> Result<String, PageError> {
        let state = self.state.read().unwrap();
        Ok(state.live(element)?.text.clone())
    }
}
