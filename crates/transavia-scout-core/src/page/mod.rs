//! Page capability used by the search pipeline.
//!
//! The [`PageStateClient`] trait is the only point of contact between the
//! search pipeline and a browser. Implementations:
//!
//! - `WebDriverClient` in the `transavia-scout` crate (W3C WebDriver over HTTP)
//! - [`memory::InMemoryPage`]: scripted page for tests
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Opaque reference to an element on the current page.
///
/// Handles are only meaningful to the client that produced them and may go
/// stale when the page re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Special keys the pipeline sends to form controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Return,
}

impl Key {
    /// WebDriver key code, sent as text to the element.
    pub fn code(self) -> char {
        match self {
            Key::Return => '\u{E006}',
        }
    }
}

/// Failures reported by a [`PageStateClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("element not found: {selector}")]
    NotFound { selector: String },

    #[error("timed out after {duration:?} waiting for {what}")]
    Timeout { what: String, duration: Duration },

    /// The handle no longer refers to an element on the page.
    #[error("stale element reference: {element}")]
    StaleElement { element: String },

    #[error("browser driver error: {detail}")]
    Driver { detail: String },
}

/// Browser capability consumed by the search pipeline.
///
/// Every method corresponds to one driver round-trip. Selectors are CSS.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`navigate`](PageStateClient::navigate) | Load a URL |
/// | [`wait_for`](PageStateClient::wait_for) | Poll for an element until a deadline |
/// | [`find`](PageStateClient::find) / [`find_all`](PageStateClient::find_all) | Query the document |
/// | [`find_in`](PageStateClient::find_in) / [`find_all_in`](PageStateClient::find_all_in) | Query below an element |
/// | [`click`](PageStateClient::click), [`type_text`](PageStateClient::type_text), [`press_key`](PageStateClient::press_key), [`clear`](PageStateClient::clear) | Interact |
/// | [`read_attribute`](PageStateClient::read_attribute), [`read_text`](PageStateClient::read_text) | Read element state |
#[async_trait]
pub trait PageStateClient: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), PageError>;

    /// Wait until `selector` matches an element, or fail with
    /// [`PageError::Timeout`] once `timeout` has elapsed.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<ElementHandle, PageError>;

    async fn find(&self, selector: &str) -> Result<ElementHandle, PageError>;

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, PageError>;

    async fn find_in(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<ElementHandle, PageError>;

    async fn find_all_in(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, PageError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), PageError>;

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), PageError>;

    async fn press_key(&self, element: &ElementHandle, key: Key) -> Result<(), PageError>;

    async fn clear(&self, element: &ElementHandle) -> Result<(), PageError>;

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, PageError>;

    async fn read_text(&self, element: &ElementHandle) -> Result<String, PageError>;

    /// Like [`find`](PageStateClient::find), but an absent element is `None`
    /// rather than an error. Other failures still propagate.
    async fn try_find(&self, selector: &str) -> Result<Option<ElementHandle>, PageError> {
        match self.find(selector).await {
            Ok(element) => Ok(Some(element)),
            Err(PageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
