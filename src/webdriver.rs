//! W3C WebDriver client.
//!
//! Implements [`PageStateClient`] on top of a WebDriver server
//! (`geckodriver`, `chromedriver`) using its HTTP JSON protocol. The server
//! and the browser are started by the user; this client only opens and
//! closes sessions.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | start | `POST /session` |
//! | close | `DELETE /session/{id}` |
//! | navigate | `POST /session/{id}/url` |
//! | find / find_all | `POST /session/{id}/element(s)` |
//! | find_in / find_all_in | `POST /session/{id}/element/{e}/element(s)` |
//! | click / clear | `POST /session/{id}/element/{e}/click` / `clear` |
//! | type_text / press_key | `POST /session/{id}/element/{e}/value` |
//! | read_attribute | `GET /session/{id}/element/{e}/attribute/{name}` |
//! | read_text | `GET /session/{id}/element/{e}/text` |
//!
//! # Errors
//!
//! WebDriver error codes are mapped onto [`PageError`]:
//! `no such element` → `NotFound`, `stale element reference` →
//! `StaleElement`, `timeout` → `Timeout`, anything else → `Driver`.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::{Browser, BrowserConfig, TimeoutsConfig};
use crate::page::{ElementHandle, Key, PageError, PageStateClient};

/// JSON key identifying a web element reference.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

/// Build the `alwaysMatch` capabilities for the configured browser.
pub fn capabilities(config: &BrowserConfig) -> Value {
    match config.browser {
        Browser::Firefox => {
            let args: Vec<&str> = if config.headless { vec!["-headless"] } else { vec![] };
            json!({
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": args },
            })
        }
        Browser::Chrome => {
            let args: Vec<&str> = if config.headless {
                vec!["--headless", "--no-sandbox", "--disable-dev-shm-usage"]
            } else {
                vec![]
            };
            json!({
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args },
            })
        }
    }
}

/// A live WebDriver session.
///
/// Close it with [`WebDriverClient::close`]; dropping the client leaves the
/// browser window open on the server side.
pub struct WebDriverClient {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
    request_timeout: Duration,
    load_timeout: Duration,
    poll: Duration,
}

impl WebDriverClient {
    /// Open a new session on the WebDriver server at `config.webdriver_url`.
    ///
    /// Every HTTP request is bounded by the interaction timeout, except
    /// navigation (`POST /url` returns once the document has loaded), which
    /// gets the ready timeout. Session creation also gets the ready timeout
    /// since it launches the browser. `timeouts.poll()` is the retry period of
    /// [`wait_for`](PageStateClient::wait_for).
    pub async fn start(config: &BrowserConfig, timeouts: &TimeoutsConfig) -> Result<Self, PageError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PageError::Driver {
                detail: e.to_string(),
            })?;
        let base_url = config.webdriver_url.trim_end_matches('/').to_string();

        let body = json!({ "capabilities": { "alwaysMatch": capabilities(config) } });
        let url = format!("{}/session", base_url);
        let request = http.post(&url).timeout(timeouts.ready());
        let value = send(request, Some(body), "new session").await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| PageError::Driver {
                detail: "new session response has no sessionId".to_string(),
            })?
            .to_string();

        tracing::info!(
            session = %session_id,
            browser = ?config.browser,
            headless = config.headless,
            "webdriver session started"
        );

        Ok(Self {
            http,
            base_url,
            session_id,
            request_timeout: timeouts.interaction(),
            load_timeout: timeouts.ready(),
            poll: timeouts.poll(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// End the session, closing the browser window.
    pub async fn close(self) -> Result<(), PageError> {
        send(self.endpoint(Method::DELETE, ""), None, "delete session").await?;
        tracing::info!(session = %self.session_id, "webdriver session closed");
        Ok(())
    }

    fn endpoint(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        self.http.request(method, url).timeout(self.request_timeout)
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        what: &str,
    ) -> Result<Value, PageError> {
        send(self.endpoint(method, path), body, what).await
    }

    async fn element_command(
        &self,
        element: &ElementHandle,
        suffix: &str,
        body: Value,
    ) -> Result<Value, PageError> {
        let path = format!("/element/{}/{}", element.id(), suffix);
        self.command(Method::POST, &path, Some(body), element.id())
            .await
    }
}

async fn send(
    mut request: reqwest::RequestBuilder,
    body: Option<Value>,
    what: &str,
) -> Result<Value, PageError> {
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            PageError::Timeout {
                what: what.to_string(),
                duration: Duration::ZERO,
            }
        } else {
            PageError::Driver {
                detail: format!("{}: {}", what, e),
            }
        }
    })?;
    let status = response.status();
    let mut payload: Value = response.json().await.map_err(|e| PageError::Driver {
        detail: format!("{}: invalid response body: {}", what, e),
    })?;
    let value = payload.get_mut("value").map(Value::take).unwrap_or(Value::Null);

    if !status.is_success() || value.get("error").is_some() {
        let wire: WireError = serde_json::from_value(value).map_err(|_| PageError::Driver {
            detail: format!("{}: HTTP {}", what, status),
        })?;
        return Err(map_error(wire, what));
    }
    Ok(value)
}

fn map_error(wire: WireError, what: &str) -> PageError {
    match wire.error.as_str() {
        "no such element" => PageError::NotFound {
            selector: what.to_string(),
        },
        "stale element reference" | "no such window" => PageError::StaleElement {
            element: what.to_string(),
        },
        "timeout" | "script timeout" => PageError::Timeout {
            what: what.to_string(),
            duration: Duration::ZERO,
        },
        _ => PageError::Driver {
            detail: format!("{}: {}: {}", what, wire.error, wire.message),
        },
    }
}

fn element_from(value: &Value) -> Result<ElementHandle, PageError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(ElementHandle::new)
        .ok_or_else(|| PageError::Driver {
            detail: format!("expected element reference, got {}", value),
        })
}

fn elements_from(value: &Value) -> Result<Vec<ElementHandle>, PageError> {
    value
        .as_array()
        .ok_or_else(|| PageError::Driver {
            detail: format!("expected element list, got {}", value),
        })?
        .iter()
        .map(element_from)
        .collect()
}

fn locator(selector: &str) -> Value {
    json!({ "using": "css selector", "value": selector })
}

#[async_trait]
impl PageStateClient for WebDriverClient {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        let request = self
            .endpoint(Method::POST, "/url")
            .timeout(self.load_timeout);
        send(request, Some(json!({ "url": url })), url)
            .await
            .map_err(|e| match e {
                PageError::Timeout { what, .. } => PageError::Timeout {
                    what,
                    duration: self.load_timeout,
                },
                other => other,
            })?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<ElementHandle, PageError> {
        // `None` when the deadline is past the clock's range: poll forever.
        let deadline = tokio::time::Instant::now().checked_add(timeout);
        loop {
            match self.find(selector).await {
                Ok(element) => return Ok(element),
                Err(PageError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }

            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(tokio::time::Instant::now()),
                None => self.poll,
            };
            if remaining.is_zero() {
                return Err(PageError::Timeout {
                    what: selector.to_string(),
                    duration: timeout,
                });
            }
            tokio::time::sleep(self.poll.min(remaining)).await;
        }
    }

    async fn find(&self, selector: &str) -> Result<ElementHandle, PageError> {
        let value = self
            .command(Method::POST, "/element", Some(locator(selector)), selector)
            .await?;
        element_from(&value)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, PageError> {
        let value = self
            .command(Method::POST, "/elements", Some(locator(selector)), selector)
            .await?;
        elements_from(&value)
    }

    async fn find_in(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<ElementHandle, PageError> {
        let path = format!("/element/{}/element", parent.id());
        let value = self
            .command(Method::POST, &path, Some(locator(selector)), selector)
            .await?;
        element_from(&value)
    }

    async fn find_all_in(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, PageError> {
        let path = format!("/element/{}/elements", parent.id());
        let value = self
            .command(Method::POST, &path, Some(locator(selector)), selector)
            .await?;
        elements_from(&value)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), PageError> {
        self.element_command(element, "click", json!({})).await?;
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), PageError> {
        self.element_command(element, "value", json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn press_key(&self, element: &ElementHandle, key: Key) -> Result<(), PageError> {
        self.element_command(element, "value", json!({ "text": key.code().to_string() }))
            .await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), PageError> {
        self.element_command(element, "clear", json!({})).await?;
        Ok(())
    }

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        let path = format!("/element/{}/attribute/{}", element.id(), name);
        let value = self
            .command(Method::GET, &path, None, element.id())
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn read_text(&self, element: &ElementHandle) -> Result<String, PageError> {
        let path = format!("/element/{}/text", element.id());
        let value = self
            .command(Method::GET, &path, None, element.id())
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firefox_headless_capabilities() {
        let caps = capabilities(&BrowserConfig::default());
        assert_eq!(caps["browserName"], "firefox");
        assert_eq!(caps["moz:firefoxOptions"]["args"], json!(["-headless"]));
    }

    #[test]
    fn test_chrome_headed_capabilities() {
        let config = BrowserConfig {
            browser: Browser::Chrome,
            headless: false,
            ..BrowserConfig::default()
        };
        let caps = capabilities(&config);
        assert_eq!(caps["browserName"], "chrome");
        assert_eq!(caps["goog:chromeOptions"]["args"], json!([]));
    }

    #[test]
    fn test_error_mapping() {
        let wire = |error: &str| WireError {
            error: error.to_string(),
            message: "details".to_string(),
        };
        assert_eq!(
            map_error(wire("no such element"), "div.price"),
            PageError::NotFound {
                selector: "div.price".to_string()
            }
        );
        assert!(matches!(
            map_error(wire("stale element reference"), "e1"),
            PageError::StaleElement { .. }
        ));
        assert_eq!(
            map_error(wire("element click intercepted"), "e1"),
            PageError::Driver {
                detail: "e1: element click intercepted: details".to_string()
            }
        );
    }

    fn element_ref(id: &str) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(ELEMENT_KEY.to_string(), Value::from(id));
        Value::Object(map)
    }

    #[test]
    fn test_element_reference_parsing() {
        let one = element_ref("abc");
        assert_eq!(element_from(&one).unwrap(), ElementHandle::new("abc"));

        let many = Value::Array(vec![element_ref("a"), element_ref("b")]);
        assert_eq!(
            elements_from(&many).unwrap(),
            vec![ElementHandle::new("a"), ElementHandle::new("b")]
        );

        assert!(element_from(&json!({ "ELEMENT": "legacy" })).is_err());
    }

    #[test]
    fn test_return_key_code() {
        assert_eq!(Key::Return.code().to_string(), "\u{E006}");
    }
}
