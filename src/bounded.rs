//! Per-interaction timeouts around any [`PageStateClient`].
//!
//! A driver round-trip can hang (a modal stealing focus, a wedged browser).
//! [`BoundedPage`] races every call against a deadline and reports
//! [`PageError::Timeout`] instead of blocking the search forever.
//! `wait_for` gets its own deadline plus one interaction timeout of slack, so
//! the inner client's timeout is the one normally observed. `navigate`
//! blocks until the document has loaded and is bounded by the page-load
//! timeout instead (see [`BoundedPage::with_load_timeout`]).

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::page::{ElementHandle, Key, PageError, PageStateClient};

pub struct BoundedPage<P> {
    inner: P,
    timeout: Duration,
    load_timeout: Duration,
}

impl<P: PageStateClient> BoundedPage<P> {
    /// Bound every interaction, navigation included, by `timeout`.
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            load_timeout: timeout,
        }
    }

    /// Bound `navigate` by `load_timeout` instead of the interaction timeout.
    pub fn with_load_timeout(mut self, load_timeout: Duration) -> Self {
        self.load_timeout = load_timeout;
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    async fn bounded<T, F>(&self, what: String, limit: Duration, fut: F) -> Result<T, PageError>
    where
        T: Send,
        F: Future<Output = Result<T, PageError>> + Send,
    {
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(what = %what, timeout = ?limit, "page interaction timed out");
                Err(PageError::Timeout {
                    what,
                    duration: limit,
                })
            }
        }
    }
}

#[async_trait]
impl<P: PageStateClient> PageStateClient for BoundedPage<P> {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.bounded(
            format!("navigation to {}", url),
            self.load_timeout,
            self.inner.navigate(url),
        )
        .await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<ElementHandle, PageError> {
        self.bounded(
            selector.to_string(),
            timeout.saturating_add(self.timeout),
            self.inner.wait_for(selector, timeout),
        )
        .await
    }

    async fn find(&self, selector: &str) -> Result<ElementHandle, PageError> {
        self.bounded(selector.to_string(), self.timeout, self.inner.find(selector))
            .await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, PageError> {
        self.bounded(selector.to_string(), self.timeout, self.inner.find_all(selector))
            .await
    }

    async fn find_in(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<ElementHandle, PageError> {
        self.bounded(
            selector.to_string(),
            self.timeout,
            self.inner.find_in(parent, selector),
        )
        .await
    }

    async fn find_all_in(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, PageError> {
        self.bounded(
            selector.to_string(),
            self.timeout,
            self.inner.find_all_in(parent, selector),
        )
        .await
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), PageError> {
        self.bounded(
            format!("click on {}", element.id()),
            self.timeout,
            self.inner.click(element),
        )
        .await
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), PageError> {
        self.bounded(
            format!("typing into {}", element.id()),
            self.timeout,
            self.inner.type_text(element, text),
        )
        .await
    }

    async fn press_key(&self, element: &ElementHandle, key: Key) -> Result<(), PageError> {
        self.bounded(
            format!("{:?} key on {}", key, element.id()),
            self.timeout,
            self.inner.press_key(element, key),
        )
        .await
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), PageError> {
        self.bounded(
            format!("clearing {}", element.id()),
            self.timeout,
            self.inner.clear(element),
        )
        .await
    }

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        self.bounded(
            format!("attribute {} of {}", name, element.id()),
            self.timeout,
            self.inner.read_attribute(element, name),
        )
        .await
    }

    async fn read_text(&self, element: &ElementHandle) -> Result<String, PageError> {
        self.bounded(
            format!("text of {}", element.id()),
            self.timeout,
            self.inner.read_text(element),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::memory::{Element, InMemoryPage};

    /// Delegates to an in-memory page, but loads take `.1` and clicks never
    /// finish.
    struct SlowPage(InMemoryPage, Duration);

    #[async_trait]
    impl PageStateClient for SlowPage {
        async fn navigate(&self, url: &str) -> Result<(), PageError> {
            tokio::time::sleep(self.1).await;
            self.0.navigate(url).await
        }
        async fn wait_for(&self, s: &str, t: Duration) -> Result<ElementHandle, PageError> {
            self.0.wait_for(s, t).await
        }
        async fn find(&self, s: &str) -> Result<ElementHandle, PageError> {
            self.0.find(s).await
        }
        async fn find_all(&self, s: &str) -> Result<Vec<ElementHandle>, PageError> {
            self.0.find_all(s).await
        }
        async fn find_in(&self, p: &ElementHandle, s: &str) -> Result<ElementHandle, PageError> {
            self.0.find_in(p, s).await
        }
        async fn find_all_in(
            &self,
            p: &ElementHandle,
            s: &str,
        ) -> Result<Vec<ElementHandle>, PageError> {
            self.0.find_all_in(p, s).await
        }
        async fn click(&self, _e: &ElementHandle) -> Result<(), PageError> {
            std::future::pending().await
        }
        async fn type_text(&self, e: &ElementHandle, t: &str) -> Result<(), PageError> {
            self.0.type_text(e, t).await
        }
        async fn press_key(&self, e: &ElementHandle, k: Key) -> Result<(), PageError> {
            self.0.press_key(e, k).await
        }
        async fn clear(&self, e: &ElementHandle) -> Result<(), PageError> {
            self.0.clear(e).await
        }
        async fn read_attribute(
            &self,
            e: &ElementHandle,
            n: &str,
        ) -> Result<Option<String>, PageError> {
            self.0.read_attribute(e, n).await
        }
        async fn read_text(&self, e: &ElementHandle) -> Result<String, PageError> {
            self.0.read_text(e).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_click_becomes_timeout() {
        let inner = InMemoryPage::new();
        inner.add(Element::new("btn").matches("button"));
        let page = BoundedPage::new(SlowPage(inner, Duration::ZERO), Duration::from_secs(5));

        page.navigate("about:blank").await.unwrap();
        let button = page.find("button").await.unwrap();
        let err = page.click(&button).await.unwrap_err();

        assert_eq!(
            err,
            PageError::Timeout {
                what: "click on btn".to_string(),
                duration: Duration::from_secs(5),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_within_load_timeout() {
        let inner = InMemoryPage::new();
        inner.add(Element::new("form").matches("form"));
        let slow = SlowPage(inner, Duration::from_secs(20));
        let page = BoundedPage::new(slow, Duration::from_secs(15))
            .with_load_timeout(Duration::from_secs(60));

        page.navigate("https://www.transavia.com/").await.unwrap();
        assert!(page.find("form").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_past_load_timeout_is_timeout() {
        let slow = SlowPage(InMemoryPage::new(), Duration::from_secs(90));
        let page = BoundedPage::new(slow, Duration::from_secs(15))
            .with_load_timeout(Duration::from_secs(60));

        let err = page.navigate("https://www.transavia.com/").await.unwrap_err();
        assert_eq!(
            err,
            PageError::Timeout {
                what: "navigation to https://www.transavia.com/".to_string(),
                duration: Duration::from_secs(60),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_wait_does_not_overflow() {
        let inner = InMemoryPage::new();
        inner.add(Element::new("form").matches("form"));
        let page = BoundedPage::new(inner, Duration::MAX);

        page.navigate("about:blank").await.unwrap();
        assert!(page.wait_for("form", Duration::MAX).await.is_ok());
    }

    #[tokio::test]
    async fn test_fast_calls_pass_through() {
        let inner = InMemoryPage::new();
        inner.add(Element::new("label").matches("p").text("hello"));
        let page = BoundedPage::new(inner, Duration::from_secs(5));

        page.navigate("about:blank").await.unwrap();
        let p = page.find("p").await.unwrap();
        assert_eq!(page.read_text(&p).await.unwrap(), "hello");
        assert!(matches!(
            page.find("h1").await,
            Err(PageError::NotFound { .. })
        ));
    }
}
