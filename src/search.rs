//! Search orchestration.
//!
//! [`TravelSearch`] runs one search end to end on a page it does not own:
//!
//! ```text
//! Start → Navigated → Ready → FormSubmitted → OutboundExtracted → InboundExtracted → Done
//!   └──────────┴────────┴───────────┴─────────────────┴──────────────────┴──→ Failed
//! ```
//!
//! There are no retries. The first failure moves the search to
//! [`SearchState::Failed`] and is returned as is; flights gathered before the
//! failure are dropped.

use std::time::Duration;

use crate::config::Config;
use crate::error::SearchError;
use crate::extract::extract_flights;
use crate::form::{fill_and_submit, EntryPoint};
use crate::models::{Flight, Travel};
use crate::page::{PageError, PageStateClient};

/// Progress of a [`TravelSearch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Start,
    Navigated,
    Ready,
    FormSubmitted,
    OutboundExtracted,
    InboundExtracted,
    Done,
    /// Holds the rendered error that ended the search.
    Failed(String),
}

/// Outcome of the cookie banner step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieBanner {
    Dismissed,
    Absent,
}

/// Accept cookies when the banner is shown.
///
/// An absent banner is a normal outcome. A banner that is present but
/// cannot be clicked is an error.
pub async fn dismiss_cookie_banner(
    page: &dyn PageStateClient,
    selector: &str,
) -> Result<CookieBanner, SearchError> {
    match page.try_find(selector).await.map_err(SearchError::Driver)? {
        Some(button) => {
            page.click(&button).await.map_err(SearchError::Driver)?;
            Ok(CookieBanner::Dismissed)
        }
        None => Ok(CookieBanner::Absent),
    }
}

/// A timeout while loading the entry page is a navigation timeout.
fn load_failure(error: PageError, waiting_for: &str, duration: Duration) -> SearchError {
    match error {
        PageError::Timeout { .. } => SearchError::NavigationTimeout {
            waiting_for: waiting_for.to_string(),
            duration,
        },
        other => SearchError::Driver(other),
    }
}

/// One search over a borrowed page.
pub struct TravelSearch<'a> {
    page: &'a dyn PageStateClient,
    config: &'a Config,
    entry: EntryPoint,
    state: SearchState,
}

impl<'a> TravelSearch<'a> {
    pub fn new(page: &'a dyn PageStateClient, config: &'a Config, entry: EntryPoint) -> Self {
        Self {
            page,
            config,
            entry,
            state: SearchState::Start,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Run the search. Outbound flights come first, then inbound flights.
    pub async fn run(&mut self, travel: &Travel) -> Result<Vec<Flight>, SearchError> {
        match self.steps(travel).await {
            Ok(flights) => {
                self.advance(SearchState::Done);
                Ok(flights)
            }
            Err(e) => {
                tracing::error!(state = ?self.state, error = %e, "search failed");
                self.state = SearchState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn advance(&mut self, next: SearchState) {
        tracing::info!(from = ?self.state, to = ?next, "search state");
        self.state = next;
    }

    async fn steps(&mut self, travel: &Travel) -> Result<Vec<Flight>, SearchError> {
        let page = self.page;
        let config = self.config;
        let selectors = &config.selectors;
        let timeouts = &config.timeouts;

        let url = config.site.entry_url(self.entry);
        page.navigate(url)
            .await
            .map_err(|e| load_failure(e, url, timeouts.ready()))?;
        self.advance(SearchState::Navigated);

        page.wait_for(&selectors.ready_marker, timeouts.ready())
            .await
            .map_err(|e| load_failure(e, &selectors.ready_marker, timeouts.ready()))?;
        self.advance(SearchState::Ready);

        let banner = dismiss_cookie_banner(page, &selectors.cookie_accept).await?;
        tracing::debug!(?banner, "cookie banner");

        fill_and_submit(page, travel, selectors, timeouts.interaction()).await?;
        self.advance(SearchState::FormSubmitted);

        // The result page loads after submission, so the first section gets
        // the same allowance as the initial page load.
        let outbound_section = page
            .wait_for(&selectors.outbound_section, timeouts.ready())
            .await
            .map_err(|source| SearchError::Extraction {
                section: "outbound",
                source,
            })?;
        let mut flights = extract_flights(page, &outbound_section, "outbound", selectors).await?;
        tracing::info!(count = flights.len(), "outbound flights extracted");
        self.advance(SearchState::OutboundExtracted);

        let inbound_section = page
            .wait_for(&selectors.inbound_section, timeouts.interaction())
            .await
            .map_err(|source| SearchError::Extraction {
                section: "inbound",
                source,
            })?;
        let inbound = extract_flights(page, &inbound_section, "inbound", selectors).await?;
        tracing::info!(count = inbound.len(), "inbound flights extracted");
        flights.extend(inbound);
        self.advance(SearchState::InboundExtracted);

        Ok(flights)
    }
}

/// Run a single search on `page` with the configured entry point.
pub async fn search(
    page: &dyn PageStateClient,
    config: &Config,
    travel: &Travel,
) -> Result<Vec<Flight>, SearchError> {
    TravelSearch::new(page, config, config.site.entry)
        .run(travel)
        .await
}
