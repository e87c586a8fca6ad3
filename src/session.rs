//! Session-scoped search runner.
//!
//! One WebDriver session serves exactly one search. The session is opened
//! before the search and closed after it, whether the search succeeded or
//! not.

use anyhow::{Context, Result};

use crate::bounded::BoundedPage;
use crate::config::Config;
use crate::error::SearchError;
use crate::form::EntryPoint;
use crate::models::{Flight, Travel};
use crate::page::PageError;
use crate::search::TravelSearch;
use crate::webdriver::WebDriverClient;

/// Open a session, run one search through it, and close it.
pub async fn run_search(config: &Config, travel: &Travel, entry: EntryPoint) -> Result<Vec<Flight>> {
    let timeouts = &config.timeouts;
    let client = WebDriverClient::start(&config.browser, timeouts)
        .await
        .with_context(|| {
            format!(
                "Failed to open a browser session at {}",
                config.browser.webdriver_url
            )
        })?;

    let page = BoundedPage::new(client, timeouts.interaction()).with_load_timeout(timeouts.ready());
    let searched = TravelSearch::new(&page, config, entry).run(travel).await;
    let closed = page.into_inner().close().await;

    settle(searched, closed)
}

/// Combine the search outcome with the session close outcome.
///
/// A failed search wins over a failed close; the close failure is only
/// logged in that case.
pub fn settle(
    searched: Result<Vec<Flight>, SearchError>,
    closed: Result<(), PageError>,
) -> Result<Vec<Flight>> {
    match (searched, closed) {
        (Ok(flights), Ok(())) => Ok(flights),
        (Ok(_), Err(e)) => Err(e).context("Failed to close the browser session"),
        (Err(e), Ok(())) => Err(e).context("Flight search failed"),
        (Err(e), Err(close_err)) => {
            tracing::warn!(error = %close_err, "failed to close browser session after search error");
            Err(e).context("Flight search failed")
        }
    }
}
