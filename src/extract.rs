//! Flight list extraction for one result section.
//!
//! A result section (outbound or inbound) shows a strip of date tabs and
//! the flights of the selected date. For every tab with availability, in
//! strip order, the tab is activated and every flight button then present in
//! the section is decoded.
//!
//! Flights are not deduplicated. When activating a tab leaves previously
//! rendered buttons in place, those flights are emitted again.

use crate::config::Selectors;
use crate::error::{PriceReadError, SearchError};
use crate::models::Flight;
use crate::page::{ElementHandle, PageError, PageStateClient};
use crate::payload::{decode_payload, DecodeError};
use crate::price::parse_price;

/// A date tab and whether the site flags it as having flights.
#[derive(Debug, Clone)]
pub struct DateTab {
    pub handle: ElementHandle,
    pub available: bool,
}

/// List the date tabs of a section, in strip order.
///
/// The default `date_tab` selector only matches tabs with availability; the
/// class check also filters a broader override such as `.day`.
pub async fn date_tabs(
    page: &dyn PageStateClient,
    section: &ElementHandle,
    section_name: &'static str,
    selectors: &Selectors,
) -> Result<Vec<DateTab>, SearchError> {
    let wrap = |source: PageError| SearchError::Extraction {
        section: section_name,
        source,
    };

    let strip = page
        .find_in(section, &selectors.date_tab_strip)
        .await
        .map_err(wrap)?;

    let mut tabs = Vec::new();
    for handle in page
        .find_all_in(&strip, &selectors.date_tab)
        .await
        .map_err(wrap)?
    {
        let class = page
            .read_attribute(&handle, "class")
            .await
            .map_err(wrap)?
            .unwrap_or_default();
        let available = class
            .split_whitespace()
            .any(|c| c == selectors.availability_class);
        tabs.push(DateTab { handle, available });
    }
    if tabs.is_empty() {
        tracing::debug!(section = section_name, selector = %selectors.date_tab, "no date tabs in strip");
    }
    Ok(tabs)
}

/// Decode one flight button, reading its price from the price node inside it.
pub async fn read_flight(
    page: &dyn PageStateClient,
    button: &ElementHandle,
    section_name: &'static str,
    selectors: &Selectors,
) -> Result<Flight, SearchError> {
    let raw = page
        .read_attribute(button, "value")
        .await
        .map_err(|source| SearchError::Extraction {
            section: section_name,
            source,
        })?
        .ok_or(DecodeError::MalformedPayload)?;
    let payload = decode_payload(&raw)?;

    let price_node = page
        .find_in(button, &selectors.price)
        .await
        .map_err(|e| SearchError::PriceRead(PriceReadError::Missing(e)))?;
    let price_text = page
        .read_text(&price_node)
        .await
        .map_err(|e| SearchError::PriceRead(PriceReadError::Missing(e)))?;
    let price = parse_price(&price_text)?;

    Ok(Flight::from_payload(payload, price))
}

/// Collect the flights of every available date tab in `section`.
///
/// Ordering is tab order, then document order within a tab. A section
/// without available tabs yields an empty list.
pub async fn extract_flights(
    page: &dyn PageStateClient,
    section: &ElementHandle,
    section_name: &'static str,
    selectors: &Selectors,
) -> Result<Vec<Flight>, SearchError> {
    let wrap = |source: PageError| SearchError::Extraction {
        section: section_name,
        source,
    };

    let tabs = date_tabs(page, section, section_name, selectors).await?;
    let mut flights = Vec::new();

    for (index, tab) in tabs.iter().enumerate().filter(|(_, t)| t.available) {
        let activate = page
            .find_in(&tab.handle, &selectors.date_tab_button)
            .await
            .map_err(wrap)?;
        page.click(&activate).await.map_err(wrap)?;

        let buttons = page
            .find_all_in(section, &selectors.flight_button)
            .await
            .map_err(wrap)?;
        for button in &buttons {
            flights.push(read_flight(page, button, section_name, selectors).await?);
        }
        tracing::debug!(
            section = section_name,
            tab = index,
            flights = buttons.len(),
            "date tab harvested"
        );
    }

    Ok(flights)
}
