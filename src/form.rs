//! Search form controller.
//!
//! Fills the route and date fields and submits the search. The interaction
//! order matters more than the values typed:
//!
//! 1. origin: type, then RETURN to accept the autocomplete suggestion
//! 2. destination: type, then RETURN
//! 3. outbound date: clear, type `DD-MM-YYYY`, click the origin field to close
//!    the date picker
//! 4. return date: clear, type `DD-MM-YYYY`, click the origin field again
//! 5. RETURN on the destination field submits the form
//!
//! An open date picker intercepts the next interaction, hence the two
//! clicks on the origin field. Without the RETURN a station field keeps the
//! typed text unconfirmed and the form will not submit. Both entry pages
//! host the same form, so the sequence does not depend on [`EntryPoint`].

use serde::Deserialize;
use std::time::Duration;

use crate::config::Selectors;
use crate::error::SearchError;
use crate::models::Travel;
use crate::page::{ElementHandle, Key, PageError, PageStateClient};

/// Date layout expected by the date-picker inputs.
pub const FORM_DATE_FORMAT: &str = "%d-%m-%Y";

/// Page hosting the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    /// Landing page (`site.home_url`).
    #[default]
    Home,
    /// Direct search page (`site.search_url`).
    Search,
}

struct FormFields {
    origin: ElementHandle,
    destination: ElementHandle,
    outbound_date: ElementHandle,
    return_date: ElementHandle,
}

async fn locate(
    page: &dyn PageStateClient,
    field: &'static str,
    selector: &str,
    timeout: Duration,
) -> Result<ElementHandle, SearchError> {
    page.wait_for(selector, timeout)
        .await
        .map_err(|source| SearchError::FormInteraction { field, source })
}

fn on(field: &'static str) -> impl FnOnce(PageError) -> SearchError {
    move |source| SearchError::FormInteraction { field, source }
}

/// Fill the search form for `travel` and submit it.
///
/// Each control is located with `wait_for(.., timeout)`; any control that
/// cannot be found or used yields [`SearchError::FormInteraction`].
pub async fn fill_and_submit(
    page: &dyn PageStateClient,
    travel: &Travel,
    selectors: &Selectors,
    timeout: Duration,
) -> Result<(), SearchError> {
    let fields = FormFields {
        origin: locate(page, "origin", &selectors.origin_input, timeout).await?,
        destination: locate(page, "destination", &selectors.destination_input, timeout).await?,
        outbound_date: locate(page, "outbound_date", &selectors.outbound_date_input, timeout)
            .await?,
        return_date: locate(page, "return_date", &selectors.return_date_input, timeout).await?,
    };

    page.type_text(&fields.origin, travel.origin())
        .await
        .map_err(on("origin"))?;
    page.press_key(&fields.origin, Key::Return)
        .await
        .map_err(on("origin"))?;

    page.type_text(&fields.destination, travel.destination())
        .await
        .map_err(on("destination"))?;
    page.press_key(&fields.destination, Key::Return)
        .await
        .map_err(on("destination"))?;

    let outbound = travel.departure_date().format(FORM_DATE_FORMAT).to_string();
    page.clear(&fields.outbound_date)
        .await
        .map_err(on("outbound_date"))?;
    page.type_text(&fields.outbound_date, &outbound)
        .await
        .map_err(on("outbound_date"))?;
    page.click(&fields.origin).await.map_err(on("origin"))?;

    let inbound = travel.return_date().format(FORM_DATE_FORMAT).to_string();
    page.clear(&fields.return_date)
        .await
        .map_err(on("return_date"))?;
    page.type_text(&fields.return_date, &inbound)
        .await
        .map_err(on("return_date"))?;
    page.click(&fields.origin).await.map_err(on("origin"))?;

    page.press_key(&fields.destination, Key::Return)
        .await
        .map_err(on("destination"))?;

    tracing::debug!(%outbound, %inbound, "search form submitted");
    Ok(())
}
