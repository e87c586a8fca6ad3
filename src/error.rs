//! Error taxonomy of the search pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::page::PageError;
use crate::payload::DecodeError;
use crate::price::PriceError;

/// Why a search aborted. No variant carries partial results.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The entry page, or the readiness marker on it, did not load in time.
    /// `waiting_for` is the URL or the marker selector.
    #[error("search page did not load within {duration:?} (waiting for {waiting_for})")]
    NavigationTimeout {
        waiting_for: String,
        duration: Duration,
    },

    /// Navigation itself, or the cookie banner, failed at the driver level.
    #[error("browser interaction failed")]
    Driver(#[source] PageError),

    /// A search form control was missing or rejected an interaction.
    #[error("search form field '{field}' could not be used")]
    FormInteraction {
        field: &'static str,
        #[source]
        source: PageError,
    },

    /// A result section, its date tabs, or a flight control could not be read.
    #[error("could not extract {section} flights")]
    Extraction {
        section: &'static str,
        #[source]
        source: PageError,
    },

    #[error("could not decode flight payload")]
    Decode(#[from] DecodeError),

    /// The price node is missing or its text is not a number.
    #[error("could not read flight price")]
    PriceRead(#[source] PriceReadError),
}

#[derive(Debug, Error)]
pub enum PriceReadError {
    #[error(transparent)]
    Missing(PageError),
    #[error(transparent)]
    Invalid(#[from] PriceError),
}

impl From<PriceError> for SearchError {
    fn from(e: PriceError) -> Self {
        SearchError::PriceRead(PriceReadError::Invalid(e))
    }
}
