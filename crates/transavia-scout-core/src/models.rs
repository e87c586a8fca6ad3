//! Core data models: the search request and the flights it yields.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

use crate::payload::FlightPayload;

/// Errors raised when building a [`Travel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelError {
    #[error("return date {return_date} is before departure date {departure_date}")]
    ReturnBeforeDeparture {
        departure_date: NaiveDate,
        return_date: NaiveDate,
    },
}

/// A round-trip search request.
///
/// Origin and destination are free text, typed into the site's station
/// autocomplete as-is. Only the dates are used; there is no time filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Travel {
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    return_date: NaiveDate,
}

impl Travel {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<Self, TravelError> {
        if return_date < departure_date {
            return Err(TravelError::ReturnBeforeDeparture {
                departure_date,
                return_date,
            });
        }
        Ok(Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date,
            return_date,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    pub fn return_date(&self) -> NaiveDate {
        self.return_date
    }
}

impl fmt::Display for Travel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.origin,
            self.destination,
            self.departure_date.format("%Y-%m-%d"),
            self.return_date.format("%Y-%m-%d")
        )
    }
}

/// A single flight offer scraped from a result page.
///
/// Station labels are the ones rendered by the site and need not match the
/// strings of the originating [`Travel`]. Two flights with equal fields are
/// indistinguishable; the extractor may emit such duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flight {
    /// Carrier code and flight digits, e.g. `"HV5131"`.
    pub number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    /// Whole euros, as displayed next to the flight.
    pub price: u32,
}

impl Flight {
    /// Attach the separately-read price to a decoded payload.
    pub fn from_payload(payload: FlightPayload, price: u32) -> Self {
        Self {
            number: payload.number,
            origin: payload.origin,
            destination: payload.destination,
            departure_time: payload.departure_time,
            arrival_time: payload.arrival_time,
            price,
        }
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | {} | {}€",
            self.number,
            self.origin,
            self.destination,
            self.departure_time.format("%H:%M"),
            self.arrival_time.format("%H:%M"),
            self.price
        )
    }
}
