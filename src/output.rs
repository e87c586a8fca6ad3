//! Rendering of search results for stdout.

use anyhow::Result;

use crate::models::{Flight, Travel};

/// Header line for the travel, then one line per flight.
pub fn render_text(travel: &Travel, flights: &[Flight]) -> String {
    let mut out = format!("{}\n", travel);
    for flight in flights {
        out.push_str(&flight.to_string());
        out.push('\n');
    }
    out
}

/// Pretty-printed JSON array of flights.
pub fn render_json(flights: &[Flight]) -> Result<String> {
    Ok(serde_json::to_string_pretty(flights)?)
}
