//! Parsing of the price text displayed next to each flight.
//!
//! The site renders prices as free text inside the result button
//! (`"49"`, `"€ 49"`, `"49,99 €"`, `"1 049 €"`). Only the whole-euro part is
//! kept: the first run of digits, with space-like thousands separators
//! allowed between digit groups, cut at the first decimal separator.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price text is not numeric: {text:?}")]
    NotNumeric { text: String },
}

fn is_group_separator(c: char) -> bool {
    matches!(c, ' ' | '\u{a0}' | '\u{202f}')
}

/// Parse displayed price text into whole euros.
pub fn parse_price(text: &str) -> Result<u32, PriceError> {
    let not_numeric = || PriceError::NotNumeric {
        text: text.to_string(),
    };

    let start = text.find(|c: char| c.is_ascii_digit()).ok_or_else(not_numeric)?;
    let mut chars = text[start..].chars().peekable();
    let mut value: u32 = 0;

    while let Some(c) = chars.next() {
        if let Some(d) = c.to_digit(10) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(d))
                .ok_or_else(not_numeric)?;
        } else if is_group_separator(c) && chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            continue;
        } else {
            break;
        }
    }

    Ok(value)
}
