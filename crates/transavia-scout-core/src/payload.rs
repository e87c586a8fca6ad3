//! Decoder for the payload carried by flight-result buttons.
//!
//! Each `button.flight-result-button` on a result page carries a `value`
//! attribute of the form:
//!
//! ```text
//! <opaque>|HV~5131~ ~Paris (Orly)~21/10/2021 08:30~Amsterdam~21/10/2021 10:15~...
//! ```
//!
//! The segment before the first `|` is discarded. The next segment is split
//! on `~`, blank placeholders (`""` and `" "`) are dropped, and the remaining
//! fields are read by position:
//!
//! | Position | Meaning |
//! |----------|---------|
//! | 0, 1 | carrier code and flight digits (concatenated) |
//! | 2 | origin station label |
//! | 3 | departure, `DD/MM/YYYY HH:MM` |
//! | 4 | destination station label |
//! | 5 | arrival, `DD/MM/YYYY HH:MM` |
//!
//! Fields past position 5 are ignored. The layout is positional only; a
//! markup change on the site shifts fields silently, so every field the
//! decoder relies on is validated before a [`FlightPayload`] is built.
//!
//! # Example
//!
//! ```rust
//! use transavia_scout_core::payload::decode_payload;
//!
//! let p = decode_payload("X|AB~12~Paris~21/10/2021 08:30~Amsterdam~21/10/2021 10:15").unwrap();
//! assert_eq!(p.number, "AB12");
//! assert_eq!(p.destination, "Amsterdam");
//! ```

use chrono::NaiveDateTime;
use thiserror::Error;

/// Timestamp layout used inside payloads.
pub const PAYLOAD_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Number of positional fields a payload must carry after filtering.
pub const REQUIRED_FIELDS: usize = 6;

/// Reasons a raw payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No `|` separator, or no value at all.
    #[error("malformed flight payload: missing '|' separator")]
    MalformedPayload,

    #[error("flight payload has {found} fields, expected at least {REQUIRED_FIELDS}")]
    InsufficientFields { found: usize },

    #[error("invalid timestamp in flight payload: {value:?}")]
    BadTimestamp { value: String },
}

/// Flight identity and timing decoded from a payload.
///
/// The price is not part of the payload; see [`crate::models::Flight::from_payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightPayload {
    pub number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

/// Drop the blank placeholders the site inserts between fields.
///
/// Idempotent: filtering an already-filtered list returns it unchanged.
pub fn filter_fields<'a, I>(fields: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .into_iter()
        .filter(|f| !f.is_empty() && *f != " ")
        .collect()
}

/// Decode a flight-result button `value` into a [`FlightPayload`].
pub fn decode_payload(raw: &str) -> Result<FlightPayload, DecodeError> {
    let body = raw.split('|').nth(1).ok_or(DecodeError::MalformedPayload)?;

    let parts = filter_fields(body.split('~'));
    if parts.len() < REQUIRED_FIELDS {
        return Err(DecodeError::InsufficientFields { found: parts.len() });
    }

    Ok(FlightPayload {
        number: format!("{}{}", parts[0], parts[1]),
        origin: parts[2].to_string(),
        departure_time: parse_timestamp(parts[3])?,
        destination: parts[4].to_string(),
        arrival_time: parse_timestamp(parts[5])?,
    })
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, DecodeError> {
    NaiveDateTime::parse_from_str(value, PAYLOAD_TIME_FORMAT).map_err(|_| {
        DecodeError::BadTimestamp {
            value: value.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_decode_reference_payload() {
        let p = decode_payload("X|AB~12~Paris~21/10/2021 08:30~Amsterdam~21/10/2021 10:15")
            .unwrap();
        assert_eq!(
            p,
            FlightPayload {
                number: "AB12".to_string(),
                origin: "Paris".to_string(),
                destination: "Amsterdam".to_string(),
                departure_time: at(2021, 10, 21, 8, 30),
                arrival_time: at(2021, 10, 21, 10, 15),
            }
        );
    }

    #[test]
    fn test_decode_skips_blank_placeholders() {
        let raw = "0~HV~5131|HV~ ~5131~~Paris (Orly)~ ~21/10/2021 06:45~Amsterdam~21/10/2021 08:10~~";
        let p = decode_payload(raw).unwrap();
        assert_eq!(p.number, "HV5131");
        assert_eq!(p.origin, "Paris (Orly)");
        assert_eq!(p.departure_time, at(2021, 10, 21, 6, 45));
        assert_eq!(p.arrival_time, at(2021, 10, 21, 8, 10));
    }

    #[test]
    fn test_decode_ignores_trailing_fields() {
        let raw = "X|HV~6021~Nantes~01/11/2021 21:05~Porto~01/11/2021 22:00~PRICE~EUR";
        let p = decode_payload(raw).unwrap();
        assert_eq!(p.destination, "Porto");
    }

    #[test]
    fn test_decode_uses_segment_after_first_pipe_only() {
        let raw = "X|AB~12~Paris~21/10/2021 08:30~Amsterdam~21/10/2021 10:15|ZZ~99";
        let p = decode_payload(raw).unwrap();
        assert_eq!(p.number, "AB12");
    }

    #[test]
    fn test_missing_separator_is_malformed() {
        let err = decode_payload("AB~12~Paris~21/10/2021 08:30~Amsterdam~21/10/2021 10:15")
            .unwrap_err();
        assert_eq!(err, DecodeError::MalformedPayload);
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert_eq!(decode_payload("").unwrap_err(), DecodeError::MalformedPayload);
    }

    #[test]
    fn test_too_few_fields() {
        let err = decode_payload("X|AB~12~ ~Paris~~21/10/2021 08:30").unwrap_err();
        assert_eq!(err, DecodeError::InsufficientFields { found: 4 });
    }

    #[test]
    fn test_bad_departure_timestamp() {
        let err = decode_payload("X|AB~12~Paris~2021-10-21 08:30~Amsterdam~21/10/2021 10:15")
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::BadTimestamp {
                value: "2021-10-21 08:30".to_string()
            }
        );
    }

    #[test]
    fn test_bad_arrival_timestamp() {
        let err = decode_payload("X|AB~12~Paris~21/10/2021 08:30~Amsterdam~32/10/2021 10:15")
            .unwrap_err();
        assert!(matches!(err, DecodeError::BadTimestamp { .. }));
    }

    #[test]
    fn test_number_is_concatenation_not_sum() {
        let p = decode_payload("X|0~07~A~01/01/2022 00:00~B~01/01/2022 01:00").unwrap();
        assert_eq!(p.number, "007");
    }

    #[test]
    fn test_filter_fields_idempotent() {
        let raw = ["", "HV", " ", "5131", "  ", "", "Paris"];
        let once = filter_fields(raw);
        let twice = filter_fields(once.clone());
        assert_eq!(once, twice);
        // Only exact single spaces are placeholders.
        assert_eq!(once, vec!["HV", "5131", "  ", "Paris"]);
    }

    #[test]
    fn test_synthetic_payload_reproduces_fields() {
        let cases = [
            ("TO", "3401", "Lyon", at(2022, 2, 28, 23, 55), "Tunis", at(2022, 3, 1, 1, 40)),
            ("HV", "12", "Orly", at(2021, 12, 31, 0, 5), "Agadir", at(2021, 12, 31, 3, 50)),
        ];
        for (carrier, digits, origin, dep, destination, arr) in cases {
            let raw = format!(
                "opaque| ~{}~~{}~{}~{}~ ~{}~{}",
                carrier,
                digits,
                origin,
                dep.format(PAYLOAD_TIME_FORMAT),
                destination,
                arr.format(PAYLOAD_TIME_FORMAT)
            );
            let p = decode_payload(&raw).unwrap();
            assert_eq!(p.number, format!("{}{}", carrier, digits));
            assert_eq!(p.origin, origin);
            assert_eq!(p.destination, destination);
            assert_eq!(p.departure_time, dep);
            assert_eq!(p.arrival_time, arr);
        }
    }
}
