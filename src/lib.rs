//! # Transavia Scout
//!
//! Drives the Transavia flight search in a real browser and extracts the
//! outbound and inbound flight offers from the rendered result page.
//! Transavia publishes no API for this; the page itself is the interface.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │  Travel  │──▶│ Search form  │──▶│ Result page  │──▶│  Flights  │
//! │ (request)│   │  controller  │   │  extractor   │   │ (ordered) │
//! └──────────┘   └──────┬───────┘   └──────┬───────┘   └───────────┘
//!                       │                  │
//!                       ▼                  ▼
//!               ┌──────────────────────────────────┐
//!               │   PageStateClient (WebDriver)    │
//!               └──────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. [`session::run_search`] opens a WebDriver session ([`webdriver`]) and
//!    bounds every interaction with a timeout ([`bounded`]).
//! 2. [`search::TravelSearch`] loads the entry page, waits for the form,
//!    dismisses the cookie banner when present, and hands over to
//!    [`form::fill_and_submit`].
//! 3. [`extract::extract_flights`] walks the date tabs of the outbound then
//!    the inbound section, decoding every flight button ([`payload`],
//!    [`price`]).
//! 4. The CLI renders the flights as text lines or JSON ([`output`]).
//!
//! ## Quick Start
//!
//! ```bash
//! geckodriver --port 4444 &
//! tscout -o Paris -t Amsterdam -d 2021-10-21 -r 2021-10-22
//! tscout -o Nantes -t Porto -d 2021-11-01 -r 2021-11-08 --entry search --json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Travel and flight types |
//! | [`payload`] | Flight-button payload decoder |
//! | [`price`] | Displayed price parser |
//! | [`page`] | Page capability trait and in-memory page |
//! | [`webdriver`] | W3C WebDriver client |
//! | [`bounded`] | Per-interaction timeouts |
//! | [`form`] | Search form controller |
//! | [`extract`] | Flight list extractor |
//! | [`search`] | Search orchestrator |
//! | [`session`] | Session-scoped search runner |
//! | [`output`] | Text and JSON rendering |

pub mod bounded;
pub mod config;
pub mod error;
pub mod extract;
pub mod form;
pub mod output;
pub mod search;
pub mod session;
pub mod webdriver;

pub use transavia_scout_core::{models, page, payload, price};
