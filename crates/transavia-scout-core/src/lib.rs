//! # Transavia Scout Core
//!
//! Runtime-free logic for Transavia Scout: the travel and flight models,
//! the flight-button payload decoder, the price parser, and the
//! [`page::PageStateClient`] capability that the search pipeline drives.
//!
//! This crate contains no tokio, HTTP client, or browser driver. Concrete
//! page implementations (WebDriver) live in the `transavia-scout` crate;
//! [`page::memory::InMemoryPage`] is a scripted fake for tests.

pub mod models;
pub mod page;
pub mod payload;
pub mod price;
