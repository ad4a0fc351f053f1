//! # Barchart Futures Module
//!
//! Futures quotes scraped from the site's internal quote API.
//!
//! ## Contained Modules:
//!
//! - **`apicall`**: session handling, anti-forgery token extraction and the
//!   authenticated data call for one root.
//! - **`futures`**: the fixed output schema, row reshaping and the multi-root
//!   aggregation behind `/futures`.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Session and token handling for the quote API.
pub mod apicall;
/// Output rows, reshaping and aggregation.
pub mod futures;
