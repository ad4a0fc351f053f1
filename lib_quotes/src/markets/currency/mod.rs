//! # Currency Rates Module
//!
//! USD/BRL quotes from two providers and the policy that picks between them.
//!
//! ## Contained Modules:
//!
//! - **`investing`**: primary provider, session page load plus the real-time
//!   AJAX endpoint.
//! - **`awesomeapi`**: fallback provider, one public JSON call.
//! - **`rate`**: `RateSample`, the `RateProvider` seam and `DollarRate`, which
//!   applies the freshness window and the single fallback.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Fallback provider.
pub mod awesomeapi;
/// Primary provider.
pub mod investing;
/// Samples and the primary/fallback selection.
pub mod rate;
