//! # Financial Market APIs Module
//!
//! Client implementations for the external providers behind the proxy. Each
//! provider module hides its URLs, headers, cookies and payload shapes and
//! hands back normalized values.
//!
//! ## Contained Modules:
//!
//! - **`barchart`**: futures contract quotes, fetched per root through the
//!   site's token-protected quote API and reshaped to a fixed table.
//! - **`currency`**: USD/BRL rate from a primary and a fallback provider.
//! - **`error`**: `MarketError`, shared by every provider.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Futures quotes client and reshaping.
pub mod barchart;
/// Dollar rate providers and selection policy.
pub mod currency;
/// Provider error kinds.
pub mod error;
