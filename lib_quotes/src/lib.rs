//! # lib_quotes
//!
//! Shared library behind the quotes proxy server. Modules are gated by cargo
//! features so that a consumer only pulls in the network stack it needs.
//!
//! - **`loggers`**: `LoggerLocal` and its `Logrecord` entries.
//! - **`markets`**: futures quote client and the dollar rate providers.
//! - **`retrieve`**: per-session HTTP client used by every provider.
//! - **`utils`**: time formatting helpers.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "markets")]
pub mod markets;
#[cfg(feature = "retrieve")]
pub mod retrieve;
#[cfg(feature = "utils")]
pub mod utils;
