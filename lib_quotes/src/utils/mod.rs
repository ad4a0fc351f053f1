//! # Utilities Module
//!
//! General-purpose helpers shared by the loggers and the market clients.
//!
//! ## Contained Modules:
//!
//! - **`time`**: timestamp formatting for log records and response bodies.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Timestamp formatting helpers.
pub mod time;
