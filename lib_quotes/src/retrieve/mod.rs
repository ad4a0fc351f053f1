//! # Data Retrieval Module
//!
//! Generic HTTP session client shared by every market provider, so that the
//! provider modules only deal with URLs, headers and payload shapes.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: `ApiClient`, a `reqwest` client with its own cookie store
//!   and optional timeout, returning status, cookies and text body.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Session-scoped HTTP client with cookie capture.
pub mod ky_http;
