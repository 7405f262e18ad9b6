// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # jarclient - asynchronous HTTP session client
//!
//! A thin layer over reqwest that keeps a cookie jar across requests,
//! stamps every request with a user agent and unfolds comma-joined
//! `Set-Cookie` headers before handing responses back.
//!
//! Requests are non-blocking: each verb schedules the exchange on the
//! current tokio runtime and returns. The completion callback receives the
//! body and the response headers, with `set-cookie` as a list of individual
//! cookie strings. Transport failures arrive through the same callback as a
//! 59x status.
//!
//! ## Example
//!
//! ```rust,no_run
//! use jarclient::RequestClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RequestClient::new()?;
//!     let (tx, rx) = tokio::sync::oneshot::channel();
//!
//!     client.post(
//!         "https://example.com/login",
//!         vec![("user", "jane"), ("pass", "secret")],
//!         move |_body, headers| {
//!             let _ = tx.send(headers);
//!         },
//!     )?;
//!
//!     let headers = rx.await?;
//!     println!("{} {}", headers.status, headers.reason);
//!     for cookie in headers.set_cookies() {
//!         println!("set-cookie: {}", cookie);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{
    ClientConfig, Cookie, CookieJar, CookieStore, HeaderField, Method, OutgoingRequest,
    RequestBody, RequestClient, Response, ResponseHeaders, SetCookieSplit, Transport,
    DEFAULT_USER_AGENT,
};

/// jarclient version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
