// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP session layer
//!
//! Wraps a transport with a user agent, a shared cookie jar and unfolding of
//! comma-joined `Set-Cookie` headers.

mod client;
mod cookie;
mod request;
mod response;
mod set_cookie;
mod transport;

pub use client::{
    parse_timeout, ClientConfig, RequestClient, DEFAULT_TIMEOUT_SECS, ENV_AGENT, ENV_TIMEOUT,
};
pub use cookie::{Cookie, CookieJar, CookieStore};
pub use request::{Method, OutgoingRequest, RequestBody};
pub use response::{
    HeaderField, Response, ResponseHeaders, STATUS_BODY_FAILED, STATUS_CONNECT_FAILED,
    STATUS_TRANSPORT_FAILED,
};
pub use set_cookie::{normalize_set_cookie, split_attribute_aware, split_pairwise, SetCookieSplit};
pub use transport::{Completion, DispatchOptions, ReqwestTransport, Transport};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("jarclient/", env!("CARGO_PKG_VERSION"));

/// Header names the session layer reads or writes
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const USER_AGENT: &str = "user-agent";
}
