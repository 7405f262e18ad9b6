// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response header mapping and the response handed to cookie stores

use std::collections::BTreeMap;

use super::headers;
use super::request::OutgoingRequest;

/// Status used when the connection could not be established (DNS, refused, TLS)
pub const STATUS_CONNECT_FAILED: u16 = 595;
/// Status used when the response body could not be read
pub const STATUS_BODY_FAILED: u16 = 597;
/// Status used for timeouts and any other transport failure
pub const STATUS_TRANSPORT_FAILED: u16 = 599;

/// Value stored under a header name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderField {
    /// A single (possibly folded) value
    Single(String),
    /// Individual values, used for unfolded `set-cookie`
    List(Vec<String>),
}

impl HeaderField {
    /// Value as a single string, if this is not a list
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderField::Single(s) => Some(s),
            HeaderField::List(_) => None,
        }
    }

    /// All values as string slices
    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderField::Single(s) => vec![s.as_str()],
            HeaderField::List(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

/// Response headers keyed by lower-case name, with status and reason
/// carried alongside as pseudo-headers.
///
/// Repeated headers are folded into one `", "`-joined value on insertion,
/// the way the transport hands them over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeaders {
    /// `Status` pseudo-header; 59x marks a transport failure
    pub status: u16,
    /// `Reason` pseudo-header; the error text on transport failure
    pub reason: String,
    fields: BTreeMap<String, HeaderField>,
}

impl ResponseHeaders {
    /// Create an empty mapping with the given status line
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Create the mapping reported for a failed exchange
    pub fn transport_error(status: u16, reason: impl Into<String>) -> Self {
        Self::new(status, reason)
    }

    /// Whether this mapping describes a transport failure rather than a server reply.
    ///
    /// Only the three codes the transport emits are recognized. A server that
    /// itself answers 595, 597 or 599 cannot be told apart from a local failure.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self.status,
            STATUS_CONNECT_FAILED | STATUS_BODY_FAILED | STATUS_TRANSPORT_FAILED
        )
    }

    /// Append a header value, folding repeats with `", "`
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.get_mut(&name.to_ascii_lowercase()) {
            Some(HeaderField::Single(existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Some(HeaderField::List(list)) => list.push(value),
            None => {
                self.fields
                    .insert(name.to_ascii_lowercase(), HeaderField::Single(value));
            }
        }
    }

    /// Replace the value stored under `name`
    pub fn set(&mut self, name: &str, field: HeaderField) {
        self.fields.insert(name.to_ascii_lowercase(), field);
    }

    /// Remove and return the value stored under `name`
    pub fn remove(&mut self, name: &str) -> Option<HeaderField> {
        self.fields.remove(&name.to_ascii_lowercase())
    }

    /// Get a header field
    pub fn get(&self, name: &str) -> Option<&HeaderField> {
        self.fields.get(&name.to_ascii_lowercase())
    }

    /// Get a single-valued header as a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(HeaderField::as_str)
    }

    /// Individual `Set-Cookie` strings (one element if still folded)
    pub fn set_cookies(&self) -> Vec<&str> {
        self.get(headers::SET_COOKIE)
            .map(HeaderField::values)
            .unwrap_or_default()
    }

    /// Iterate over header names and values in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of headers (pseudo-headers excluded)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no headers are present
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A completed exchange as seen by cookie stores
#[derive(Debug, Clone)]
pub struct Response {
    /// Normalized response headers
    pub headers: ResponseHeaders,
    /// The request that produced this response
    pub request: OutgoingRequest,
}

impl Response {
    /// Create a new response
    pub fn new(headers: ResponseHeaders, request: OutgoingRequest) -> Self {
        Self { headers, request }
    }

    /// Status code
    pub fn status(&self) -> u16 {
        self.headers.status
    }

    /// Reason phrase
    pub fn reason(&self) -> &str {
        &self.headers.reason
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status())
    }

    /// Check if the exchange failed below HTTP
    pub fn is_transport_error(&self) -> bool {
        self.headers.is_transport_error()
    }

    /// Get Set-Cookie values
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers.set_cookies()
    }

    /// Give back the headers
    pub fn into_headers(self) -> ResponseHeaders {
        self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_folds_repeats() {
        let mut headers = ResponseHeaders::new(200, "OK");
        headers.append("Set-Cookie", "a=1");
        headers.append("set-cookie", "b=2");
        headers.append("Content-Type", "text/html");

        assert_eq!(headers.get_str("set-cookie"), Some("a=1, b=2"));
        assert_eq!(headers.get_str("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_append_to_list() {
        let mut headers = ResponseHeaders::new(200, "OK");
        headers.set("set-cookie", HeaderField::List(vec!["a=1".into()]));
        headers.append("set-cookie", "b=2");
        assert_eq!(headers.set_cookies(), vec!["a=1", "b=2"]);
        assert_eq!(headers.get_str("set-cookie"), None);
    }

    #[test]
    fn test_transport_error_marker() {
        let headers = ResponseHeaders::transport_error(STATUS_CONNECT_FAILED, "connection refused");
        assert!(headers.is_transport_error());
        assert!(headers.is_empty());
        assert!(!ResponseHeaders::new(500, "Internal Server Error").is_transport_error());
    }

    #[test]
    fn test_other_59x_replies_are_not_transport_errors() {
        for status in [STATUS_CONNECT_FAILED, STATUS_BODY_FAILED, STATUS_TRANSPORT_FAILED] {
            assert!(ResponseHeaders::transport_error(status, "failed").is_transport_error());
        }
        for status in [590, 591, 596, 598] {
            assert!(!ResponseHeaders::new(status, "Proxy Reply").is_transport_error());
        }
    }

    #[test]
    fn test_response_status() {
        let request = OutgoingRequest::get("https://example.com").unwrap();
        let resp = Response::new(ResponseHeaders::new(302, "Found"), request);
        assert!(resp.is_redirect());
        assert!(!resp.is_success());
        assert_eq!(resp.reason(), "Found");
        assert_eq!(resp.request.url_str(), "https://example.com/");
    }
}
