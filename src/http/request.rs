// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Outgoing request types

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::headers;
use crate::error::{Error, Result};

/// HTTP methods supported by the session client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether requests of this method carry a body
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(Error::config(format!("unsupported method: {}", other))),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Body of a POST or PUT request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Form fields, sent URL-encoded in the given order
    Form(Vec<(String, String)>),
    /// Raw bytes, sent as-is
    Raw(Bytes),
}

impl RequestBody {
    /// Build a form body from name/value pairs
    pub fn form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Content type implied by the body, if any
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
            RequestBody::Raw(_) => None,
        }
    }

    /// Encode the body into wire bytes
    pub fn into_bytes(self) -> Bytes {
        match self {
            RequestBody::Form(fields) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields.iter())
                    .finish();
                Bytes::from(encoded)
            }
            RequestBody::Raw(bytes) => bytes,
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Raw(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Raw(Bytes::from(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Raw(Bytes::from(s))
    }
}

impl From<&'static str> for RequestBody {
    fn from(s: &'static str) -> Self {
        RequestBody::Raw(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Vec<(String, String)>> for RequestBody {
    fn from(fields: Vec<(String, String)>) -> Self {
        RequestBody::Form(fields)
    }
}

impl From<Vec<(&str, &str)>> for RequestBody {
    fn from(fields: Vec<(&str, &str)>) -> Self {
        RequestBody::form(fields)
    }
}

/// A request assembled for a single dispatch
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    /// Request method
    pub method: Method,
    /// Target URL
    pub url: Url,
    /// Request headers (names are always lower-case)
    pub headers: HeaderMap,
    /// Encoded request body
    pub body: Option<Bytes>,
}

impl OutgoingRequest {
    /// Create a bodyless request
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    /// Build a request for `method`, attaching `body` only where the method carries one
    pub fn for_method(
        method: Method,
        url: impl AsRef<str>,
        body: Option<RequestBody>,
    ) -> Result<Self> {
        match method {
            Method::Get => Self::get(url),
            Method::Head => Self::head(url),
            Method::Delete => Self::delete(url),
            Method::Post => Self::post(url, body.unwrap_or(RequestBody::Raw(Bytes::new()))),
            Method::Put => Self::put(url, body.unwrap_or(RequestBody::Raw(Bytes::new()))),
        }
    }

    /// Create a GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::Get, url)
    }

    /// Create a HEAD request
    pub fn head(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::Head, url)
    }

    /// Create a DELETE request
    pub fn delete(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::Delete, url)
    }

    /// Create a POST request
    pub fn post(url: impl AsRef<str>, body: impl Into<RequestBody>) -> Result<Self> {
        Ok(Self::new(Method::Post, url)?.body(body))
    }

    /// Create a PUT request
    pub fn put(url: impl AsRef<str>, body: impl Into<RequestBody>) -> Result<Self> {
        Ok(Self::new(Method::Put, url)?.body(body))
    }

    /// Set a header, replacing any previous value
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the body and its implied content type
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        let body = body.into();
        if let Some(content_type) = body.content_type() {
            self = self.header(headers::CONTENT_TYPE, content_type);
        }
        self.body = Some(body.into_bytes());
        self
    }

    /// Get a header value as a string
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get the URL as string
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    /// Get the host
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}
