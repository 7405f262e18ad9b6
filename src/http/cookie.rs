// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie storage shared across requests of a session

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

use super::headers;
use super::request::OutgoingRequest;
use super::response::Response;
use crate::error::{ErrorContext, Result};

/// Capabilities the client needs from a cookie store.
///
/// Stores are shared between overlapping in-flight requests, so
/// implementations synchronize internally.
pub trait CookieStore: Send + Sync + fmt::Debug {
    /// Attach stored cookies applicable to the request's URL
    fn add_cookie_header(&self, request: &mut OutgoingRequest);

    /// Absorb the `Set-Cookie` values of a response
    fn extract_cookies(&self, response: &Response);

    /// Number of stored cookies
    fn len(&self) -> usize;

    /// Check if the store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to
    pub domain: String,
    /// Only sent to exactly `domain`, not its subdomains
    #[serde(default)]
    pub host_only: bool,
    /// Path the cookie is valid for
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            host_only: false,
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Session cookies have no expiry and are not persisted by default
    pub fn is_session(&self) -> bool {
        self.expires.is_none()
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if !self.domain_matches(host) {
            return false;
        }

        if !self.path_matches(url.path()) {
            return false;
        }

        if self.secure && url.scheme() != "https" {
            return false;
        }

        !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }

        let host = host.to_ascii_lowercase();
        let domain = self.domain.trim_start_matches('.').to_ascii_lowercase();
        if self.host_only {
            return host == domain;
        }
        host == domain || host.ends_with(&format!(".{}", domain))
    }

    fn path_matches(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        request_path.starts_with(&self.path)
            && (self.path.ends_with('/') || request_path[self.path.len()..].starts_with('/'))
    }

    /// Parse a single Set-Cookie value received from `url`
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name, value.trim());

        cookie.domain = url.host_str().unwrap_or("").to_string();
        cookie.host_only = true;
        cookie.path = default_path(url);

        let mut max_age_seen = false;
        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" if !val.is_empty() => {
                        cookie.domain = val.trim_start_matches('.').to_lowercase();
                        cookie.host_only = false;
                    }
                    "path" if val.starts_with('/') => cookie.path = val.to_string(),
                    "expires" if !max_age_seen => {
                        if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                            cookie.expires = Some(dt.with_timezone(&Utc));
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            max_age_seen = true;
                            cookie.expires = Some(max_age_expiry(secs));
                        }
                    }
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        // Reject cookies for domains the response host does not belong to
        if !cookie.host_only && !cookie.domain_matches(url.host_str().unwrap_or("")) {
            tracing::debug!(
                cookie = %cookie.name,
                domain = %cookie.domain,
                "Ignoring cookie for foreign domain"
            );
            return None;
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Last second of year 9999, the latest expiry a cookie is stored with
const LATEST_EXPIRY_TIMESTAMP: i64 = 253_402_300_799;

/// Expiry for a `Max-Age` of `secs` seconds from now.
///
/// Non-positive values expire immediately. Values past the representable
/// range are clamped so that the expiry still round-trips through the jar file.
fn max_age_expiry(secs: i64) -> DateTime<Utc> {
    let now = Utc::now();
    if secs <= 0 {
        return now;
    }
    let latest = DateTime::<Utc>::from_timestamp(LATEST_EXPIRY_TIMESTAMP, 0)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    chrono::Duration::try_seconds(secs)
        .and_then(|age| now.checked_add_signed(age))
        .map_or(latest, |expires| expires.min(latest))
}

/// Directory of the request path, as used when Set-Cookie names no Path
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Thread-safe cookie storage
#[derive(Debug, Clone)]
pub struct CookieJar {
    /// Cookies stored by domain
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(DashMap::new()),
        }
    }

    /// Store a cookie, replacing one with the same name, domain and path.
    ///
    /// An already expired cookie only removes its stored counterpart.
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        if !cookie.is_expired() {
            entry.push(cookie);
        }
    }

    /// Add a cookie from a single Set-Cookie value
    pub fn add_from_header(&self, header: &str, url: &Url) {
        if let Some(cookie) = Cookie::parse(header, url) {
            tracing::trace!(name = %cookie.name, domain = %cookie.domain, "Storing cookie");
            self.add(cookie);
        }
    }

    /// Get all cookies for a URL, longest path first
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.remove_expired();

        let mut result: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|c| c.matches(url))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();

        result.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.name.cmp(&b.name))
        });
        result
    }

    /// Get Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|c| c.to_header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Remove a specific cookie
    pub fn remove(&self, name: &str, domain: &str, path: &str) {
        if let Some(mut cookies) = self.cookies.get_mut(domain) {
            cookies.retain(|c| c.name != name || c.path != path);
        }
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.clear();
    }

    /// Clear cookies for a specific domain
    pub fn clear_domain(&self, domain: &str) {
        self.cookies.remove(domain);
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export cookies as JSON, optionally including session cookies
    pub fn to_json(&self, keep_session: bool) -> serde_json::Result<String> {
        let all_cookies: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .filter(|c| !c.is_expired() && (keep_session || !c.is_session()))
            .collect();
        serde_json::to_string_pretty(&all_cookies)
    }

    /// Import cookies from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        let jar = CookieJar::new();
        for cookie in cookies {
            jar.add(cookie);
        }
        Ok(jar)
    }

    /// Write the jar to a JSON file
    pub fn save(&self, path: impl AsRef<Path>, keep_session: bool) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json(keep_session)?;
        fs::write(path, json).context(&format!("writing cookie file {}", path.display()))?;
        tracing::debug!(path = %path.display(), cookies = self.len(), "Saved cookie jar");
        Ok(())
    }

    /// Read a jar from a JSON file written by [`CookieJar::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .context(&format!("reading cookie file {}", path.display()))?;
        let jar = Self::from_json(&json)
            .context(&format!("parsing cookie file {}", path.display()))?;
        tracing::debug!(path = %path.display(), cookies = jar.len(), "Loaded cookie jar");
        Ok(jar)
    }
}

impl CookieStore for CookieJar {
    fn add_cookie_header(&self, request: &mut OutgoingRequest) {
        let Some(header) = self.get_cookie_header(&request.url) else {
            return;
        };
        match HeaderValue::from_str(&header) {
            Ok(value) => {
                request.headers.insert(headers::COOKIE, value);
            }
            Err(_) => tracing::warn!(url = %request.url, "Stored cookies are not a valid header value"),
        }
    }

    fn extract_cookies(&self, response: &Response) {
        for cookie in response.set_cookies() {
            self.add_from_header(cookie, &response.request.url);
        }
    }

    fn len(&self) -> usize {
        CookieJar::len(self)
    }
}
