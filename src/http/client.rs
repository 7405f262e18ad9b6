// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session client: user agent, cookie jar and Set-Cookie unfolding around a transport

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderValue;

use super::cookie::{CookieJar, CookieStore};
use super::request::{Method, OutgoingRequest, RequestBody};
use super::response::{Response, ResponseHeaders};
use super::set_cookie::{normalize_set_cookie, SetCookieSplit};
use super::transport::{DispatchOptions, ReqwestTransport, Transport};
use super::{headers, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the timeout
pub const ENV_TIMEOUT: &str = "JARCLIENT_TIMEOUT";
/// Environment variable overriding the user agent
pub const ENV_AGENT: &str = "JARCLIENT_AGENT";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Timeout in whole seconds; 0 disables the transport timeout
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// How folded Set-Cookie headers are unfolded
    pub set_cookie_split: SetCookieSplit,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            set_cookie_split: SetCookieSplit::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new client config
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `JARCLIENT_TIMEOUT` and `JARCLIENT_AGENT`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = env::var(ENV_TIMEOUT) {
            config.timeout_secs = parse_timeout(&raw)?;
        }
        if let Ok(agent) = env::var(ENV_AGENT) {
            config.user_agent = agent;
        }
        Ok(config)
    }

    /// Set timeout in seconds
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the Set-Cookie unfolding strategy
    pub fn set_cookie_split(mut self, mode: SetCookieSplit) -> Self {
        self.set_cookie_split = mode;
        self
    }

    /// Timeout handed to the transport
    pub fn transport_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Parse a timeout given as text, rejecting negative and non-numeric values
pub fn parse_timeout(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(secs) if secs < 0 => Err(Error::config(format!(
            "timeout must not be negative, got {}",
            secs
        ))),
        Ok(secs) => Ok(secs as u64),
        Err(_) => Err(Error::config(format!("timeout is not a number: {:?}", raw))),
    }
}

/// Asynchronous HTTP session client.
///
/// Every request carries the configured user agent and the cookies the jar
/// holds for its URL. Responses feed the jar before the caller's callback
/// runs. Callbacks of overlapping requests may fire in any order.
#[derive(Clone)]
pub struct RequestClient {
    config: ClientConfig,
    cookie_jar: Arc<dyn CookieStore>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestClient")
            .field("config", &self.config)
            .field("cookie_jar", &self.cookie_jar)
            .finish_non_exhaustive()
    }
}

impl RequestClient {
    /// Create a client with default configuration and an empty cookie jar
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client dispatching through the given transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            cookie_jar: Arc::new(CookieJar::new()),
            transport,
        }
    }

    /// Timeout in seconds
    pub fn timeout(&self) -> u64 {
        self.config.timeout_secs
    }

    /// Set the timeout in seconds for subsequent requests
    pub fn set_timeout(&mut self, secs: u64) {
        self.config.timeout_secs = secs;
    }

    /// User agent string
    pub fn agent(&self) -> &str {
        &self.config.user_agent
    }

    /// Set the user agent for subsequent requests
    pub fn set_agent(&mut self, agent: impl Into<String>) {
        self.config.user_agent = agent.into();
    }

    /// The cookie store shared by this client's requests
    pub fn cookie_jar(&self) -> &Arc<dyn CookieStore> {
        &self.cookie_jar
    }

    /// Replace the cookie store
    pub fn set_cookie_jar(&mut self, jar: Arc<dyn CookieStore>) {
        self.cookie_jar = jar;
    }

    /// Get client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issue a GET request
    pub fn get<F>(&self, url: impl AsRef<str>, callback: F) -> Result<()>
    where
        F: FnOnce(Bytes, ResponseHeaders) + Send + 'static,
    {
        self.verb(Method::Get, url, None, callback)
    }

    /// Issue a HEAD request
    pub fn head<F>(&self, url: impl AsRef<str>, callback: F) -> Result<()>
    where
        F: FnOnce(Bytes, ResponseHeaders) + Send + 'static,
    {
        self.verb(Method::Head, url, None, callback)
    }

    /// Issue a DELETE request
    pub fn delete<F>(&self, url: impl AsRef<str>, callback: F) -> Result<()>
    where
        F: FnOnce(Bytes, ResponseHeaders) + Send + 'static,
    {
        self.verb(Method::Delete, url, None, callback)
    }

    /// Issue a POST request with form fields or a raw body
    pub fn post<F>(
        &self,
        url: impl AsRef<str>,
        body: impl Into<RequestBody>,
        callback: F,
    ) -> Result<()>
    where
        F: FnOnce(Bytes, ResponseHeaders) + Send + 'static,
    {
        self.verb(Method::Post, url, Some(body.into()), callback)
    }

    /// Issue a PUT request with form fields or a raw body
    pub fn put<F>(
        &self,
        url: impl AsRef<str>,
        body: impl Into<RequestBody>,
        callback: F,
    ) -> Result<()>
    where
        F: FnOnce(Bytes, ResponseHeaders) + Send + 'static,
    {
        self.verb(Method::Put, url, Some(body.into()), callback)
    }

    fn verb<F>(
        &self,
        method: Method,
        url: impl AsRef<str>,
        body: Option<RequestBody>,
        callback: F,
    ) -> Result<()>
    where
        F: FnOnce(Bytes, ResponseHeaders) + Send + 'static,
    {
        let request = OutgoingRequest::for_method(method, url, body)?;
        self.request(request, callback)
    }

    /// Dispatch a request and return immediately.
    ///
    /// `callback` receives the body and the headers with `set-cookie` unfolded
    /// into a list. Transport failures arrive there too, as a 59x status.
    /// An `Err` is returned only when nothing could be dispatched.
    pub fn request<F>(&self, mut request: OutgoingRequest, callback: F) -> Result<()>
    where
        F: FnOnce(Bytes, ResponseHeaders) + Send + 'static,
    {
        let agent = HeaderValue::from_str(&self.config.user_agent).map_err(|_| {
            Error::config(format!("invalid user agent: {:?}", self.config.user_agent))
        })?;
        request.headers.insert(headers::USER_AGENT, agent);
        self.cookie_jar.add_cookie_header(&mut request);

        let options = DispatchOptions {
            timeout: self.config.transport_timeout(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        };
        let method = request.method;
        let url = request.url.clone();
        let jar = Arc::clone(&self.cookie_jar);
        let split = self.config.set_cookie_split;

        tracing::debug!(%method, %url, "Dispatching request");
        self.transport.dispatch(
            method,
            url,
            options,
            Box::new(move |body, mut response_headers| {
                normalize_set_cookie(&mut response_headers, split);
                if response_headers.is_transport_error() {
                    tracing::warn!(
                        %method,
                        url = %request.url,
                        status = response_headers.status,
                        reason = %response_headers.reason,
                        "Request failed"
                    );
                } else {
                    tracing::debug!(
                        %method,
                        url = %request.url,
                        status = response_headers.status,
                        bytes = body.len(),
                        "Request completed"
                    );
                }

                let response = Response::new(response_headers, request);
                jar.extract_cookies(&response);
                callback(body, response.into_headers());
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::{HeaderField, STATUS_TRANSPORT_FAILED};
    use crate::http::transport::Completion;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use url::Url;

    /// Completes every dispatch synchronously with a queued reply
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<ResponseHeaders>>,
        sent: Mutex<Vec<(Method, Url, DispatchOptions)>>,
    }

    impl ScriptedTransport {
        fn reply(&self, headers: ResponseHeaders) {
            self.replies.lock().push_back(headers);
        }
    }

    impl Transport for ScriptedTransport {
        fn dispatch(
            &self,
            method: Method,
            url: Url,
            options: DispatchOptions,
            on_complete: Completion,
        ) -> Result<()> {
            self.sent.lock().push((method, url, options));
            let headers = self
                .replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| ResponseHeaders::new(200, "OK"));
            on_complete(Bytes::from_static(b"ok"), headers);
            Ok(())
        }
    }

    fn client_with(transport: &Arc<ScriptedTransport>) -> RequestClient {
        RequestClient::with_transport(ClientConfig::default(), transport.clone())
    }

    fn capture() -> (
        Arc<Mutex<Option<(Bytes, ResponseHeaders)>>>,
        impl FnOnce(Bytes, ResponseHeaders) + Send + 'static,
    ) {
        let slot = Arc::new(Mutex::new(None));
        let writer = slot.clone();
        (slot, move |body: Bytes, headers: ResponseHeaders| {
            *writer.lock() = Some((body, headers));
        })
    }

    #[test]
    fn test_default_client() {
        let client = RequestClient::new().unwrap();
        assert_eq!(client.timeout(), 30);
        assert_eq!(
            client.agent(),
            format!("jarclient/{}", env!("CARGO_PKG_VERSION"))
        );
        assert!(client.cookie_jar().is_empty());
    }

    #[test]
    fn test_setters() {
        let transport = Arc::new(ScriptedTransport::default());
        let mut client = client_with(&transport);
        client.set_timeout(5);
        client.set_agent("tester/2.0");
        let jar = Arc::new(CookieJar::new());
        client.set_cookie_jar(jar.clone());

        let (_, cb) = capture();
        client.get("https://example.com/", cb).unwrap();

        let sent = transport.sent.lock();
        let (_, _, options) = &sent[0];
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            options.headers.get("user-agent").unwrap().to_str().unwrap(),
            "tester/2.0"
        );
        assert_eq!(client.timeout(), 5);
    }

    #[test]
    fn test_zero_timeout_disables_transport_timeout() {
        let config = ClientConfig::new().timeout(0);
        assert_eq!(config.transport_timeout(), None);
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout(" 12 ").unwrap(), 12);
        assert_eq!(parse_timeout("0").unwrap(), 0);
        assert!(parse_timeout("-1").unwrap_err().is_config());
        assert!(parse_timeout("soon").unwrap_err().is_config());
    }

    #[test]
    fn test_verbs_map_to_methods() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client_with(&transport);

        client.get("https://example.com/a", |_, _| {}).unwrap();
        client.head("https://example.com/a", |_, _| {}).unwrap();
        client.delete("https://example.com/a", |_, _| {}).unwrap();
        client
            .post("https://example.com/a", vec![("k", "v")], |_, _| {})
            .unwrap();
        client.put("https://example.com/a", "raw", |_, _| {}).unwrap();

        let sent = transport.sent.lock();
        let methods: Vec<Method> = sent.iter().map(|(m, _, _)| *m).collect();
        assert_eq!(
            methods,
            vec![Method::Get, Method::Head, Method::Delete, Method::Post, Method::Put]
        );
        assert!(sent[0].2.body.is_none());
        assert_eq!(sent[3].2.body.as_deref(), Some(&b"k=v"[..]));
        assert_eq!(
            sent[3].2.headers.get("content-type").unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(sent[4].2.body.as_deref(), Some(&b"raw"[..]));
    }

    #[test]
    fn test_callback_receives_unfolded_set_cookie() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client_with(&transport);
        let mut reply = ResponseHeaders::new(200, "OK");
        reply.append(
            "set-cookie",
            "id=1; Expires=Thu, 01 Jan 2099 00:00:00 GMT, sess=abc; Expires=Thu, 01 Jan 2099 00:00:00 GMT",
        );
        transport.reply(reply);

        let (slot, cb) = capture();
        client.get("https://example.com/", cb).unwrap();

        let (body, headers) = slot.lock().take().unwrap();
        assert_eq!(&body[..], b"ok");
        assert_eq!(
            headers.get("set-cookie"),
            Some(&HeaderField::List(vec![
                "id=1; Expires=Thu, 01 Jan 2099 00:00:00 GMT".to_string(),
                "sess=abc; Expires=Thu, 01 Jan 2099 00:00:00 GMT".to_string(),
            ]))
        );
        assert_eq!(client.cookie_jar().len(), 2);
    }

    #[test]
    fn test_headers_without_set_cookie_pass_through() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client_with(&transport);
        let mut reply = ResponseHeaders::new(404, "Not Found");
        reply.append("content-type", "text/plain");
        transport.reply(reply.clone());

        let (slot, cb) = capture();
        client.get("https://example.com/missing", cb).unwrap();

        let (_, headers) = slot.lock().take().unwrap();
        assert_eq!(headers, reply);
        assert!(client.cookie_jar().is_empty());
    }

    #[test]
    fn test_get_after_post_sends_session_cookie() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client_with(&transport);
        let mut login = ResponseHeaders::new(200, "OK");
        login.append("set-cookie", "session=s3cr3t; Path=/");
        transport.reply(login);

        client
            .post(
                "https://example.com/login",
                vec![("user", "jane"), ("pass", "pw")],
                |_, _| {},
            )
            .unwrap();
        client.get("https://example.com/account", |_, _| {}).unwrap();

        let sent = transport.sent.lock();
        assert!(sent[0].2.headers.get("cookie").is_none());
        assert_eq!(
            sent[1].2.headers.get("cookie").unwrap().to_str().unwrap(),
            "session=s3cr3t"
        );
    }

    #[test]
    fn test_transport_error_reaches_callback() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client_with(&transport);
        transport.reply(ResponseHeaders::transport_error(
            STATUS_TRANSPORT_FAILED,
            "operation timed out",
        ));

        let (slot, cb) = capture();
        client.get("https://example.com/slow", cb).unwrap();

        let (_, headers) = slot.lock().take().unwrap();
        assert!(headers.is_transport_error());
        assert_eq!(headers.reason, "operation timed out");
    }

    #[test]
    fn test_out_of_range_max_age_still_completes() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client_with(&transport);
        let mut reply = ResponseHeaders::new(200, "OK");
        reply.append("set-cookie", "forever=1; Max-Age=9223372036854775807");
        transport.reply(reply);
        let mut reply = ResponseHeaders::new(200, "OK");
        reply.append("set-cookie", "forever=1; Max-Age=-99999999999999");
        transport.reply(reply);

        let (slot, cb) = capture();
        client.get("https://example.com/", cb).unwrap();
        let (_, headers) = slot.lock().take().unwrap();
        assert_eq!(headers.status, 200);
        assert_eq!(client.cookie_jar().len(), 1);

        let (slot, cb) = capture();
        client.get("https://example.com/", cb).unwrap();
        assert!(slot.lock().take().is_some());
        assert!(client.cookie_jar().is_empty());
    }

    #[test]
    fn test_invalid_input_fails_before_dispatch() {
        let transport = Arc::new(ScriptedTransport::default());
        let mut client = client_with(&transport);

        assert!(client.get("::not a url::", |_, _| {}).unwrap_err().is_config());

        client.set_agent("bad\nagent");
        assert!(client
            .get("https://example.com/", |_, _| {})
            .unwrap_err()
            .is_config());
        assert!(transport.sent.lock().is_empty());
    }
}
