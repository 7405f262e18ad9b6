// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport seam between the session client and the network

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::Client;
use tokio::runtime::Handle;
use url::Url;

use super::request::Method;
use super::response::{
    ResponseHeaders, STATUS_BODY_FAILED, STATUS_CONNECT_FAILED, STATUS_TRANSPORT_FAILED,
};
use crate::error::{Error, Result};

/// Handler invoked exactly once with the body and the raw (folded) headers
pub type Completion = Box<dyn FnOnce(Bytes, ResponseHeaders) + Send + 'static>;

/// Per-dispatch options
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Transport timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Outgoing headers
    pub headers: HeaderMap,
    /// Outgoing body
    pub body: Option<Bytes>,
}

/// Something that can carry a request to a server and report back.
///
/// `dispatch` must not block: it schedules the exchange and returns. Failures
/// of the exchange itself are reported through `on_complete` with a 59x
/// status; an `Err` return means nothing was scheduled.
pub trait Transport: Send + Sync {
    fn dispatch(
        &self,
        method: Method,
        url: Url,
        options: DispatchOptions,
        on_complete: Completion,
    ) -> Result<()>;
}

/// Transport backed by a reqwest client running on the ambient tokio runtime
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport that never follows redirects or stores cookies itself
    pub fn new() -> Result<Self> {
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn dispatch(
        &self,
        method: Method,
        url: Url,
        options: DispatchOptions,
        on_complete: Completion,
    ) -> Result<()> {
        let runtime = Handle::try_current()
            .map_err(|_| Error::config("requests must be issued from within a tokio runtime"))?;

        let mut builder = self
            .client
            .request(method.into(), url)
            .headers(options.headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        runtime.spawn(async move {
            let (body, headers) = match builder.send().await {
                Ok(response) => read_response(response).await,
                Err(e) => (Bytes::new(), failure_headers(&e)),
            };
            on_complete(body, headers);
        });
        Ok(())
    }
}

/// Collect status, folded headers and body from a reqwest response
async fn read_response(response: reqwest::Response) -> (Bytes, ResponseHeaders) {
    let status = response.status();
    let mut headers = ResponseHeaders::new(
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
    );
    for (name, value) in response.headers() {
        headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }

    match response.bytes().await {
        Ok(body) => (body, headers),
        Err(e) => {
            headers.status = STATUS_BODY_FAILED;
            headers.reason = e.to_string();
            (Bytes::new(), headers)
        }
    }
}

fn failure_headers(error: &reqwest::Error) -> ResponseHeaders {
    let status = if error.is_connect() {
        STATUS_CONNECT_FAILED
    } else if error.is_body() || error.is_decode() {
        STATUS_BODY_FAILED
    } else {
        STATUS_TRANSPORT_FAILED
    };
    ResponseHeaders::transport_error(status, error.to_string())
}
