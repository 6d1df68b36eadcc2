//! HTTP transport for the content service
//!
//! The gateway talks to the service through [`Transport`] so tests can answer
//! requests from canned JSON.

use std::fmt;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("tartil/", env!("CARGO_PKG_VERSION"));

/// Fetches JSON documents relative to the service base address
pub trait Transport: Send + Sync {
    /// GET `{base}/{path}` and decode the body as JSON
    ///
    /// Network failures and timeouts are `ServiceUnavailable`; a body that is
    /// not JSON is `InvalidResponse`.
    fn get_json(&self, path: String) -> BoxFuture<'static, Result<Value>>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("client", &"<HttpClient>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::ServiceUnavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, path: String) -> BoxFuture<'static, Result<Value>> {
        let client = self.client.clone();
        let url = self.url(&path);

        async move {
            tracing::debug!("GET {}", url);
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|e| Error::ServiceUnavailable(describe(&url, &e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::ServiceUnavailable(format!("{} returned {}", url, status)));
            }

            response.json::<Value>().await.map_err(|e| {
                if e.is_decode() {
                    Error::InvalidResponse(format!("{}: {}", url, e))
                } else {
                    Error::ServiceUnavailable(describe(&url, &e))
                }
            })
        }
        .boxed()
    }
}

fn describe(url: &str, err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("{} timed out", url)
    } else {
        format!("{}: {}", url, err)
    }
}
