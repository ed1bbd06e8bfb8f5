//! HTTP connection layer — tier-aware base URL selection, auth
//! headers, retry on transient failures, and uniform error
//! translation.

use std::time::Duration;

use reqwest::Method;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Public (keyless / demo) API base URL.
pub const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Pro API base URL, used when a pro API key is configured.
pub const PRO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";

/// Default number of retries on transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// CoinGecko API tier — determines base URL and auth header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tier {
    /// Public API, no key.
    Public,
    /// Public API with a demo key (x-cg-demo-api-key).
    Demo(String),
    /// Pro API (x-cg-pro-api-key).
    Pro(String),
}

impl Tier {
    fn base_url(&self) -> &str {
        match self {
            Tier::Public | Tier::Demo(_) => BASE_URL,
            Tier::Pro(_) => PRO_BASE_URL,
        }
    }

    /// Auth header name/value pair, if this tier carries a key.
    fn auth_header(&self) -> Option<(&'static str, &str)> {
        match self {
            Tier::Public => None,
            Tier::Demo(key) => Some(("x-cg-demo-api-key", key)),
            Tier::Pro(key) => Some(("x-cg-pro-api-key", key)),
        }
    }
}

/// One HTTP connection to the CoinGecko API.
///
/// Owns the `reqwest::Client`, the resolved base URL, and the retry
/// policy. Every endpoint method funnels through [`Connection::get`].
#[derive(Debug, Clone)]
pub(crate) struct Connection {
    http: reqwest::Client,
    tier: Tier,
    base_url: String,
    max_retries: u32,
}

impl Connection {
    pub(crate) fn new(
        tier: Tier,
        base_url_override: Option<String>,
        max_retries: u32,
        timeout: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        let base_url = base_url_override
            .unwrap_or_else(|| tier.base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            http,
            tier,
            base_url,
            max_retries,
        }
    }

    /// GET a relative path with the given query parameters.
    pub(crate) async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        self.request(Method::GET, path, query).await
    }

    /// Issue one logical request. Network errors and 5xx responses
    /// are retried up to `max_retries` with exponential backoff;
    /// all other failures surface immediately as typed errors.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, path);
        let mut attempt = 0u32;

        loop {
            debug!(%url, attempt, "CoinGecko request");

            let mut req = self.http.request(method.clone(), &url).query(query);
            if let Some((name, key)) = self.tier.auth_header() {
                req = req.header(name, key);
            }

            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if attempt < self.max_retries {
                        attempt += 1;
                        let wait = backoff(attempt);
                        warn!(
                            "CoinGecko request failed ({e}) — retrying in {wait:?} \
                             (attempt {attempt}/{})",
                            self.max_retries
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                    return Err(Error::ConnectionFailed {
                        message: e.to_string(),
                    });
                }
            };

            let status = resp.status();

            if status.is_server_error() && attempt < self.max_retries {
                attempt += 1;
                let wait = backoff(attempt);
                warn!(
                    "CoinGecko HTTP {status} — retrying in {wait:?} (attempt {attempt}/{})",
                    self.max_retries
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            let body = resp.text().await.unwrap_or_default();

            if !status.is_success() {
                return Err(Error::from_status(status, body));
            }

            // Decode separately from transport so a 2xx with a bad
            // body surfaces as Decode, not as an HTTP-status error.
            return serde_json::from_str(&body).map_err(|e| Error::Decode {
                message: e.to_string(),
            });
        }
    }
}

/// Exponential backoff: 250ms, 500ms, 1s, 2s, 4s, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(250 * 2u64.pow(attempt.saturating_sub(1).min(6)))
}
