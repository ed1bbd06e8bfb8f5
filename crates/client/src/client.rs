//! CoinGecko client — one method per supported endpoint.
//!
//! Each method is a pure mapping from typed parameters to a
//! (path, query) pair handed to the connection layer. Responses are
//! returned as decoded JSON, unmodified; no schema is enforced.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;

use crate::connection::{Connection, Tier, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT};
use crate::error::Result;

/// Client for the CoinGecko v3 API.
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
/// Calls are independent and may be issued concurrently.
///
/// ```no_run
/// # async fn example() -> coingecko_client::Result<()> {
/// use coingecko_client::CoinGeckoClient;
///
/// let client = CoinGeckoClient::new();
/// let btc = client.prices(&["bitcoin"], None).await?;
/// println!("{btc}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    conn: Connection,
}

/// Builder for [`CoinGeckoClient`].
///
/// A pro API key routes every request to the pro base URL and
/// attaches `x-cg-pro-api-key`; a demo key stays on the public base
/// URL with `x-cg-demo-api-key`; with neither, requests are keyless.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    pro_api_key: Option<String>,
    demo_api_key: Option<String>,
    base_url: Option<String>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Use the pro API tier with this key.
    pub fn pro_api_key(mut self, key: impl Into<String>) -> Self {
        self.pro_api_key = Some(key.into());
        self
    }

    /// Use a demo key on the public API tier.
    pub fn demo_api_key(mut self, key: impl Into<String>) -> Self {
        self.demo_api_key = Some(key.into());
        self
    }

    /// Override the base URL (e.g. for a stub server in tests).
    /// Tier auth headers still apply.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Number of retries on transient failures (network errors,
    /// 5xx). Defaults to 5.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Per-request timeout, passed through to the HTTP client.
    /// Defaults to 30s.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> CoinGeckoClient {
        // Pro wins if both keys are set.
        let tier = match (self.pro_api_key, self.demo_api_key) {
            (Some(key), _) => Tier::Pro(key),
            (None, Some(key)) => Tier::Demo(key),
            (None, None) => Tier::Public,
        };

        CoinGeckoClient {
            conn: Connection::new(
                tier,
                self.base_url,
                self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
                self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            ),
        }
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinGeckoClient {
    /// Keyless client against the public API.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    // ── Ping ────────────────────────────────────────────────────

    /// Check API server status.
    pub async fn ping(&self) -> Result<Value> {
        self.conn.get("ping", &[]).await
    }

    // ── Spot prices ─────────────────────────────────────────────

    /// Current price for one or more coins.
    ///
    /// `vs` is the list of currencies to quote in; `None` means USD.
    /// Multi-value parameters are comma-joined on the wire, per the
    /// upstream convention.
    pub async fn prices(&self, ids: &[&str], vs: Option<&[&str]>) -> Result<Value> {
        let ids = ids.join(",");
        let vs = match vs {
            Some(v) => v.join(","),
            None => "usd".to_string(),
        };
        self.conn
            .get(
                "simple/price",
                &[("ids", ids.as_str()), ("vs_currencies", vs.as_str())],
            )
            .await
    }

    /// Exchange rate between a coin and a currency (or another
    /// coin). `None` quotes in USD. Alias for [`Self::prices`].
    pub async fn exchange_rate(&self, from: &str, to: Option<&str>) -> Result<Value> {
        let to = to.unwrap_or("usd");
        self.prices(&[from], Some(&[to])).await
    }

    /// Currencies the API can quote prices in.
    pub async fn supported_currencies(&self) -> Result<Value> {
        self.conn.get("simple/supported_vs_currencies", &[]).await
    }

    // ── Historical prices ───────────────────────────────────────

    /// Price snapshot for a coin on a given date.
    /// Sent upstream as `DD-MM-YYYY`.
    pub async fn historical_price_on_date(&self, id: &str, date: NaiveDate) -> Result<Value> {
        let date = date.format("%d-%m-%Y").to_string();
        self.conn
            .get(&format!("coins/{id}/history"), &[("date", date.as_str())])
            .await
    }

    /// Minutely historical prices. Upstream only serves minutely
    /// granularity within the last 24 hours, so `days` is fixed to 1.
    pub async fn minutely_historical_prices(&self, id: &str, vs: Option<&str>) -> Result<Value> {
        self.conn
            .get(
                &format!("coins/{id}/market_chart"),
                &[("vs_currency", vs.unwrap_or("usd")), ("days", "1")],
            )
            .await
    }

    /// Hourly historical prices over the last `days` days.
    ///
    /// Upstream does not serve hourly granularity beyond 90 days;
    /// larger ranges delegate to [`Self::daily_historical_prices`].
    pub async fn hourly_historical_prices(
        &self,
        id: &str,
        days: u32,
        vs: Option<&str>,
    ) -> Result<Value> {
        if days > 90 {
            return self.daily_historical_prices(id, days, vs).await;
        }

        let days = days.to_string();
        self.conn
            .get(
                &format!("coins/{id}/market_chart"),
                &[("vs_currency", vs.unwrap_or("usd")), ("days", days.as_str())],
            )
            .await
    }

    /// Daily historical prices over the last `days` days.
    pub async fn daily_historical_prices(
        &self,
        id: &str,
        days: u32,
        vs: Option<&str>,
    ) -> Result<Value> {
        let days = days.to_string();
        self.conn
            .get(
                &format!("coins/{id}/market_chart"),
                &[
                    ("vs_currency", vs.unwrap_or("usd")),
                    ("days", days.as_str()),
                    ("interval", "daily"),
                ],
            )
            .await
    }

    // ── OHLC ────────────────────────────────────────────────────

    /// Open/high/low/close candles over the last `days` days.
    ///
    /// Upstream accepts only 1/7/14/30/90/180/365/"max"; invalid
    /// values are rejected by the API, not validated here.
    pub async fn ohlc(&self, id: &str, days: &str, vs: Option<&str>) -> Result<Value> {
        self.conn
            .get(
                &format!("coins/{id}/ohlc"),
                &[("vs_currency", vs.unwrap_or("usd")), ("days", days)],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client(server: &MockServer) -> CoinGeckoClient {
        CoinGeckoClient::builder()
            .base_url(server.uri())
            .max_retries(0)
            .build()
    }

    async fn ok_stub(server: &MockServer) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(server)
            .await;
    }

    fn query_of(req: &Request) -> String {
        req.url.query().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn prices_builds_simple_price_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "bitcoin"))
            .and(query_param("vs_currencies", "usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bitcoin": { "usd": 42000.0 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server).prices(&["bitcoin"], None).await.unwrap();
        assert_eq!(body["bitcoin"]["usd"], 42000.0);
    }

    #[tokio::test]
    async fn multi_value_parameters_are_comma_joined() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "bitcoin,ethereum"))
            .and(query_param("vs_currencies", "usd,eur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .prices(&["bitcoin", "ethereum"], Some(&["usd", "eur"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn exchange_rate_is_an_alias_for_prices() {
        let server = MockServer::start().await;
        ok_stub(&server).await;

        let c = client(&server);
        c.exchange_rate("bitcoin", Some("ethereum")).await.unwrap();
        c.prices(&["bitcoin"], Some(&["ethereum"])).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.path(), requests[1].url.path());
        assert_eq!(query_of(&requests[0]), query_of(&requests[1]));
    }

    #[tokio::test]
    async fn exchange_rate_defaults_to_usd() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "bitcoin"))
            .and(query_param("vs_currencies", "usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).exchange_rate("bitcoin", None).await.unwrap();
    }

    #[tokio::test]
    async fn history_date_is_formatted_dd_mm_yyyy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/bitcoin/history"))
            .and(query_param("date", "30-12-2017"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2017, 12, 30).unwrap();
        client(&server)
            .historical_price_on_date("bitcoin", date)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn minutely_chart_fixes_days_to_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/bitcoin/market_chart"))
            .and(query_param("vs_currency", "usd"))
            .and(query_param("days", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .minutely_historical_prices("bitcoin", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn daily_chart_adds_daily_interval() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/bitcoin/market_chart"))
            .and(query_param("vs_currency", "usd"))
            .and(query_param("days", "90"))
            .and(query_param("interval", "daily"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .daily_historical_prices("bitcoin", 90, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn hourly_chart_within_90_days_stays_hourly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/bitcoin/market_chart"))
            .and(query_param("vs_currency", "usd"))
            .and(query_param("days", "60"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .hourly_historical_prices("bitcoin", 60, None)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(!query_of(&requests[0]).contains("interval"));
    }

    #[tokio::test]
    async fn hourly_chart_beyond_90_days_delegates_to_daily() {
        let server = MockServer::start().await;
        ok_stub(&server).await;

        let c = client(&server);
        c.hourly_historical_prices("bitcoin", 91, None).await.unwrap();
        c.daily_historical_prices("bitcoin", 91, None).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.path(), "/coins/bitcoin/market_chart");
        assert_eq!(requests[0].url.path(), requests[1].url.path());
        assert_eq!(query_of(&requests[0]), query_of(&requests[1]));
    }

    #[tokio::test]
    async fn ohlc_forwards_days_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/bitcoin/ohlc"))
            .and(query_param("vs_currency", "myr"))
            .and(query_param("days", "max"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .ohlc("bitcoin", "max", Some("myr"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn supported_currencies_returns_array_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/supported_vs_currencies"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!(["usd", "eur", "myr"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server).supported_currencies().await.unwrap();
        assert_eq!(body, serde_json::json!(["usd", "eur", "myr"]));
    }

    #[tokio::test]
    async fn demo_key_stays_on_public_tier_header() {
        let server = MockServer::start().await;
        ok_stub(&server).await;

        let c = CoinGeckoClient::builder()
            .demo_api_key("demo-key")
            .base_url(server.uri())
            .max_retries(0)
            .build();
        c.ping().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].headers.get("x-cg-demo-api-key").unwrap(),
            "demo-key"
        );
        assert!(!requests[0].headers.contains_key("x-cg-pro-api-key"));
    }
}
