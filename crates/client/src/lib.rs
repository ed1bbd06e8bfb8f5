//! Thin async client for the [CoinGecko](https://www.coingecko.com/en/api)
//! v3 REST API.
//!
//! Two layers, composed linearly:
//!
//! - a connection layer — base-URL/tier selection, auth headers,
//!   retries on transient failures, and translation of transport
//!   failures into [`Error`].
//! - [`CoinGeckoClient`] — one method per supported endpoint, each a
//!   pure mapping from typed parameters to a path + query string.
//!   Responses are returned as [`serde_json::Value`], unmodified.
//!
//! ```no_run
//! # async fn example() -> coingecko_client::Result<()> {
//! use coingecko_client::CoinGeckoClient;
//!
//! let client = CoinGeckoClient::builder()
//!     .pro_api_key("CG-...")
//!     .build();
//!
//! let prices = client.prices(&["bitcoin", "ethereum"], None).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod connection;
mod error;

pub use client::{ClientBuilder, CoinGeckoClient};
pub use connection::{BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, PRO_BASE_URL};
pub use error::{Error, Result};
