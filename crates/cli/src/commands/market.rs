//! Market data commands backed by the CoinGecko API.

use anyhow::Result;
use chrono::NaiveDate;
use coingecko_client::CoinGeckoClient;
use serde_json::Value;

use crate::output::OutputFormat;

/// Render a raw JSON response in the selected format.
/// Table falls back to pretty JSON for endpoints without a table view.
pub fn print_json(data: &Value, fmt: OutputFormat) -> Result<()> {
    match fmt {
        OutputFormat::Json => println!("{}", serde_json::to_string(data)?),
        OutputFormat::Table | OutputFormat::JsonPretty => {
            println!("{}", serde_json::to_string_pretty(data)?)
        }
    }
    Ok(())
}

/// `coingecko price <ids..> [-c currencies..]`
pub async fn price(
    client: &CoinGeckoClient,
    ids: &[String],
    currencies: &[String],
    fmt: OutputFormat,
) -> Result<()> {
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    let vs: Vec<&str> = currencies.iter().map(String::as_str).collect();
    let vs = if vs.is_empty() {
        None
    } else {
        Some(vs.as_slice())
    };

    let data = client.prices(&ids, vs).await?;

    match fmt {
        OutputFormat::Json => println!("{}", serde_json::to_string(&data)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Table => {
            if let Some(coins) = data.as_object() {
                println!("{:<20} {:<8} {:>16}", "COIN", "VS", "PRICE");
                println!("{}", "─".repeat(46));
                for (coin, quotes) in coins {
                    if let Some(quotes) = quotes.as_object() {
                        for (vs, price) in quotes {
                            let price = price
                                .as_f64()
                                .map(fmt_price)
                                .unwrap_or_else(|| "—".into());
                            println!("{:<20} {:<8} {:>16}", coin, vs.to_uppercase(), price);
                        }
                    }
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
        }
    }

    Ok(())
}

/// `coingecko history <id> <date>`
pub async fn history(
    client: &CoinGeckoClient,
    id: &str,
    date: NaiveDate,
    fmt: OutputFormat,
) -> Result<()> {
    let data = client.historical_price_on_date(id, date).await?;
    print_json(&data, fmt)
}

/// `coingecko ohlc <id> [--days 7] [-c currency]`
pub async fn ohlc(
    client: &CoinGeckoClient,
    id: &str,
    days: &str,
    currency: Option<&str>,
    fmt: OutputFormat,
) -> Result<()> {
    let data = client.ohlc(id, days, currency).await?;

    match fmt {
        OutputFormat::Json => println!("{}", serde_json::to_string(&data)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Table => {
            // Rows are [timestamp_ms, open, high, low, close].
            if let Some(rows) = data.as_array() {
                println!(
                    "{:<22} {:>12} {:>12} {:>12} {:>12}",
                    "TIME", "OPEN", "HIGH", "LOW", "CLOSE"
                );
                println!("{}", "─".repeat(74));
                for row in rows {
                    let cell = |i: usize| row.get(i).and_then(Value::as_f64);
                    let time = cell(0)
                        .and_then(|ms| chrono::DateTime::from_timestamp_millis(ms as i64))
                        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| "—".into());
                    let col = |i| cell(i).map(fmt_price).unwrap_or_else(|| "—".into());
                    println!(
                        "{:<22} {:>12} {:>12} {:>12} {:>12}",
                        time,
                        col(1),
                        col(2),
                        col(3),
                        col(4)
                    );
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
        }
    }

    Ok(())
}

/// `coingecko currencies`
pub async fn currencies(client: &CoinGeckoClient, fmt: OutputFormat) -> Result<()> {
    let data = client.supported_currencies().await?;

    match fmt {
        OutputFormat::Json => println!("{}", serde_json::to_string(&data)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Table => {
            if let Some(list) = data.as_array() {
                for chunk in list.chunks(8) {
                    let row: Vec<&str> = chunk.iter().filter_map(Value::as_str).collect();
                    println!("{}", row.join("  "));
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
        }
    }

    Ok(())
}

/// `coingecko rate <from> [to]`
pub async fn rate(
    client: &CoinGeckoClient,
    from: &str,
    to: Option<&str>,
    fmt: OutputFormat,
) -> Result<()> {
    let data = client.exchange_rate(from, to).await?;

    match fmt {
        OutputFormat::Json => println!("{}", serde_json::to_string(&data)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Table => {
            let to = to.unwrap_or("usd");
            let rate = data
                .get(from)
                .and_then(|q| q.get(to))
                .and_then(Value::as_f64);
            match rate {
                Some(r) => println!("1 {from} = {} {}", fmt_price(r), to.to_uppercase()),
                None => println!("{}", serde_json::to_string_pretty(&data)?),
            }
        }
    }

    Ok(())
}

/// `coingecko ping`
pub async fn ping(client: &CoinGeckoClient, fmt: OutputFormat) -> Result<()> {
    let data = client.ping().await?;

    match fmt {
        OutputFormat::Json => println!("{}", serde_json::to_string(&data)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Table => {
            let says = data
                .get("gecko_says")
                .and_then(Value::as_str)
                .unwrap_or("ok");
            println!("{says}");
        }
    }

    Ok(())
}

fn fmt_price(p: f64) -> String {
    if p < 0.01 {
        format!("{p:.6}")
    } else if p < 1.0 {
        format!("{p:.4}")
    } else {
        format!("{p:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_formatting_scales_with_magnitude() {
        assert_eq!(fmt_price(42000.1234), "42000.12");
        assert_eq!(fmt_price(0.5), "0.5000");
        assert_eq!(fmt_price(0.000123), "0.000123");
    }
}
