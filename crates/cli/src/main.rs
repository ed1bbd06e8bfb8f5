mod commands;
mod output;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use coingecko_client::CoinGeckoClient;
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "coingecko",
    about = "CoinGecko market data from the terminal.\nSpot prices, historical charts, OHLC candles, exchange rates.",
    version,
    propagate_version = true
)]
struct Cli {
    #[arg(long, short = 'o', global = true, default_value = "table")]
    output: CliOutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
    JsonPretty,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> OutputFormat {
        match f {
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Granularity {
    Minutely,
    Hourly,
    Daily,
}

#[derive(Subcommand)]
enum Commands {
    /// Current price for one or more coins.
    Price {
        /// Coin ids (e.g. bitcoin ethereum).
        #[arg(required = true)]
        ids: Vec<String>,

        /// Currencies to quote in (default: usd).
        #[arg(long, short = 'c', num_args = 1..)]
        currencies: Vec<String>,
    },

    /// Price snapshot for a coin on a given date.
    History {
        id: String,

        /// Date in YYYY-MM-DD form.
        date: NaiveDate,
    },

    /// Historical price chart (minutely, hourly or daily).
    Chart {
        id: String,

        #[arg(long, short = 'g', default_value = "daily")]
        granularity: Granularity,

        /// Number of days to cover (ignored for minutely).
        #[arg(long, short = 'd', default_value_t = 30)]
        days: u32,

        /// Currency to quote in.
        #[arg(long, short = 'c')]
        currency: Option<String>,
    },

    /// Open/high/low/close candles.
    Ohlc {
        id: String,

        /// One of 1/7/14/30/90/180/365/max.
        #[arg(long, short = 'd', default_value = "7")]
        days: String,

        /// Currency to quote in.
        #[arg(long, short = 'c')]
        currency: Option<String>,
    },

    /// Currencies the API can quote prices in.
    Currencies,

    /// Exchange rate between a coin and a currency (or another coin).
    Rate {
        from: String,

        /// Defaults to usd.
        to: Option<String>,
    },

    /// Check API server status.
    Ping,
}

/// Build a client from the environment. `COINGECKO_PRO_API_KEY`
/// selects the pro tier; `COINGECKO_DEMO_API_KEY` stays public.
fn client_from_env() -> CoinGeckoClient {
    let mut builder = CoinGeckoClient::builder();
    if let Ok(key) = std::env::var("COINGECKO_PRO_API_KEY") {
        builder = builder.pro_api_key(key);
    } else if let Ok(key) = std::env::var("COINGECKO_DEMO_API_KEY") {
        builder = builder.demo_api_key(key);
    }
    builder.build()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let fmt: OutputFormat = cli.output.into();
    let client = client_from_env();

    match cli.command {
        Commands::Price { ids, currencies } => {
            commands::market::price(&client, &ids, &currencies, fmt).await
        }
        Commands::History { id, date } => commands::market::history(&client, &id, date, fmt).await,
        Commands::Chart {
            id,
            granularity,
            days,
            currency,
        } => {
            let vs = currency.as_deref();
            let data = match granularity {
                Granularity::Minutely => client.minutely_historical_prices(&id, vs).await?,
                Granularity::Hourly => client.hourly_historical_prices(&id, days, vs).await?,
                Granularity::Daily => client.daily_historical_prices(&id, days, vs).await?,
            };
            commands::market::print_json(&data, fmt)
        }
        Commands::Ohlc { id, days, currency } => {
            commands::market::ohlc(&client, &id, &days, currency.as_deref(), fmt).await
        }
        Commands::Currencies => commands::market::currencies(&client, fmt).await,
        Commands::Rate { from, to } => {
            commands::market::rate(&client, &from, to.as_deref(), fmt).await
        }
        Commands::Ping => commands::market::ping(&client, fmt).await,
    }
}
