//! # Transavia Scout CLI (`tscout`)
//!
//! Searches Transavia for a round trip and prints the outbound and inbound
//! flights found on the result page.
//!
//! ## Usage
//!
//! ```bash
//! tscout -o <origin> -t <destination> -d <YYYY-MM-DD> -r <YYYY-MM-DD>
//! ```
//!
//! A WebDriver server must be listening on `browser.webdriver_url`
//! (default `http://localhost:4444`, e.g. `geckodriver --port 4444`).
//!
//! ## Examples
//!
//! ```bash
//! # Text output, one line per flight
//! tscout -o Paris -t Amsterdam -d 2021-10-21 -r 2021-10-22
//!
//! # Start from the search page, watch the browser, print JSON
//! tscout -o Nantes -t Porto -d 2021-11-01 -r 2021-11-08 --entry search --headed --json
//!
//! # Verbose logs on stderr
//! RUST_LOG=transavia_scout=debug tscout -o Lyon -t Tunis -d 2022-02-28 -r 2022-03-07
//! ```

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use transavia_scout::config;
use transavia_scout::form::EntryPoint;
use transavia_scout::models::Travel;
use transavia_scout::output;
use transavia_scout::session;

/// Transavia Scout: search Transavia flights from the command line.
///
/// Drives the Transavia website through a WebDriver-controlled browser and
/// prints every outbound and inbound flight found for the given dates.
#[derive(Parser)]
#[command(
    name = "tscout",
    about = "Transavia Scout: search Transavia flights from the command line",
    version
)]
struct Cli {
    /// Travel origin (station name or code, as typed on the site).
    #[arg(short = 'o', long)]
    origin: String,

    /// Travel destination.
    #[arg(short = 't', long = "to")]
    to: String,

    /// Outbound date (YYYY-MM-DD).
    #[arg(short = 'd', long, value_parser = parse_date)]
    departure_date: NaiveDate,

    /// Return date (YYYY-MM-DD), on or after the departure date.
    #[arg(short = 'r', long, value_parser = parse_date)]
    return_date: NaiveDate,

    /// Page hosting the search form. Defaults to `site.entry` from config.
    #[arg(long, value_enum)]
    entry: Option<EntryPoint>,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    headed: bool,

    /// WebDriver server URL, overriding `browser.webdriver_url`.
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Print flights as a JSON array.
    #[arg(long)]
    json: bool,

    /// Path to configuration file (TOML). Defaults apply when it is absent.
    #[arg(long, default_value = "./config/tscout.toml")]
    config: PathBuf,
}

/// Log filter when `RUST_LOG` is unset: the binary's own events and the
/// library's.
const DEFAULT_LOG_FILTER: &str = "tscout=info,transavia_scout=info";

/// Parse an ISO-8601 calendar date for `--departure-date` / `--return-date`.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {} (expected YYYY-MM-DD)", s, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut cfg = config::load_config_or_default(&cli.config)?;
    if let Some(url) = cli.webdriver_url {
        cfg.browser.webdriver_url = url;
    }
    if cli.headed {
        cfg.browser.headless = false;
    }
    config::validate(&cfg)?;
    let entry = cli.entry.unwrap_or(cfg.site.entry);

    let travel = Travel::new(cli.origin, cli.to, cli.departure_date, cli.return_date)?;
    tracing::info!(%travel, ?entry, "searching flights");

    let flights = session::run_search(&cfg, &travel, entry).await?;

    if cli.json {
        println!("{}", output::render_json(&flights)?);
    } else {
        print!("{}", output::render_text(&travel, &flights));
    }

    Ok(())
}
